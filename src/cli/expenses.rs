use super::ui;
use crate::App;
use crate::core::records::ExpenseRecord;
use crate::workflow::NewExpense;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;

pub fn display_expenses(expenses: &[&ExpenseRecord], currency: &str) -> String {
    if expenses.is_empty() {
        return "No expenses recorded.".to_string();
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Description"),
        ui::header_cell("Category"),
        ui::header_cell("Paid by"),
        ui::header_cell("Amount"),
    ]);
    for expense in expenses {
        table.add_row(vec![
            Cell::new(expense.date.to_string()),
            Cell::new(&expense.description),
            Cell::new(expense.category.to_string()),
            Cell::new(expense.payment_method.to_string()),
            ui::money_cell(currency, expense.amount),
        ]);
    }

    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Expenses", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\n{}: {}",
        ui::style_text("Total", ui::StyleType::TotalLabel),
        ui::style_text(&ui::money(currency, total), ui::StyleType::TotalValue)
    ));
    output
}

pub fn run_list(app: &App, date: Option<NaiveDate>) -> String {
    let expenses: Vec<&ExpenseRecord> = app
        .state
        .snapshot
        .expenses
        .iter()
        .filter(|e| date.is_none_or(|d| e.date == d))
        .collect();
    display_expenses(&expenses, app.currency())
}

pub async fn run_add(app: &mut App, input: NewExpense) -> Result<String> {
    let expense = app.shop.record_expense(&mut app.state, input).await?;
    Ok(format!(
        "Recorded {} expense of {} on {}",
        expense.category,
        ui::style_text(
            &ui::money(&app.config.currency, expense.amount),
            ui::StyleType::TotalLabel
        ),
        expense.date
    ))
}
