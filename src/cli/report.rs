use super::ui;
use crate::App;
use crate::core::analytics::{self, DayReport, Step};
use crate::core::records::Snapshot;
use anyhow::{Result, bail};
use chrono::NaiveDate;
use comfy_table::{Cell, Color};

impl DayReport<'_> {
    pub fn display_as_table(&self, currency: &str) -> String {
        let mut output = format!(
            "Report for {}\n",
            ui::style_text(&self.date.format("%A, %d %B %Y").to_string(), ui::StyleType::Title)
        );

        if self.is_empty() {
            output.push_str("\nNothing was recorded on this day.");
            return output;
        }

        if let Some(summary) = self.summary {
            let mut table = ui::new_styled_table();
            table.set_header(vec![ui::header_cell("Summary"), ui::header_cell("Amount")]);
            table.add_row(vec![
                Cell::new("Revenue"),
                ui::money_cell(currency, summary.total_revenue),
            ]);
            table.add_row(vec![
                Cell::new("M-Pesa"),
                ui::money_cell(currency, summary.total_mpesa),
            ]);
            table.add_row(vec![
                Cell::new("Cash sales"),
                ui::money_cell(currency, summary.cash_sales()),
            ]);
            table.add_row(vec![
                Cell::new("Expenses"),
                ui::money_cell(currency, summary.total_expenses),
            ]);
            table.add_row(vec![
                Cell::new("Cost of goods"),
                ui::format_optional_cell(summary.total_cost, |c| ui::money(currency, c)),
            ]);
            table.add_row(vec![
                Cell::new("Profit"),
                ui::format_optional_cell(summary.profit, |p| ui::money(currency, p)),
            ]);
            table.add_row(vec![
                Cell::new("Cash remaining"),
                ui::money_cell(currency, summary.cash_remaining),
            ]);
            output.push('\n');
            output.push_str(&table.to_string());
        } else {
            output.push_str(&format!(
                "\n{}",
                ui::style_text("This day has not been closed.", ui::StyleType::Subtle)
            ));
        }

        if !self.sales.is_empty() {
            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("Item"),
                ui::header_cell("Sold"),
                ui::header_cell("Price"),
                ui::header_cell("Revenue"),
                ui::header_cell("In stock"),
            ]);
            for line in &self.sales {
                let remaining = match line.remaining_stock {
                    Some(quantity) => ui::number_cell(quantity),
                    None => Cell::new("removed").fg(Color::DarkGrey),
                };
                table.add_row(vec![
                    Cell::new(&line.sale.stock_item_name),
                    Cell::new(line.sale.quantity_sold.to_string()),
                    ui::money_cell(currency, line.sale.selling_price),
                    ui::money_cell(currency, line.sale.total_revenue),
                    remaining,
                ]);
            }
            output.push_str("\n\n");
            output.push_str(&table.to_string());
            output.push_str(&format!(
                "\n{}: {}",
                ui::style_text("Sales total", ui::StyleType::TotalLabel),
                ui::style_text(&ui::money(currency, self.sales_total), ui::StyleType::TotalValue)
            ));
        }

        if !self.expenses.is_empty() {
            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("Expense"),
                ui::header_cell("Category"),
                ui::header_cell("Amount"),
            ]);
            for expense in &self.expenses {
                table.add_row(vec![
                    Cell::new(&expense.description),
                    Cell::new(expense.category.to_string()),
                    ui::money_cell(currency, expense.amount),
                ]);
            }
            output.push_str("\n\n");
            output.push_str(&table.to_string());
            output.push_str(&format!(
                "\n{}: {}",
                ui::style_text("Expense total", ui::StyleType::TotalLabel),
                ui::style_text(&ui::money(currency, self.expense_total), ui::StyleType::Error)
            ));
        }

        output
    }
}

pub fn display_day(snapshot: &Snapshot, date: NaiveDate, currency: &str) -> String {
    analytics::day_report(snapshot, date).display_as_table(currency)
}

/// Report for `date` (the newest recorded day by default), optionally
/// moved one recorded day older or newer.
pub fn run(app: &App, date: Option<NaiveDate>, step: Option<Step>) -> Result<String> {
    let snapshot = &app.state.snapshot;
    let dates = analytics::report_dates(&snapshot.summaries, &snapshot.expenses);

    let Some(selected) = date.or_else(|| dates.first().copied()) else {
        return Ok("No days recorded yet.".to_string());
    };

    let selected = match step {
        None => selected,
        Some(step) => match analytics::step_date(&dates, selected, step) {
            Some(date) => date,
            None if !dates.contains(&selected) => {
                bail!("No records on {selected} to step from")
            }
            None => bail!(
                "{selected} is the {} recorded day",
                match step {
                    Step::Older => "oldest",
                    Step::Newer => "newest",
                }
            ),
        },
    };

    let mut output = display_day(snapshot, selected, app.currency());
    let older = analytics::step_date(&dates, selected, Step::Older);
    let newer = analytics::step_date(&dates, selected, Step::Newer);
    let nav = |d: Option<NaiveDate>| d.map_or("-".to_string(), |d| d.to_string());
    output.push_str(&format!(
        "\n\n{}",
        ui::style_text(
            &format!("Older: {}  Newer: {}", nav(older), nav(newer)),
            ui::StyleType::Subtle
        )
    ));
    Ok(output)
}
