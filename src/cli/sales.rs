use super::{report, ui};
use crate::App;
use crate::core::analytics::{self, LedgerWindow, Totals};
use crate::core::records::Snapshot;
use crate::workflow::{DayClose, DayClosePlan};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::Cell;
use tracing::debug;

impl DayClosePlan {
    pub fn display_as_table(&self, currency: &str) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Item"),
            ui::header_cell("Qty"),
            ui::header_cell("Price"),
            ui::header_cell("Revenue"),
        ]);
        for sale in &self.sales {
            table.add_row(vec![
                Cell::new(&sale.item.name),
                Cell::new(sale.quantity.to_string()),
                ui::money_cell(currency, sale.item.selling_price),
                ui::money_cell(currency, sale.revenue()),
            ]);
        }

        let mut output = format!(
            "Day close for {}\n\n",
            ui::style_text(&self.date.to_string(), ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        if !self.expenses.is_empty() {
            let mut expenses = ui::new_styled_table();
            expenses.set_header(vec![ui::header_cell("Expense"), ui::header_cell("Amount")]);
            for line in &self.expenses {
                expenses.add_row(vec![
                    Cell::new(&line.description),
                    ui::money_cell(currency, line.amount),
                ]);
            }
            output.push_str("\n\n");
            output.push_str(&expenses.to_string());
        }

        let t = &self.totals;
        let mut totals = ui::new_styled_table();
        totals.add_row(vec![Cell::new("Items sold"), ui::number_cell(t.quantity)]);
        totals.add_row(vec![Cell::new("Revenue"), ui::money_cell(currency, t.revenue)]);
        totals.add_row(vec![Cell::new("Cost of goods"), ui::money_cell(currency, t.cost)]);
        totals.add_row(vec![Cell::new("M-Pesa"), ui::money_cell(currency, t.mpesa)]);
        totals.add_row(vec![Cell::new("Expenses"), ui::money_cell(currency, t.expenses)]);
        totals.add_row(vec![Cell::new("Profit"), ui::profit_cell(currency, t.profit)]);
        totals.add_row(vec![
            Cell::new("Cash remaining"),
            ui::money_cell(currency, t.cash_remaining),
        ]);
        output.push_str("\n\n");
        output.push_str(&totals.to_string());
        output
    }
}

/// The stock sheet for a day that has not been closed: every item with what
/// is available and its price.
pub fn display_day_sheet(snapshot: &Snapshot, date: NaiveDate, currency: &str) -> String {
    if snapshot.stock.is_empty() {
        return "No stock items to sell. Add some with `stockbook stock add`.".to_string();
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Item"),
        ui::header_cell("Available"),
        ui::header_cell("Selling"),
        ui::header_cell("Buying"),
    ]);
    for item in &snapshot.stock {
        table.add_row(vec![
            Cell::new(&item.name),
            ui::number_cell(item.quantity),
            ui::money_cell(currency, item.selling_price),
            ui::money_cell(currency, item.buying_price),
        ]);
    }

    let mut output = format!(
        "{} has not been closed\n\n",
        ui::style_text(&date.to_string(), ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\n{}",
        ui::style_text(
            &format!(
                "Close it with: stockbook sales close --date {date} --sale ITEM=QTY --mpesa AMOUNT"
            ),
            ui::StyleType::Subtle
        )
    ));
    output
}

fn totals_row(label: &str, totals: &Totals, currency: &str) -> Vec<Cell> {
    vec![
        Cell::new(ui::style_text(label, ui::StyleType::TotalLabel)),
        ui::money_cell(currency, totals.revenue),
        ui::money_cell(currency, totals.mpesa),
        ui::money_cell(currency, totals.revenue - totals.mpesa),
        ui::money_cell(currency, totals.expenses),
        ui::profit_cell(currency, totals.profit),
        ui::money_cell(currency, totals.cash_remaining),
    ]
}

impl LedgerWindow<'_> {
    pub fn display_as_table(&self, currency: &str, next_size: Option<usize>) -> String {
        if self.total_days == 0 {
            return "No days have been closed yet.".to_string();
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Revenue"),
            ui::header_cell("M-Pesa"),
            ui::header_cell("Cash sales"),
            ui::header_cell("Expenses"),
            ui::header_cell("Profit"),
            ui::header_cell("Cash left"),
        ]);
        for summary in &self.rows {
            table.add_row(vec![
                Cell::new(summary.date.to_string()),
                ui::money_cell(currency, summary.total_revenue),
                ui::money_cell(currency, summary.total_mpesa),
                ui::money_cell(currency, summary.cash_sales()),
                ui::money_cell(currency, summary.total_expenses),
                ui::format_optional_cell(summary.profit, |p| ui::money(currency, p)),
                ui::money_cell(currency, summary.cash_remaining),
            ]);
        }
        table.add_row(totals_row("Total", &self.totals, currency));

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Daily ledger", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\nShowing {} of {} days",
            self.rows.len(),
            self.total_days
        ));
        if let Some(next) = next_size.filter(|_| self.has_more()) {
            output.push_str(&ui::style_text(
                &format!(" ({} more; --expand shows {next})", self.remaining()),
                ui::StyleType::Subtle,
            ));
        }
        output
    }
}

pub async fn run_close(app: &mut App, input: &DayClose, dry_run: bool) -> Result<String> {
    let currency = app.config.currency.clone();
    if dry_run {
        let plan = app
            .shop
            .preview_day_close(&app.state.snapshot, input)
            .context("Day close is not valid")?;
        return Ok(format!(
            "{}\n\n{}",
            plan.display_as_table(&currency),
            ui::style_text("Dry run: nothing was recorded.", ui::StyleType::Subtle)
        ));
    }

    let summary = app
        .shop
        .close_day(&mut app.state, input)
        .await
        .with_context(|| format!("Failed to close {}", input.date))?;
    debug!(date = %summary.date, "Day close recorded");

    let report = analytics::day_report(&app.state.snapshot, summary.date);
    Ok(format!(
        "Daily sales recorded.\n\n{}",
        report.display_as_table(&currency)
    ))
}

/// Shows a closed day, or the stock sheet to fill in when it is still open.
pub fn run_day(app: &App, date: NaiveDate) -> String {
    let snapshot = &app.state.snapshot;
    if snapshot.summary_for(date).is_some() {
        report::display_day(snapshot, date, app.currency())
    } else {
        display_day_sheet(snapshot, date, app.currency())
    }
}

/// The ledger window after `expand` "show more" steps, or every day.
pub fn run_ledger(app: &App, expand: usize, all: bool) -> String {
    let summaries = &app.state.snapshot.summaries;
    let total_days = summaries.len();
    let sizes = &app.config.ledger_page_sizes;

    let mut size = if all {
        total_days
    } else {
        sizes.first().copied().unwrap_or(total_days)
    };
    for _ in 0..expand {
        size = analytics::next_window_size(size, sizes, total_days);
    }

    let window = analytics::ledger_window(summaries, size);
    let next = analytics::next_window_size(size, sizes, total_days);
    window.display_as_table(app.currency(), Some(next))
}
