use super::ui;
use crate::App;
use crate::core::analytics::{self, MonthlyAnalysis, ProfitDistribution};
use crate::core::records::{DailySummary, Snapshot};
use comfy_table::Cell;

impl MonthlyAnalysis {
    pub fn display_as_table(&self, currency: &str) -> String {
        let Some(current) = &self.current else {
            return "No closed days to analyse yet.".to_string();
        };

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Month"),
            ui::header_cell("Days"),
            ui::header_cell("Revenue"),
            ui::header_cell("Expenses"),
            ui::header_cell("Profit"),
            ui::header_cell("Margin"),
            ui::header_cell("Avg/day"),
            ui::header_cell("Revenue growth"),
            ui::header_cell("Profit growth"),
        ]);

        let row = |month: &analytics::MonthlyRollup, growth: Option<(f64, f64)>| {
            vec![
                Cell::new(month.key.name()),
                ui::number_cell(month.days as f64),
                ui::money_cell(currency, month.revenue),
                ui::money_cell(currency, month.expenses),
                ui::profit_cell(currency, month.profit),
                Cell::new(format!("{:.1}%", month.margin())),
                ui::money_cell(currency, month.average_daily_revenue()),
                growth.map_or(Cell::new(""), |(revenue, _)| ui::change_cell(revenue)),
                growth.map_or(Cell::new(""), |(_, profit)| ui::change_cell(profit)),
            ]
        };

        table.add_row(row(current, None));
        for prior in &self.previous {
            table.add_row(row(
                &prior.month,
                Some((prior.revenue_growth, prior.profit_growth)),
            ));
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Monthly performance", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!(
                    "Growth compares {} with each earlier month. Average daily profit: {}",
                    current.key.name(),
                    ui::money(currency, current.average_daily_profit())
                ),
                ui::StyleType::Subtle
            )
        ));
        output
    }
}

impl ProfitDistribution {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Days"),
            ui::header_cell("Count"),
            ui::header_cell("Share"),
        ]);
        for (label, count) in [
            ("Profitable", self.profitable),
            ("Break-even", self.break_even),
            ("Loss", self.loss),
        ] {
            table.add_row(vec![
                Cell::new(label),
                ui::number_cell(count as f64),
                Cell::new(format!("{:.1}%", self.share(count))),
            ]);
        }
        table.to_string()
    }
}

fn day_line(label: &str, day: Option<&DailySummary>, currency: &str) -> String {
    match day {
        Some(summary) => format!(
            "{}: {} ({})",
            ui::style_text(label, ui::StyleType::TotalLabel),
            summary.date,
            ui::money(currency, summary.profit_or_zero())
        ),
        None => format!(
            "{}: {}",
            ui::style_text(label, ui::StyleType::TotalLabel),
            ui::style_text("N/A", ui::StyleType::Subtle)
        ),
    }
}

pub fn display_analysis(snapshot: &Snapshot, currency: &str, top_items: usize) -> String {
    let summaries = &snapshot.summaries;
    let totals = analytics::totals(summaries);

    let mut overview = ui::new_styled_table();
    overview.set_header(vec![ui::header_cell("All time"), ui::header_cell("Amount")]);
    overview.add_row(vec![
        Cell::new("Revenue"),
        ui::money_cell(currency, totals.revenue),
    ]);
    overview.add_row(vec![
        Cell::new("Expenses"),
        ui::money_cell(currency, totals.expenses),
    ]);
    overview.add_row(vec![
        Cell::new("Profit"),
        ui::profit_cell(currency, totals.profit),
    ]);
    overview.add_row(vec![
        Cell::new("Profit margin"),
        Cell::new(format!(
            "{:.1}%",
            analytics::profit_margin(totals.profit, totals.revenue)
        )),
    ]);
    overview.add_row(vec![
        Cell::new("Items sold"),
        ui::number_cell(analytics::total_items_sold(&snapshot.sales)),
    ]);

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Business analysis", ui::StyleType::Title)
    );
    output.push_str(&overview.to_string());
    output.push_str("\n\n");
    output.push_str(&analytics::analyze_months(summaries).display_as_table(currency));

    output.push_str(&format!(
        "\n\n{}\n",
        ui::style_text("Profit distribution", ui::StyleType::Title)
    ));
    output.push_str(&analytics::profit_distribution(summaries).display_as_table());
    output.push_str(&format!(
        "\n{}\n{}",
        day_line("Best day", analytics::best_day(summaries), currency),
        day_line("Worst day", analytics::worst_day(summaries), currency)
    ));

    let top = analytics::top_selling(&snapshot.sales, top_items);
    output.push_str(&format!(
        "\n\n{}\n",
        ui::style_text("Top selling items", ui::StyleType::Title)
    ));
    if top.is_empty() {
        output.push_str("No sales recorded yet.");
    } else {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("#"),
            ui::header_cell("Item"),
            ui::header_cell("Qty sold"),
            ui::header_cell("Revenue"),
        ]);
        for (rank, item) in top.iter().enumerate() {
            table.add_row(vec![
                Cell::new(rank + 1),
                Cell::new(&item.name),
                ui::number_cell(item.quantity),
                ui::money_cell(currency, item.revenue),
            ]);
        }
        output.push_str(&table.to_string());
    }
    output
}

pub fn run(app: &App) -> String {
    display_analysis(&app.state.snapshot, app.currency(), app.config.top_items)
}
