use super::ui;
use crate::App;
use crate::core::analytics::{self, Dashboard};
use comfy_table::Cell;

impl Dashboard<'_> {
    pub fn display_as_table(&self, currency: &str) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);

        table.add_row(vec![
            Cell::new("Stock items"),
            ui::number_cell(self.stock.item_count as f64),
        ]);
        table.add_row(vec![
            Cell::new("Stock value"),
            ui::money_cell(currency, self.stock.total_value),
        ]);
        table.add_row(vec![
            Cell::new("Low stock"),
            ui::number_cell(self.stock.low_stock as f64),
        ]);
        table.add_row(vec![
            Cell::new("Out of stock"),
            ui::number_cell(self.stock.out_of_stock as f64),
        ]);
        table.add_row(vec![
            Cell::new("Today's revenue"),
            ui::money_cell(currency, self.today_revenue()),
        ]);
        table.add_row(vec![
            Cell::new("Total revenue"),
            ui::money_cell(currency, self.totals.revenue),
        ]);
        table.add_row(vec![
            Cell::new("Total profit"),
            ui::profit_cell(currency, self.totals.profit),
        ]);

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Dashboard", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        if self.today.is_none() {
            output.push_str(&format!(
                "\n\n{}",
                ui::style_text(
                    "Today has not been closed yet. Run `stockbook sales close`.",
                    ui::StyleType::Subtle
                )
            ));
        }
        output
    }
}

pub fn run(app: &App) -> String {
    let dashboard = analytics::dashboard(
        &app.state.snapshot,
        crate::today(),
        app.config.low_stock_threshold,
    );
    dashboard.display_as_table(app.currency())
}
