use super::ui;
use crate::App;
use crate::core::analytics::{self, StockStatus};
use crate::core::records::StockItem;
use crate::workflow::NewStockItem;
use anyhow::Result;
use comfy_table::Cell;

/// Stock table with status, margin and value per item.
pub fn display_stock_table(stock: &[StockItem], low_threshold: f64, currency: &str) -> String {
    if stock.is_empty() {
        return "No stock items yet. Add one with `stockbook stock add`.".to_string();
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Item"),
        ui::header_cell("Qty"),
        ui::header_cell("Buying"),
        ui::header_cell("Selling"),
        ui::header_cell("Margin"),
        ui::header_cell("Value"),
        ui::header_cell("Status"),
    ]);

    for item in stock {
        let margin = analytics::item_margin(item);
        table.add_row(vec![
            Cell::new(&item.name),
            ui::number_cell(item.quantity),
            ui::money_cell(currency, item.buying_price),
            ui::money_cell(currency, item.selling_price),
            Cell::new(format!(
                "{} ({:.1}%)",
                ui::money(currency, margin.margin),
                margin.percentage
            )),
            ui::money_cell(currency, item.stock_value()),
            ui::status_cell(StockStatus::of(item.quantity, low_threshold)),
        ]);
    }

    let overview = analytics::stock_overview(stock, low_threshold);
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Stock", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\n{}: {}  ({} items, {} low, {} out)",
        ui::style_text("Stock value", ui::StyleType::TotalLabel),
        ui::style_text(
            &ui::money(currency, overview.total_value),
            ui::StyleType::TotalValue
        ),
        overview.item_count,
        overview.low_stock,
        overview.out_of_stock
    ));
    output
}

pub fn run_list(app: &App) -> String {
    display_stock_table(
        &app.state.snapshot.stock,
        app.config.low_stock_threshold,
        app.currency(),
    )
}

pub async fn run_add(app: &mut App, input: NewStockItem) -> Result<String> {
    let item = app.shop.add_stock_item(&mut app.state, input).await?;
    Ok(format!(
        "Added {} ({} in stock)",
        ui::style_text(&item.name, ui::StyleType::TotalLabel),
        ui::format_quantity(item.quantity)
    ))
}

pub async fn run_restock(app: &mut App, key: &str, quantity: f64) -> Result<String> {
    let item = app.shop.restock(&mut app.state, key, quantity).await?;
    Ok(format!(
        "Restocked {}: {} now in stock",
        ui::style_text(&item.name, ui::StyleType::TotalLabel),
        ui::format_quantity(item.quantity)
    ))
}

pub async fn run_delete(app: &mut App, key: &str) -> Result<String> {
    let item = app.shop.delete_stock_item(&mut app.state, key).await?;
    Ok(format!(
        "Deleted {}",
        ui::style_text(&item.name, ui::StyleType::TotalLabel)
    ))
}
