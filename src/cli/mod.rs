//! Terminal views. Each `run*` function returns the text to print so the
//! views can be exercised without a terminal.

pub mod analysis;
pub mod dashboard;
pub mod expenses;
pub mod report;
pub mod sales;
pub mod setup;
pub mod stock;
pub mod ui;
