//! Core business logic abstractions

pub mod analytics;
pub mod config;
pub mod log;
pub mod quantity;
pub mod records;
pub mod store;

// Re-export main types for cleaner imports
pub use records::{DailySummary, ExpenseRecord, SaleRecord, Snapshot, StockItem};
pub use store::{Collection, DocumentStore, StoreError};
