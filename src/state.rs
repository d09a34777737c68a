//! The last loaded snapshot of the shop plus loading and error flags.

use crate::core::records::{DailySummary, ExpenseRecord, SaleRecord, Snapshot, StockItem};
use crate::core::store::StoreError;
use crate::repository::Repository;
use tracing::{debug, error};

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub snapshot: Snapshot,
    pub loading: bool,
    pub error: Option<String>,
}

impl AppState {
    /// A state that has not been loaded yet.
    pub fn new() -> Self {
        AppState {
            loading: true,
            ..Default::default()
        }
    }

    /// Loads all four collections concurrently. On failure the previous
    /// snapshot is kept and the error recorded.
    pub async fn fetch_all(&mut self, repo: &Repository) -> Result<(), StoreError> {
        self.loading = true;
        let result = futures::try_join!(
            repo.stock(),
            repo.sales(),
            repo.summaries(),
            repo.expenses()
        );
        self.loading = false;

        match result {
            Ok((stock, sales, summaries, expenses)) => {
                debug!(
                    stock = stock.len(),
                    sales = sales.len(),
                    summaries = summaries.len(),
                    expenses = expenses.len(),
                    "Fetched all collections"
                );
                self.snapshot = Snapshot {
                    stock,
                    sales,
                    summaries,
                    expenses,
                };
                self.error = None;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch data");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn add_stock(&mut self, item: StockItem) {
        self.snapshot.stock.push(item);
    }

    /// Replaces the item with the same id. Unknown items are ignored.
    pub fn update_stock(&mut self, item: StockItem) {
        if let Some(slot) = self.snapshot.stock.iter_mut().find(|s| s.id == item.id) {
            *slot = item;
        }
    }

    pub fn remove_stock(&mut self, id: &str) {
        self.snapshot.stock.retain(|s| s.id != id);
    }

    /// Adds an expense keeping the newest-first order.
    pub fn add_expense(&mut self, expense: ExpenseRecord) {
        let position = self
            .snapshot
            .expenses
            .iter()
            .position(|e| e.date <= expense.date)
            .unwrap_or(self.snapshot.expenses.len());
        self.snapshot.expenses.insert(position, expense);
    }

    pub fn replace_stock(&mut self, stock: Vec<StockItem>) {
        self.snapshot.stock = stock;
    }

    pub fn replace_sales(&mut self, sales: Vec<SaleRecord>) {
        self.snapshot.sales = sales;
    }

    pub fn replace_summaries(&mut self, summaries: Vec<DailySummary>) {
        self.snapshot.summaries = summaries;
    }

    pub fn replace_expenses(&mut self, expenses: Vec<ExpenseRecord>) {
        self.snapshot.expenses = expenses;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{Collection, Document, DocumentStore};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn doc(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    fn item(id: &str, quantity: f64) -> StockItem {
        StockItem {
            id: id.to_string(),
            name: id.to_string(),
            quantity,
            buying_price: 0.0,
            selling_price: 0.0,
            created_at: None,
            updated_at: None,
        }
    }

    fn expense(date: &str) -> ExpenseRecord {
        ExpenseRecord {
            id: date.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: "x".to_string(),
            amount: 1.0,
            category: Default::default(),
            payment_method: Default::default(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_all_loads_every_collection() {
        let store = Arc::new(MemoryStore::new());
        store
            .create(Collection::Stock, doc(json!({"name": "Milk", "quantity": 3})))
            .await
            .unwrap();
        store
            .create(
                Collection::Sales,
                doc(json!({
                    "date": "2026-06-01",
                    "stockItemId": "m",
                    "stockItemName": "Milk",
                    "quantitySold": 1
                })),
            )
            .await
            .unwrap();
        store
            .create(
                Collection::DailySummaries,
                doc(json!({"date": "2026-06-01", "totalRevenue": 60})),
            )
            .await
            .unwrap();

        let repo = Repository::new(store);
        let mut state = AppState::new();
        assert!(state.loading);
        state.fetch_all(&repo).await.unwrap();

        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(state.snapshot.stock.len(), 1);
        assert_eq!(state.snapshot.sales.len(), 1);
        assert_eq!(state.snapshot.summaries.len(), 1);
        assert!(state.snapshot.expenses.is_empty());
    }

    #[test]
    fn test_incremental_stock_updates() {
        let mut state = AppState::default();
        state.add_stock(item("a", 1.0));
        state.add_stock(item("b", 2.0));
        state.update_stock(item("a", 9.0));
        state.update_stock(item("zzz", 1.0));
        assert_eq!(state.snapshot.stock[0].quantity, 9.0);
        assert_eq!(state.snapshot.stock.len(), 2);

        state.remove_stock("b");
        assert_eq!(state.snapshot.stock.len(), 1);

        state.replace_stock(vec![]);
        assert!(state.snapshot.stock.is_empty());
    }

    #[test]
    fn test_add_expense_keeps_newest_first() {
        let mut state = AppState::default();
        state.replace_expenses(vec![expense("2026-06-03"), expense("2026-06-01")]);
        state.add_expense(expense("2026-06-02"));
        let dates: Vec<String> = state
            .snapshot
            .expenses
            .iter()
            .map(|e| e.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2026-06-03", "2026-06-02", "2026-06-01"]);
    }
}
