//! Record entry: stock changes, expenses and closing out a day.
//!
//! Each operation validates its input, writes through the [`Repository`] and
//! then patches the [`AppState`] it was handed. A day close is written as a
//! single atomic batch, so a failed close leaves the store untouched.

use crate::core::analytics::{self, CloseLine, CloseTotals};
use crate::core::quantity::{QuantityError, QuantitySold};
use crate::core::records::{
    DailySummary, ExpenseCategory, ExpenseRecord, PaymentMethod, SaleRecord, Snapshot, StockItem,
};
use crate::core::store::{Collection, StoreError, WriteBatch};
use crate::repository::{DATE_FIELD, QUANTITY_FIELD, Repository, decode, to_document};
use crate::state::AppState;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    #[error("Invalid quantity for {item}: {source}")]
    InvalidQuantity {
        item: String,
        #[source]
        source: QuantityError,
    },

    #[error("No stock item matches '{0}'")]
    UnknownStockItem(String),

    #[error("No items sold: enter a quantity for at least one item")]
    NothingSold,

    #[error("Only {available} of {item} in stock, cannot sell {requested}")]
    InsufficientStock {
        item: String,
        available: f64,
        requested: f64,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    /// True when the store refused a write because the record already exists,
    /// e.g. a second close for the same date.
    pub fn is_conflict(&self) -> bool {
        matches!(self, WorkflowError::Store(StoreError::Conflict { .. }))
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(value.to_string())
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotFinite(field))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if finite(field, value)? < 0.0 {
        Err(ValidationError::Negative(field))
    } else {
        Ok(value)
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if finite(field, value)? <= 0.0 {
        Err(ValidationError::NotPositive(field))
    } else {
        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStockItem {
    pub name: String,
    pub quantity: f64,
    pub buying_price: f64,
    pub selling_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub category: ExpenseCategory,
}

/// One item line of a day close: a stock id or name and the quantity as
/// typed, e.g. `"3"`, `"1.5"` or `"1/4"`.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleLine {
    pub item: String,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseLine {
    pub description: String,
    pub amount: f64,
}

/// Parses `ITEM=QUANTITY`, e.g. `Soda=3` or `Sugar 1kg=1/2`.
impl FromStr for SaleLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (item, quantity) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected ITEM=QUANTITY, got '{s}'"))?;
        Ok(SaleLine {
            item: item.trim().to_string(),
            quantity: quantity.trim().to_string(),
        })
    }
}

/// Parses `DESCRIPTION=AMOUNT`, e.g. `Transport=200`.
impl FromStr for ExpenseLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (description, amount) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected DESCRIPTION=AMOUNT, got '{s}'"))?;
        let amount = amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())
            .ok_or_else(|| format!("'{}' is not a valid amount", amount.trim()))?;
        Ok(ExpenseLine {
            description: description.trim().to_string(),
            amount,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayClose {
    pub date: NaiveDate,
    pub sales: Vec<SaleLine>,
    pub mpesa: f64,
    pub expenses: Vec<ExpenseLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSale {
    pub item: StockItem,
    pub quantity: QuantitySold,
    pub value: f64,
}

impl PlannedSale {
    pub fn revenue(&self) -> f64 {
        self.value * self.item.selling_price
    }
}

/// A validated day close with its figures, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct DayClosePlan {
    pub date: NaiveDate,
    pub sales: Vec<PlannedSale>,
    pub expenses: Vec<ExpenseLine>,
    pub totals: CloseTotals,
}

impl DayClosePlan {
    /// Every write of the close: sale records, stock decrements, expenses
    /// and finally the summary, which must be the only one for its date.
    fn to_batch(&self, stock_floor: Option<f64>) -> Result<WriteBatch, StoreError> {
        let mut batch = WriteBatch::new();

        for sale in &self.sales {
            let record = SaleRecord {
                id: String::new(),
                date: self.date,
                stock_item_id: sale.item.id.clone(),
                stock_item_name: sale.item.name.clone(),
                quantity_sold: sale.quantity.clone(),
                selling_price: sale.item.selling_price,
                total_revenue: sale.revenue(),
                created_at: None,
            };
            batch.create(Collection::Sales, to_document(&record)?);
        }

        for sale in &self.sales {
            batch.adjust(
                Collection::Stock,
                &sale.item.id,
                QUANTITY_FIELD,
                -sale.value,
                stock_floor,
            );
        }

        for line in &self.expenses {
            let record = ExpenseRecord {
                id: String::new(),
                date: self.date,
                description: line.description.clone(),
                amount: line.amount,
                category: ExpenseCategory::Daily,
                payment_method: PaymentMethod::Cash,
                created_at: None,
            };
            batch.create(Collection::Expenses, to_document(&record)?);
        }

        batch.create_unique(
            Collection::DailySummaries,
            to_document(&self.summary_record())?,
            DATE_FIELD,
        );

        Ok(batch)
    }

    fn summary_record(&self) -> DailySummary {
        DailySummary {
            id: String::new(),
            date: self.date,
            total_revenue: self.totals.revenue,
            total_mpesa: self.totals.mpesa,
            total_expenses: self.totals.expenses,
            total_cost: Some(self.totals.cost),
            profit: Some(self.totals.profit),
            cash_remaining: self.totals.cash_remaining,
            created_at: None,
        }
    }
}

pub struct Shop {
    repo: Repository,
    allow_negative_stock: bool,
}

impl Shop {
    pub fn new(repo: Repository, allow_negative_stock: bool) -> Self {
        Self {
            repo,
            allow_negative_stock,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub async fn add_stock_item(
        &self,
        state: &mut AppState,
        input: NewStockItem,
    ) -> Result<StockItem, WorkflowError> {
        let draft = StockItem {
            id: String::new(),
            name: required("Item name", &input.name)?,
            quantity: non_negative("Quantity", input.quantity)?,
            buying_price: non_negative("Buying price", input.buying_price)?,
            selling_price: non_negative("Selling price", input.selling_price)?,
            created_at: None,
            updated_at: None,
        };

        let item = self.repo.create_stock(to_document(&draft)?).await?;
        info!(id = %item.id, name = %item.name, "Added stock item");
        state.add_stock(item.clone());
        Ok(item)
    }

    /// Adds `quantity` to an item found by id or name.
    pub async fn restock(
        &self,
        state: &mut AppState,
        key: &str,
        quantity: f64,
    ) -> Result<StockItem, WorkflowError> {
        let quantity = positive("Restock quantity", quantity)?;
        let id = resolve_item(&state.snapshot, key)?.id.clone();

        let item = self.repo.adjust_stock(&id, quantity, None).await?;
        info!(id = %item.id, added = quantity, now = item.quantity, "Restocked item");
        state.update_stock(item.clone());
        Ok(item)
    }

    /// Deletes an item found by id or name. Past sales keep the item's name.
    pub async fn delete_stock_item(
        &self,
        state: &mut AppState,
        key: &str,
    ) -> Result<StockItem, WorkflowError> {
        let item = resolve_item(&state.snapshot, key)?.clone();
        self.repo.delete_stock(&item.id).await?;
        info!(id = %item.id, name = %item.name, "Deleted stock item");
        state.remove_stock(&item.id);
        Ok(item)
    }

    pub async fn record_expense(
        &self,
        state: &mut AppState,
        input: NewExpense,
    ) -> Result<ExpenseRecord, WorkflowError> {
        let draft = ExpenseRecord {
            id: String::new(),
            date: input.date,
            description: required("Description", &input.description)?,
            amount: positive("Amount", input.amount)?,
            category: input.category,
            payment_method: PaymentMethod::Cash,
            created_at: None,
        };

        let expense = self.repo.create_expense(to_document(&draft)?).await?;
        info!(id = %expense.id, amount = expense.amount, "Recorded expense");
        state.add_expense(expense.clone());
        Ok(expense)
    }

    /// Validates a day close against the loaded stock and computes its
    /// figures without writing anything.
    pub fn preview_day_close(
        &self,
        snapshot: &Snapshot,
        input: &DayClose,
    ) -> Result<DayClosePlan, ValidationError> {
        let mpesa = non_negative("M-Pesa total", input.mpesa)?;

        let mut sales = Vec::new();
        for line in &input.sales {
            let item = resolve_item(snapshot, &line.item)?;
            let quantity = QuantitySold::from_input(&line.quantity).map_err(|source| {
                ValidationError::InvalidQuantity {
                    item: item.name.clone(),
                    source,
                }
            })?;
            let value = quantity.value();
            if value == 0.0 {
                continue;
            }
            sales.push(PlannedSale {
                item: item.clone(),
                quantity,
                value,
            });
        }
        if sales.is_empty() {
            return Err(ValidationError::NothingSold);
        }

        if !self.allow_negative_stock {
            let mut requested: HashMap<&str, f64> = HashMap::new();
            for sale in &sales {
                *requested.entry(sale.item.id.as_str()).or_default() += sale.value;
            }
            for sale in &sales {
                let total = requested[sale.item.id.as_str()];
                if total > sale.item.quantity {
                    return Err(ValidationError::InsufficientStock {
                        item: sale.item.name.clone(),
                        available: sale.item.quantity,
                        requested: total,
                    });
                }
            }
        }

        let mut expenses = Vec::new();
        for line in &input.expenses {
            let description = line.description.trim();
            if description.is_empty() || line.amount == 0.0 {
                continue;
            }
            expenses.push(ExpenseLine {
                description: description.to_string(),
                amount: non_negative("Expense amount", line.amount)?,
            });
        }

        let lines: Vec<CloseLine> = sales
            .iter()
            .map(|s| CloseLine {
                quantity: s.value,
                selling_price: s.item.selling_price,
                buying_price: s.item.buying_price,
            })
            .collect();
        let amounts: Vec<f64> = expenses.iter().map(|e| e.amount).collect();
        let totals = analytics::close_totals(&lines, mpesa, &amounts);

        Ok(DayClosePlan {
            date: input.date,
            sales,
            expenses,
            totals,
        })
    }

    /// Records a day's sales, stock decrements, expenses and summary in one
    /// atomic write, then reloads the state.
    ///
    /// Fails with a conflict if the date already has a summary, and with a
    /// constraint error if stock would go negative when that is not allowed.
    /// Nothing is written in either case. Once the batch is committed the
    /// close succeeds; a failed reload is left in `state.error`.
    pub async fn close_day(
        &self,
        state: &mut AppState,
        input: &DayClose,
    ) -> Result<DailySummary, WorkflowError> {
        let plan = self.preview_day_close(&state.snapshot, input)?;
        let floor = (!self.allow_negative_stock).then_some(0.0);
        let batch = plan.to_batch(floor)?;
        debug!(
            date = %plan.date,
            sales = plan.sales.len(),
            expenses = plan.expenses.len(),
            "Closing day"
        );

        let mut written = self.repo.commit(batch).await?;
        let summary = match written.pop().map(decode::<DailySummary>) {
            Some(Ok(summary)) => summary,
            Some(Err(e)) => {
                warn!(date = %plan.date, error = %e, "Could not read back the day's summary");
                plan.summary_record()
            }
            None => plan.summary_record(),
        };
        info!(
            date = %summary.date,
            revenue = summary.total_revenue,
            profit = summary.profit_or_zero(),
            "Closed day"
        );

        if let Err(e) = state.fetch_all(&self.repo).await {
            warn!(error = %e, "Day closed but reloading the shop failed");
        }
        Ok(summary)
    }
}

fn resolve_item<'a>(snapshot: &'a Snapshot, key: &str) -> Result<&'a StockItem, ValidationError> {
    snapshot
        .find_stock(key)
        .ok_or_else(|| ValidationError::UnknownStockItem(key.trim().to_string()))
}
