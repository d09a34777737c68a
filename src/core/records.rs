//! Typed records for the four shop collections.

use crate::core::quantity::QuantitySold;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Numbers that are absent or `null` in a stored document count as zero.
fn zero_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn quantity_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<QuantitySold, D::Error> {
    Ok(Option::<QuantitySold>::deserialize(deserializer)?.unwrap_or_default())
}

/// Stock item with on-hand quantity and prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub buying_price: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub selling_price: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StockItem {
    /// Value of the stock on hand at buying price.
    pub fn stock_value(&self) -> f64 {
        self.quantity * self.buying_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: String,
    pub date: NaiveDate,
    pub stock_item_id: String,
    pub stock_item_name: String,
    #[serde(default, deserialize_with = "quantity_or_zero")]
    pub quantity_sold: QuantitySold,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub selling_price: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_revenue: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Transport,
    Supplies,
    Utilities,
    Maintenance,
    Marketing,
    Staff,
    Rent,
    Daily,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 9] = [
        ExpenseCategory::Transport,
        ExpenseCategory::Supplies,
        ExpenseCategory::Utilities,
        ExpenseCategory::Maintenance,
        ExpenseCategory::Marketing,
        ExpenseCategory::Staff,
        ExpenseCategory::Rent,
        ExpenseCategory::Daily,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Transport => "transport",
            ExpenseCategory::Supplies => "supplies",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Maintenance => "maintenance",
            ExpenseCategory::Marketing => "marketing",
            ExpenseCategory::Staff => "staff",
            ExpenseCategory::Rent => "rent",
            ExpenseCategory::Daily => "daily",
            ExpenseCategory::Other => "other",
        }
    }
}

impl Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown expense category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for ExpenseCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        ExpenseCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or(UnknownCategory(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Mpesa,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Mpesa => write!(f, "mpesa"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub amount: f64,
    #[serde(default)]
    pub category: ExpenseCategory,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The once-per-day aggregate of a closed day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_revenue: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_mpesa: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub total_expenses: f64,
    /// Cost of goods sold. Absent on summaries written before it was tracked.
    #[serde(default)]
    pub total_cost: Option<f64>,
    /// Revenue less cost of goods less expenses, fixed at close time.
    #[serde(default)]
    pub profit: Option<f64>,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub cash_remaining: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl DailySummary {
    pub fn profit_or_zero(&self) -> f64 {
        self.profit.unwrap_or(0.0)
    }

    /// Revenue that came in as cash rather than mobile money.
    pub fn cash_sales(&self) -> f64 {
        self.total_revenue - self.total_mpesa
    }
}

/// The four collections as last loaded from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub stock: Vec<StockItem>,
    pub sales: Vec<SaleRecord>,
    pub summaries: Vec<DailySummary>,
    pub expenses: Vec<ExpenseRecord>,
}

impl Snapshot {
    /// Finds a stock item by id, or failing that by case-insensitive name.
    pub fn find_stock(&self, key: &str) -> Option<&StockItem> {
        let key = key.trim();
        self.stock
            .iter()
            .find(|item| item.id == key)
            .or_else(|| {
                self.stock
                    .iter()
                    .find(|item| item.name.eq_ignore_ascii_case(key))
            })
    }

    pub fn summary_for(&self, date: NaiveDate) -> Option<&DailySummary> {
        self.summaries.iter().find(|s| s.date == date)
    }

    pub fn sales_on(&self, date: NaiveDate) -> impl Iterator<Item = &SaleRecord> {
        self.sales.iter().filter(move |s| s.date == date)
    }

    pub fn expenses_on(&self, date: NaiveDate) -> impl Iterator<Item = &ExpenseRecord> {
        self.expenses.iter().filter(move |e| e.date == date)
    }
}
