//! Derived figures over a loaded snapshot: totals, monthly rollups, growth,
//! rankings, stock status and per-day reports.
//!
//! Every function here is pure and total. Missing numbers count as zero and
//! empty inputs give zeroed results, so a view can always render something.
//! Profit is the persisted `profit` of each daily summary, i.e. revenue less
//! cost of goods less expenses as fixed when the day was closed.

use crate::core::records::{DailySummary, ExpenseRecord, SaleRecord, Snapshot, StockItem};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
    pub mpesa: f64,
    pub cash_remaining: f64,
}

/// Sums one numeric field across summaries.
pub fn sum_by<'a>(
    summaries: impl IntoIterator<Item = &'a DailySummary>,
    field: impl Fn(&DailySummary) -> f64,
) -> f64 {
    summaries.into_iter().map(field).sum()
}

pub fn totals<'a>(summaries: impl IntoIterator<Item = &'a DailySummary>) -> Totals {
    summaries
        .into_iter()
        .fold(Totals::default(), |mut acc, summary| {
            acc.revenue += summary.total_revenue;
            acc.expenses += summary.total_expenses;
            acc.profit += summary.profit_or_zero();
            acc.mpesa += summary.total_mpesa;
            acc.cash_remaining += summary.cash_remaining;
            acc
        })
}

/// Percentage change from `previous` to `current`. Zero when `previous` is
/// zero, which also covers "no data".
pub fn growth(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

pub fn profit_margin(profit: f64, revenue: f64) -> f64 {
    if revenue == 0.0 {
        0.0
    } else {
        profit / revenue * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Long name such as "March 2026".
    pub fn name(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRollup {
    pub key: MonthKey,
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
    pub mpesa: f64,
    pub cash_remaining: f64,
    pub days: usize,
}

impl MonthlyRollup {
    fn empty(key: MonthKey) -> Self {
        MonthlyRollup {
            key,
            revenue: 0.0,
            expenses: 0.0,
            profit: 0.0,
            mpesa: 0.0,
            cash_remaining: 0.0,
            days: 0,
        }
    }

    pub fn margin(&self) -> f64 {
        profit_margin(self.profit, self.revenue)
    }

    pub fn average_daily_revenue(&self) -> f64 {
        if self.days == 0 {
            0.0
        } else {
            self.revenue / self.days as f64
        }
    }

    pub fn average_daily_profit(&self) -> f64 {
        if self.days == 0 {
            0.0
        } else {
            self.profit / self.days as f64
        }
    }
}

/// Groups summaries by calendar month, newest month first.
pub fn monthly_rollup(summaries: &[DailySummary]) -> Vec<MonthlyRollup> {
    let mut months: BTreeMap<MonthKey, MonthlyRollup> = BTreeMap::new();
    for summary in summaries {
        let key = MonthKey::of(summary.date);
        let month = months
            .entry(key)
            .or_insert_with(|| MonthlyRollup::empty(key));
        month.revenue += summary.total_revenue;
        month.expenses += summary.total_expenses;
        month.profit += summary.profit_or_zero();
        month.mpesa += summary.total_mpesa;
        month.cash_remaining += summary.cash_remaining;
        month.days += 1;
    }
    months.into_values().rev().collect()
}

/// Growth of the current month against one earlier month.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorMonth {
    pub month: MonthlyRollup,
    pub revenue_growth: f64,
    pub profit_growth: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAnalysis {
    pub current: Option<MonthlyRollup>,
    /// Up to two months before the current one, newest first.
    pub previous: Vec<PriorMonth>,
}

/// Compares the most recent month on record with the two before it.
pub fn analyze_months(summaries: &[DailySummary]) -> MonthlyAnalysis {
    let mut recent = monthly_rollup(summaries);
    recent.truncate(3);
    let mut recent = recent.into_iter();
    let current = recent.next();

    let (current_revenue, current_profit) = current
        .as_ref()
        .map_or((0.0, 0.0), |m| (m.revenue, m.profit));
    let previous = recent
        .map(|month| PriorMonth {
            revenue_growth: growth(current_revenue, month.revenue),
            profit_growth: growth(current_profit, month.profit),
            month,
        })
        .collect();

    MonthlyAnalysis { current, previous }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfitDistribution {
    pub profitable: usize,
    pub break_even: usize,
    pub loss: usize,
}

impl ProfitDistribution {
    pub fn total(&self) -> usize {
        self.profitable + self.break_even + self.loss
    }

    /// Share of all days, in percent.
    pub fn share(&self, count: usize) -> f64 {
        match self.total() {
            0 => 0.0,
            total => count as f64 / total as f64 * 100.0,
        }
    }
}

pub fn profit_distribution(summaries: &[DailySummary]) -> ProfitDistribution {
    summaries
        .iter()
        .fold(ProfitDistribution::default(), |mut dist, summary| {
            let profit = summary.profit_or_zero();
            if profit > 0.0 {
                dist.profitable += 1;
            } else if profit < 0.0 {
                dist.loss += 1;
            } else {
                dist.break_even += 1;
            }
            dist
        })
}

fn extreme_day(
    summaries: &[DailySummary],
    better: impl Fn(f64, f64) -> bool,
) -> Option<&DailySummary> {
    let mut chosen: Option<(&DailySummary, f64)> = None;
    for summary in summaries {
        let Some(profit) = summary.profit else {
            continue;
        };
        match chosen {
            Some((_, current)) if !better(profit, current) => {}
            _ => chosen = Some((summary, profit)),
        }
    }
    chosen.map(|(summary, _)| summary)
}

/// Day with the highest profit. The earliest listed wins a tie.
pub fn best_day(summaries: &[DailySummary]) -> Option<&DailySummary> {
    extreme_day(summaries, |candidate, best| candidate > best)
}

/// Day with the lowest profit. The earliest listed wins a tie.
pub fn worst_day(summaries: &[DailySummary]) -> Option<&DailySummary> {
    extreme_day(summaries, |candidate, worst| candidate < worst)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemSales {
    pub name: String,
    pub quantity: f64,
    pub revenue: f64,
}

/// Sales grouped by item name, best sellers by quantity first.
pub fn top_selling(sales: &[SaleRecord], limit: usize) -> Vec<ItemSales> {
    let mut items: Vec<ItemSales> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for sale in sales {
        let position = *index
            .entry(sale.stock_item_name.as_str())
            .or_insert_with(|| {
                items.push(ItemSales {
                    name: sale.stock_item_name.clone(),
                    quantity: 0.0,
                    revenue: 0.0,
                });
                items.len() - 1
            });
        items[position].quantity += sale.quantity_sold.value();
        items[position].revenue += sale.total_revenue;
    }
    items.sort_by(|a, b| b.quantity.total_cmp(&a.quantity));
    items.truncate(limit);
    items
}

pub fn total_items_sold(sales: &[SaleRecord]) -> f64 {
    sales.iter().map(|s| s.quantity_sold.value()).sum()
}

/// Summaries newest first. Equal dates keep their original order.
pub fn sorted_by_date_desc(summaries: &[DailySummary]) -> Vec<&DailySummary> {
    let mut sorted: Vec<&DailySummary> = summaries.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

/// A window onto the newest days of the ledger with totals over the rows
/// shown.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerWindow<'a> {
    pub rows: Vec<&'a DailySummary>,
    pub totals: Totals,
    pub total_days: usize,
}

impl LedgerWindow<'_> {
    pub fn remaining(&self) -> usize {
        self.total_days - self.rows.len()
    }

    pub fn has_more(&self) -> bool {
        self.remaining() > 0
    }
}

pub fn ledger_window(summaries: &[DailySummary], count: usize) -> LedgerWindow<'_> {
    let sorted = sorted_by_date_desc(summaries);
    let total_days = sorted.len();
    let rows: Vec<&DailySummary> = sorted.into_iter().take(count).collect();
    let totals = totals(rows.iter().copied());
    LedgerWindow {
        rows,
        totals,
        total_days,
    }
}

/// The window size after `current`: the next configured size, or every day
/// once the configured sizes run out.
pub fn next_window_size(current: usize, sizes: &[usize], total_days: usize) -> usize {
    sizes
        .iter()
        .copied()
        .find(|&size| size > current && size < total_days)
        .unwrap_or(total_days)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub fn of(quantity: f64, low_threshold: f64) -> Self {
        if quantity <= 0.0 {
            StockStatus::OutOfStock
        } else if quantity <= low_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

impl Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StockOverview {
    pub item_count: usize,
    pub total_value: f64,
    pub low_stock: usize,
    pub out_of_stock: usize,
}

pub fn stock_overview(stock: &[StockItem], low_threshold: f64) -> StockOverview {
    stock
        .iter()
        .fold(StockOverview::default(), |mut overview, item| {
            overview.item_count += 1;
            overview.total_value += item.stock_value();
            match StockStatus::of(item.quantity, low_threshold) {
                StockStatus::LowStock => overview.low_stock += 1,
                StockStatus::OutOfStock => overview.out_of_stock += 1,
                StockStatus::InStock => {}
            }
            overview
        })
}

/// Per-unit margin of an item and that margin as a percentage of cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemMargin {
    pub margin: f64,
    pub percentage: f64,
}

pub fn item_margin(item: &StockItem) -> ItemMargin {
    let margin = item.selling_price - item.buying_price;
    let percentage = if item.buying_price == 0.0 {
        0.0
    } else {
        margin / item.buying_price * 100.0
    };
    ItemMargin { margin, percentage }
}

/// Every date that has a summary or an expense, newest first.
pub fn report_dates(summaries: &[DailySummary], expenses: &[ExpenseRecord]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = summaries
        .iter()
        .map(|s| s.date)
        .chain(expenses.iter().map(|e| e.date))
        .collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();
    dates
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Older,
    Newer,
}

/// Moves from `selected` to the neighbouring date in a newest-first list.
/// `None` at either end or when `selected` is not in the list.
pub fn step_date(dates: &[NaiveDate], selected: NaiveDate, step: Step) -> Option<NaiveDate> {
    let position = dates.iter().position(|d| *d == selected)?;
    match step {
        Step::Older => dates.get(position + 1).copied(),
        Step::Newer => position.checked_sub(1).and_then(|p| dates.get(p).copied()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine<'a> {
    pub sale: &'a SaleRecord,
    /// Current stock of the item; `None` once the item has been deleted.
    pub remaining_stock: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayReport<'a> {
    pub date: NaiveDate,
    pub summary: Option<&'a DailySummary>,
    pub sales: Vec<ReportLine<'a>>,
    pub expenses: Vec<&'a ExpenseRecord>,
    pub sales_total: f64,
    pub expense_total: f64,
}

impl DayReport<'_> {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.sales.is_empty() && self.expenses.is_empty()
    }
}

pub fn day_report(snapshot: &Snapshot, date: NaiveDate) -> DayReport<'_> {
    let sales: Vec<ReportLine> = snapshot
        .sales_on(date)
        .map(|sale| ReportLine {
            sale,
            remaining_stock: snapshot
                .stock
                .iter()
                .find(|item| item.id == sale.stock_item_id)
                .map(|item| item.quantity),
        })
        .collect();
    let expenses: Vec<&ExpenseRecord> = snapshot.expenses_on(date).collect();

    DayReport {
        date,
        summary: snapshot.summary_for(date),
        sales_total: sales.iter().map(|l| l.sale.total_revenue).sum(),
        expense_total: expenses.iter().map(|e| e.amount).sum(),
        sales,
        expenses,
    }
}

/// One item line of a day being closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloseLine {
    pub quantity: f64,
    pub selling_price: f64,
    pub buying_price: f64,
}

impl CloseLine {
    pub fn revenue(&self) -> f64 {
        self.quantity * self.selling_price
    }

    pub fn cost(&self) -> f64 {
        self.quantity * self.buying_price
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CloseTotals {
    pub quantity: f64,
    pub revenue: f64,
    pub cost: f64,
    pub mpesa: f64,
    pub expenses: f64,
    pub profit: f64,
    pub cash_remaining: f64,
}

/// Figures for a day close. Expenses are paid from the cash drawer, so they
/// come out of cash remaining as well as profit.
pub fn close_totals(lines: &[CloseLine], mpesa: f64, expenses: &[f64]) -> CloseTotals {
    let quantity = lines.iter().map(|l| l.quantity).sum();
    let revenue: f64 = lines.iter().map(CloseLine::revenue).sum();
    let cost: f64 = lines.iter().map(CloseLine::cost).sum();
    let expenses: f64 = expenses.iter().sum();
    CloseTotals {
        quantity,
        revenue,
        cost,
        mpesa,
        expenses,
        profit: revenue - cost - expenses,
        cash_remaining: (revenue - mpesa) - expenses,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard<'a> {
    pub stock: StockOverview,
    pub today: Option<&'a DailySummary>,
    pub totals: Totals,
}

impl Dashboard<'_> {
    pub fn today_revenue(&self) -> f64 {
        self.today.map_or(0.0, |s| s.total_revenue)
    }
}

pub fn dashboard(snapshot: &Snapshot, today: NaiveDate, low_threshold: f64) -> Dashboard<'_> {
    Dashboard {
        stock: stock_overview(&snapshot.stock, low_threshold),
        today: snapshot.summary_for(today),
        totals: totals(&snapshot.summaries),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quantity::QuantitySold;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn summary(day: &str, revenue: f64, expenses: f64, profit: Option<f64>) -> DailySummary {
        DailySummary {
            id: format!("sum-{day}"),
            date: date(day),
            total_revenue: revenue,
            total_mpesa: revenue / 2.0,
            total_expenses: expenses,
            total_cost: None,
            profit,
            cash_remaining: revenue / 2.0 - expenses,
            created_at: None,
        }
    }

    fn sale(name: &str, quantity: QuantitySold, revenue: f64) -> SaleRecord {
        SaleRecord {
            id: format!("sale-{name}-{revenue}"),
            date: date("2026-04-01"),
            stock_item_id: format!("item-{name}"),
            stock_item_name: name.to_string(),
            quantity_sold: quantity,
            selling_price: 0.0,
            total_revenue: revenue,
            created_at: None,
        }
    }

    fn item(id: &str, quantity: f64, buying: f64, selling: f64) -> StockItem {
        StockItem {
            id: id.to_string(),
            name: id.to_uppercase(),
            quantity,
            buying_price: buying,
            selling_price: selling,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_totals_sum_fields() {
        let summaries = vec![
            summary("2026-01-01", 1000.0, 100.0, Some(300.0)),
            summary("2026-01-02", 500.0, 50.0, None),
        ];
        let t = totals(&summaries);
        assert_eq!(t.revenue, 1500.0);
        assert_eq!(t.expenses, 150.0);
        assert_eq!(t.profit, 300.0);
        assert_eq!(t.mpesa, 750.0);
        assert_eq!(sum_by(&summaries, |s| s.total_revenue), 1500.0);
    }

    #[test]
    fn test_totals_empty_is_zero() {
        assert_eq!(totals(&[]), Totals::default());
    }

    #[test]
    fn test_monthly_rollup_partitions_input() {
        let summaries = vec![
            summary("2026-01-05", 100.0, 10.0, Some(40.0)),
            summary("2026-03-01", 300.0, 30.0, Some(90.0)),
            summary("2026-01-20", 200.0, 20.0, Some(60.0)),
            summary("2025-12-31", 50.0, 5.0, Some(-5.0)),
        ];
        let months = monthly_rollup(&summaries);

        let keys: Vec<String> = months.iter().map(|m| m.key.to_string()).collect();
        assert_eq!(keys, vec!["2026-03", "2026-01", "2025-12"]);

        let january = &months[1];
        assert_eq!(january.days, 2);
        assert_eq!(january.revenue, 300.0);
        assert_eq!(january.expenses, 30.0);
        assert_eq!(january.profit, 100.0);
        assert_eq!(january.key.name(), "January 2026");

        let day_count: usize = months.iter().map(|m| m.days).sum();
        assert_eq!(day_count, summaries.len());
        let revenue: f64 = months.iter().map(|m| m.revenue).sum();
        assert_eq!(revenue, totals(&summaries).revenue);
    }

    #[test]
    fn test_growth_against_previous_months() {
        let summaries = vec![
            summary("2026-03-10", 100000.0, 0.0, Some(20000.0)),
            summary("2026-02-10", 80000.0, 0.0, Some(10000.0)),
            summary("2026-01-10", 60000.0, 0.0, Some(0.0)),
        ];
        let analysis = analyze_months(&summaries);
        let current = analysis.current.as_ref().unwrap();
        assert_eq!(current.revenue, 100000.0);
        assert_eq!(analysis.previous.len(), 2);
        assert_eq!(analysis.previous[0].revenue_growth, 25.0);
        assert_eq!(analysis.previous[0].profit_growth, 100.0);
        assert!((analysis.previous[1].revenue_growth - 66.666_666).abs() < 1e-3);
        // previous profit of zero gives zero growth
        assert_eq!(analysis.previous[1].profit_growth, 0.0);
    }

    #[test]
    fn test_growth_and_margin_edge_cases() {
        assert_eq!(growth(500.0, 0.0), 0.0);
        assert_eq!(growth(0.0, 0.0), 0.0);
        assert_eq!(growth(50.0, 100.0), -50.0);
        assert_eq!(profit_margin(25.0, 100.0), 25.0);
        assert_eq!(profit_margin(25.0, 0.0), 0.0);
    }

    #[test]
    fn test_analyze_months_without_data() {
        let analysis = analyze_months(&[]);
        assert!(analysis.current.is_none());
        assert!(analysis.previous.is_empty());
    }

    #[test]
    fn test_best_and_worst_day() {
        let summaries = vec![
            summary("2026-01-01", 0.0, 0.0, Some(500.0)),
            summary("2026-01-02", 0.0, 0.0, Some(-200.0)),
            summary("2026-01-03", 0.0, 0.0, Some(1500.0)),
            summary("2026-01-04", 0.0, 0.0, Some(0.0)),
            summary("2026-01-05", 0.0, 0.0, None),
        ];
        assert_eq!(best_day(&summaries).unwrap().date, date("2026-01-03"));
        assert_eq!(worst_day(&summaries).unwrap().date, date("2026-01-02"));
    }

    #[test]
    fn test_best_day_ties_keep_first() {
        let summaries = vec![
            summary("2026-01-01", 0.0, 0.0, Some(700.0)),
            summary("2026-01-02", 0.0, 0.0, Some(700.0)),
        ];
        assert_eq!(best_day(&summaries).unwrap().date, date("2026-01-01"));
        assert_eq!(worst_day(&summaries).unwrap().date, date("2026-01-01"));
        assert!(best_day(&[summary("2026-01-01", 1.0, 0.0, None)]).is_none());
    }

    #[test]
    fn test_profit_distribution() {
        let summaries = vec![
            summary("2026-01-01", 0.0, 0.0, Some(10.0)),
            summary("2026-01-02", 0.0, 0.0, Some(20.0)),
            summary("2026-01-03", 0.0, 0.0, Some(0.0)),
            summary("2026-01-04", 0.0, 0.0, Some(-5.0)),
        ];
        let dist = profit_distribution(&summaries);
        assert_eq!(dist.profitable, 2);
        assert_eq!(dist.break_even, 1);
        assert_eq!(dist.loss, 1);
        assert_eq!(dist.total(), 4);
        assert_eq!(dist.share(dist.profitable), 50.0);
        assert_eq!(ProfitDistribution::default().share(0), 0.0);
    }

    #[test]
    fn test_top_selling_parses_fractions() {
        let sales = vec![
            sale("Soda", QuantitySold::Text("2".to_string()), 120.0),
            sale("Bread", QuantitySold::Number(1.0), 55.0),
            sale("Soda", QuantitySold::Text("1/2".to_string()), 30.0),
        ];
        let top = top_selling(&sales, 5);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Soda");
        assert_eq!(top[0].quantity, 2.5);
        assert_eq!(top[0].revenue, 150.0);
        assert_eq!(top[1].name, "Bread");
        assert_eq!(total_items_sold(&sales), 3.5);
    }

    #[test]
    fn test_top_selling_limit_and_stable_ties() {
        let sales: Vec<SaleRecord> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|n| sale(n, QuantitySold::Number(1.0), 10.0))
            .collect();
        let top = top_selling(&sales, 5);
        let names: Vec<&str> = top.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_ledger_window_totals_only_shown_rows() {
        let summaries = vec![
            summary("2026-01-01", 100.0, 10.0, Some(1.0)),
            summary("2026-01-03", 300.0, 30.0, Some(3.0)),
            summary("2026-01-02", 200.0, 20.0, Some(2.0)),
        ];
        let window = ledger_window(&summaries, 2);
        let dates: Vec<NaiveDate> = window.rows.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date("2026-01-03"), date("2026-01-02")]);
        assert_eq!(window.totals.revenue, 500.0);
        assert_eq!(window.totals.expenses, 50.0);
        assert_eq!(window.total_days, 3);
        assert_eq!(window.remaining(), 1);
        assert!(window.has_more());

        let all = ledger_window(&summaries, 10);
        assert!(!all.has_more());
    }

    #[test]
    fn test_next_window_size_sequence() {
        let sizes = [10, 30, 80];
        assert_eq!(next_window_size(10, &sizes, 200), 30);
        assert_eq!(next_window_size(30, &sizes, 200), 80);
        assert_eq!(next_window_size(80, &sizes, 200), 200);
        assert_eq!(next_window_size(10, &sizes, 25), 25);
    }

    #[test]
    fn test_stock_overview_and_status() {
        let stock = vec![
            item("a", 0.0, 10.0, 15.0),
            item("b", 5.0, 20.0, 30.0),
            item("c", 10.0, 1.0, 2.0),
            item("d", 50.0, 2.0, 3.0),
        ];
        let overview = stock_overview(&stock, 10.0);
        assert_eq!(overview.item_count, 4);
        assert_eq!(overview.out_of_stock, 1);
        assert_eq!(overview.low_stock, 2);
        assert_eq!(overview.total_value, 100.0 + 10.0 + 100.0);
        assert_eq!(StockStatus::of(11.0, 10.0), StockStatus::InStock);
        assert_eq!(StockStatus::of(0.0, 10.0).to_string(), "Out of Stock");
    }

    #[test]
    fn test_item_margin() {
        let m = item_margin(&item("a", 1.0, 40.0, 60.0));
        assert_eq!(m.margin, 20.0);
        assert_eq!(m.percentage, 50.0);
        assert_eq!(item_margin(&item("b", 1.0, 0.0, 60.0)).percentage, 0.0);
    }

    #[test]
    fn test_report_dates_and_navigation() {
        let summaries = vec![
            summary("2026-01-02", 1.0, 0.0, None),
            summary("2026-01-01", 1.0, 0.0, None),
        ];
        let expenses = vec![ExpenseRecord {
            id: "e".to_string(),
            date: date("2026-01-04"),
            description: "Fuel".to_string(),
            amount: 10.0,
            category: Default::default(),
            payment_method: Default::default(),
            created_at: None,
        }];
        let mut with_duplicate = summaries.clone();
        with_duplicate.push(summary("2026-01-04", 1.0, 0.0, None));

        let dates = report_dates(&with_duplicate, &expenses);
        assert_eq!(
            dates,
            vec![date("2026-01-04"), date("2026-01-02"), date("2026-01-01")]
        );
        assert_eq!(
            step_date(&dates, date("2026-01-04"), Step::Older),
            Some(date("2026-01-02"))
        );
        assert_eq!(step_date(&dates, date("2026-01-04"), Step::Newer), None);
        assert_eq!(step_date(&dates, date("2026-01-01"), Step::Older), None);
        assert_eq!(step_date(&dates, date("2025-01-01"), Step::Older), None);
    }

    #[test]
    fn test_day_report_marks_missing_items() {
        let snapshot = Snapshot {
            stock: vec![item("item-Soda", 7.0, 40.0, 60.0)],
            sales: vec![
                sale("Soda", QuantitySold::Number(2.0), 120.0),
                sale("Gone", QuantitySold::Number(1.0), 80.0),
            ],
            summaries: vec![summary("2026-04-01", 200.0, 0.0, Some(50.0))],
            expenses: vec![],
        };
        let report = day_report(&snapshot, date("2026-04-01"));
        assert!(report.summary.is_some());
        assert_eq!(report.sales.len(), 2);
        assert_eq!(report.sales[0].remaining_stock, Some(7.0));
        assert_eq!(report.sales[1].remaining_stock, None);
        assert_eq!(report.sales_total, 200.0);
        assert!(day_report(&snapshot, date("2026-04-02")).is_empty());
    }

    #[test]
    fn test_close_totals() {
        let lines = [
            CloseLine {
                quantity: 2.0,
                selling_price: 60.0,
                buying_price: 40.0,
            },
            CloseLine {
                quantity: 0.25,
                selling_price: 400.0,
                buying_price: 200.0,
            },
        ];
        let t = close_totals(&lines, 50.0, &[20.0, 10.0]);
        assert_eq!(t.quantity, 2.25);
        assert_eq!(t.revenue, 220.0);
        assert_eq!(t.cost, 130.0);
        assert_eq!(t.expenses, 30.0);
        assert_eq!(t.profit, 60.0);
        assert_eq!(t.cash_remaining, 140.0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let summaries = vec![
            summary("2026-02-01", 10.0, 1.0, Some(2.0)),
            summary("2026-03-01", 20.0, 2.0, Some(4.0)),
        ];
        assert_eq!(analyze_months(&summaries), analyze_months(&summaries));
        assert_eq!(totals(&summaries), totals(&summaries));
        assert_eq!(ledger_window(&summaries, 1), ledger_window(&summaries, 1));
    }

    #[test]
    fn test_dashboard() {
        let snapshot = Snapshot {
            stock: vec![item("a", 3.0, 10.0, 20.0)],
            summaries: vec![summary("2026-04-01", 200.0, 0.0, Some(50.0))],
            ..Default::default()
        };
        let dash = dashboard(&snapshot, date("2026-04-01"), 10.0);
        assert_eq!(dash.today_revenue(), 200.0);
        assert_eq!(dash.totals.profit, 50.0);
        assert_eq!(dash.stock.low_stock, 1);
        assert_eq!(dashboard(&snapshot, date("2026-04-02"), 10.0).today_revenue(), 0.0);
    }
}
