//! # Reports
//!
//! Pure reducers over stored transactions and products.
//!
//! ## Report Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Report Pipeline                                 │
//! │                                                                         │
//! │  OwnerStore::transactions().list_by_kind(kind)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  filter_by_range(DateRange, now)      All | LastMonths(n) | Custom     │
//! │       │                               (newest first)                   │
//! │       ▼                                                                 │
//! │  ┌──────────────┬──────────────┬──────────────┐                        │
//! │  │ SalesReport  │ ProfitReport │ RestockReport│                        │
//! │  │ total, items │ revenue,cost │ count, items │                        │
//! │  │ profit @17%  │ fees, margin │ cost, unique │                        │
//! │  └──────────────┴──────────────┴──────────────┘                        │
//! │                                                                         │
//! │  OwnerStore::products().list()                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InventoryReport (sort, filter, value, low/out counts) ──► to_csv()    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reducers take whatever they are given; filtering by kind is the caller's
//! job (`list_by_kind` already does it).

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, Transaction};
use crate::{ADMIN_FEE, COMBINED_FEE, LOW_STOCK_THRESHOLD, PACKAGING_FEE};

// =============================================================================
// Date Range
// =============================================================================

/// Which transactions a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum DateRange {
    #[default]
    All,
    /// From the same moment N calendar months ago, with no upper bound.
    LastMonths { months: u32 },
    /// Both bounds inclusive.
    Custom {
        #[ts(as = "String")]
        start: DateTime<Utc>,
        #[ts(as = "String")]
        end: DateTime<Utc>,
    },
}

impl DateRange {
    pub fn last_months(months: u32) -> Self {
        DateRange::LastMonths { months }
    }

    /// Whether `date` falls inside the range, evaluated at `now`.
    pub fn contains(&self, date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match *self {
            DateRange::All => true,
            DateRange::LastMonths { months } => match now.checked_sub_months(Months::new(months)) {
                Some(start) => date >= start,
                None => true,
            },
            DateRange::Custom { start, end } => date >= start && date <= end,
        }
    }
}

/// Sorts transactions newest first.
pub fn sort_by_date_desc(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Transactions inside `range`, newest first.
pub fn filter_by_range(
    transactions: &[Transaction],
    range: DateRange,
    now: DateTime<Utc>,
) -> Vec<Transaction> {
    let mut filtered: Vec<Transaction> = transactions
        .iter()
        .filter(|t| range.contains(t.date, now))
        .cloned()
        .collect();
    sort_by_date_desc(&mut filtered);
    filtered
}

// =============================================================================
// Sales Report
// =============================================================================

/// Totals over sale transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    pub transaction_count: usize,
    pub total_sales: Money,
    pub total_items: i64,
    /// Σ (selling - buying - selling × 17%) × quantity
    pub total_profit: Money,
}

impl SalesReport {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut report = SalesReport::default();
        for t in transactions {
            report.transaction_count += 1;
            report.total_sales += t.total();
            for item in &t.items {
                report.total_items += item.quantity;
                let unit_profit =
                    item.unit_price() - item.unit_cost() - item.unit_price().apply_rate(COMBINED_FEE);
                report.total_profit += unit_profit * item.quantity;
            }
        }
        report
    }
}

// =============================================================================
// Profit Report
// =============================================================================

/// Revenue, cost and fees over sale transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfitReport {
    pub revenue: Money,
    pub cost: Money,
    /// 13% of each line's revenue
    pub admin_fees: Money,
    /// 4% of each line's revenue
    pub packaging_fees: Money,
    pub profit: Money,
    /// profit / revenue in basis points, negative on a loss; zero when
    /// there is no revenue.
    pub margin_bps: i64,
}

impl ProfitReport {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut report = ProfitReport::default();
        for item in transactions.iter().flat_map(|t| &t.items) {
            let revenue = item.line_total();
            report.revenue += revenue;
            report.cost += item.unit_cost() * item.quantity;
            report.admin_fees += revenue.apply_rate(ADMIN_FEE);
            report.packaging_fees += revenue.apply_rate(PACKAGING_FEE);
        }
        report.profit = report.revenue - report.cost - report.admin_fees - report.packaging_fees;

        report.margin_bps = report.revenue.ratio_bps(report.profit);
        report
    }
}

// =============================================================================
// Restock Report
// =============================================================================

/// Totals over restock (or purchase) transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RestockReport {
    pub transaction_count: usize,
    pub total_items: i64,
    pub total_cost: Money,
    /// Distinct products per transaction, summed over the report. A product
    /// restocked in two transactions counts twice.
    pub unique_products: usize,
}

impl RestockReport {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut report = RestockReport::default();
        for t in transactions {
            report.transaction_count += 1;
            let mut products = HashSet::new();
            for item in &t.items {
                report.total_items += item.quantity;
                report.total_cost += item.line_total();
                products.insert(item.product_id.as_str());
            }
            report.unique_products += products.len();
        }
        report
    }
}

// =============================================================================
// Inventory Report
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InventorySort {
    /// Name ascending
    #[default]
    Name,
    /// Stock descending
    Stock,
    /// Stock value descending
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockFilter {
    #[default]
    All,
    /// Stock at or below the low-stock threshold
    Low,
    /// Stock exactly zero
    Out,
}

impl StockFilter {
    fn accepts(self, product: &Product) -> bool {
        match self {
            StockFilter::All => true,
            StockFilter::Low => product.stock_quantity <= LOW_STOCK_THRESHOLD,
            StockFilter::Out => product.stock_quantity == 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    Low,
    Out,
}

impl StockStatus {
    pub fn of(product: &Product) -> Self {
        if product.is_out_of_stock() {
            StockStatus::Out
        } else if product.is_low_stock() {
            StockStatus::Low
        } else {
            StockStatus::InStock
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::Low => "Low Stock",
            StockStatus::Out => "Out of Stock",
        }
    }
}

/// One product line of the inventory report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryRow {
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub supplier: String,
    pub stock_quantity: i64,
    pub buying_price: Money,
    /// stock × buying price
    pub value: Money,
    pub status: StockStatus,
}

impl From<&Product> for InventoryRow {
    fn from(product: &Product) -> Self {
        InventoryRow {
            product_id: product.id.clone(),
            code: product.code.clone(),
            name: product.name.clone(),
            supplier: product.supplier.clone(),
            stock_quantity: product.stock_quantity,
            buying_price: product.buying_price(),
            value: product.stock_value(),
            status: StockStatus::of(product),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryReport {
    /// Filtered and sorted rows.
    pub rows: Vec<InventoryRow>,
    /// Stock value of the filtered rows.
    pub total_value: Money,
    /// Over all products, regardless of filter.
    pub low_stock_count: usize,
    /// Over all products, regardless of filter.
    pub out_of_stock_count: usize,
}

impl InventoryReport {
    pub fn build(products: &[Product], sort: InventorySort, filter: StockFilter) -> Self {
        let mut rows: Vec<InventoryRow> = products
            .iter()
            .filter(|p| filter.accepts(p))
            .map(InventoryRow::from)
            .collect();

        match sort {
            InventorySort::Name => {
                rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            }
            InventorySort::Stock => rows.sort_by(|a, b| b.stock_quantity.cmp(&a.stock_quantity)),
            InventorySort::Value => rows.sort_by(|a, b| b.value.cmp(&a.value)),
        }

        InventoryReport {
            total_value: rows.iter().map(|r| r.value).sum(),
            low_stock_count: products.iter().filter(|p| p.is_low_stock()).count(),
            out_of_stock_count: products.iter().filter(|p| p.is_out_of_stock()).count(),
            rows,
        }
    }

    /// Renders the rows as CSV (with a header line).
    pub fn to_csv(&self) -> CoreResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "Product ID",
                "Name",
                "Supplier",
                "Stock",
                "Buying Price",
                "Value",
                "Status",
            ])
            .map_err(csv_error)?;

        for row in &self.rows {
            let stock = row.stock_quantity.to_string();
            let buying_price = row.buying_price.to_decimal_string();
            let value = row.value.to_decimal_string();
            writer
                .write_record([
                    row.code.as_str(),
                    row.name.as_str(),
                    row.supplier.as_str(),
                    stock.as_str(),
                    buying_price.as_str(),
                    value.as_str(),
                    row.status.label(),
                ])
                .map_err(csv_error)?;
        }

        writer
            .into_inner()
            .map_err(|e| CoreError::Serialization(e.to_string()))
    }
}

fn csv_error(err: csv::Error) -> CoreError {
    CoreError::Serialization(err.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
