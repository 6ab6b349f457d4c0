//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Transaction   │   │    Supplier     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  code (business)│   │  kind           │   │  code (business)│       │
//! │  │  buying_price   │   │  date           │   │  name, contact  │       │
//! │  │  selling_price  │   │  items[]        │   └─────────────────┘       │
//! │  │  stock_quantity │   │  total_cents    │                             │
//! │  └─────────────────┘   └────────┬────────┘   ┌─────────────────┐       │
//! │                                 │            │ TaskCategory    │       │
//! │  ┌─────────────────┐   ┌────────▼────────┐   │  └── Task       │       │
//! │  │     Rate        │   │    LineItem     │   └─────────────────┘       │
//! │  │  bps (u32)      │   │  product_id     │                             │
//! │  │  1300 = 13%     │   │  quantity       │   Every record carries      │
//! │  └─────────────────┘   │  unit_price     │   owner_id: one owner,      │
//! │                        │  unit_cost      │   no sharing.               │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Products and suppliers have:
//! - `id`: UUID v4 - immutable, used by transactions and the store
//! - `code`: the business identifier the owner types in, potentially mutable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1300 bps = 13% and 2500 bps = 25%.
/// Used for markups and marketplace fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a whole percentage (25 → 25%).
    ///
    /// Saturates at `u32::MAX` bps; the pricing calculator rejects anything
    /// above `MAX_MARKUP` anyway.
    #[inline]
    pub const fn from_whole_percent(percent: u32) -> Self {
        Rate(percent.saturating_mul(100))
    }

    /// Creates a rate from a percentage (for form input). Negative input is
    /// clamped to zero.
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

// =============================================================================
// Owner
// =============================================================================

/// The signed-in user every record belongs to.
///
/// The only authorization scope in the system: every store query is filtered
/// by it. Construction refuses an empty id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct OwnerId(String);

impl OwnerId {
    /// Creates an owner id, trimming surrounding whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "owner_id".to_string(),
            });
        }
        Ok(OwnerId(trimmed.to_string()))
    }

    /// Returns the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A stocked product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owner this product belongs to.
    pub owner_id: String,

    /// Business identifier shown as "Product ID" in the dashboard.
    pub code: String,

    /// Display name.
    pub name: String,

    /// What the owner pays per unit, in minor units.
    pub buying_price_cents: i64,

    /// What the product sells for, in minor units.
    pub selling_price_cents: i64,

    /// Units on hand. Never negative.
    pub stock_quantity: i64,

    /// Supplier name (free text, not a foreign key).
    pub supplier: String,

    /// When stock last arrived through a purchase or restock.
    #[ts(as = "Option<String>")]
    pub last_restock_at: Option<DateTime<Utc>>,

    /// When stock last left through a sale.
    #[ts(as = "Option<String>")]
    pub last_sale_at: Option<DateTime<Utc>>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the buying price as Money.
    #[inline]
    pub fn buying_price(&self) -> Money {
        Money::from_cents(self.buying_price_cents)
    }

    /// Returns the selling price as Money.
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// Stock valued at buying price.
    pub fn stock_value(&self) -> Money {
        self.buying_price().multiply_quantity(self.stock_quantity)
    }

    /// Stock at or below the low-stock threshold (includes out of stock).
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= LOW_STOCK_THRESHOLD
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock_quantity == 0
    }

    /// Checks whether `quantity` units can be sold from current stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity > 0 && self.stock_quantity >= quantity
    }
}

/// Form values for creating or editing a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub code: String,
    pub name: String,
    pub buying_price_cents: i64,
    pub selling_price_cents: i64,
    pub stock_quantity: i64,
    pub supplier: String,
}

// =============================================================================
// Supplier
// =============================================================================

/// A supplier goods are bought from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub owner_id: String,
    /// Business identifier shown as "Supplier ID".
    pub code: String,
    pub name: String,
    /// Phone number or other contact detail.
    pub contact: String,
}

/// Form values for creating or editing a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierInput {
    pub code: String,
    pub name: String,
    pub contact: String,
}

// =============================================================================
// Transaction Kind
// =============================================================================

/// What a transaction does to stock.
///
/// ```text
/// Purchase ──► stock += qty   (goods bought from a supplier)
/// Restock  ──► stock += qty   (supplier delivery)
/// Sale     ──► stock -= qty   (checked: never below zero)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Purchase,
    Restock,
    Sale,
}

impl TransactionKind {
    /// Stored / serialized name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Purchase => "purchase",
            TransactionKind::Restock => "restock",
            TransactionKind::Sale => "sale",
        }
    }

    /// Whether committing this kind adds to stock.
    pub const fn increases_stock(&self) -> bool {
        matches!(self, TransactionKind::Purchase | TransactionKind::Restock)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchase" => Ok(TransactionKind::Purchase),
            "restock" => Ok(TransactionKind::Restock),
            "sale" => Ok(TransactionKind::Sale),
            other => Err(ValidationError::InvalidFormat {
                field: "kind".to_string(),
                reason: format!("unknown transaction kind '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One line of a transaction.
/// Product data is frozen at the time the line was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub product_id: String,
    /// Product name at time of transaction (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Price the line is totalled at: buying price for purchase/restock,
    /// selling price for sale.
    pub unit_price_cents: i64,
    /// Buying price at time of transaction, for profit reports.
    pub unit_cost_cents: i64,
    /// Supplier name at time of transaction.
    pub supplier_name: Option<String>,
}

impl LineItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }

    /// unit_price × quantity
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A committed purchase, restock or sale. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub owner_id: String,
    pub kind: TransactionKind,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    /// Lines in the order they were added.
    pub items: Vec<LineItem>,
    pub total_cents: i64,
}

impl Transaction {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Σ quantity over all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Σ unit_price × quantity recomputed from the lines.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }
}

// =============================================================================
// Tasks
// =============================================================================

/// A named group of to-do items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaskCategory {
    pub id: String,
    pub owner_id: String,
    pub name: String,
}

/// A to-do item, grouped by category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Task {
    pub id: String,
    pub owner_id: String,
    pub category: String,
    pub text: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
