//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! This crate holds the rules of the back office: how a selling price is
//! recommended from a buying price, what the marketplace takes in fees, how a
//! purchase / restock / sale draft is totalled, and how reports are reduced
//! from stored transactions. Everything here is a pure function or a plain
//! value; the store lives in `stockbook-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard (frontend)                         │   │
//! │  │   Prices ──► Purchase / Restock / Sales ──► Reports             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │ pricing │ │  draft  │ │ report  │ │ catalog │ │  types  │  │   │
//! │  │   │ markup  │ │ Pending │ │ Sales   │ │ search  │ │ Product │  │   │
//! │  │   │ fees    │ │ Trans.  │ │ Profit  │ │ sort    │ │ Trans.  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockbook-db (Store Layer)                      │   │
//! │  │        SQLite, owner-scoped repositories, atomic sale commit    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, Supplier, Transaction, Task, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`pricing`] - Markup, fee and profit calculations
//! - [`draft`] - Pending transaction (line items being assembled)
//! - [`report`] - Sales, profit, inventory and restock reducers
//! - [`catalog`] - Search and sort of in-memory product/supplier lists
//! - [`validation`] - Input validation and numeric coercion
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockbook_core::money::Money;
//! use stockbook_core::pricing;
//! use stockbook_core::types::Rate;
//!
//! // Rp 10.000,00 bought, 25% markup
//! let quote = pricing::quote(Money::from_cents(1_000_000), Rate::from_bps(2500))?;
//!
//! assert_eq!(quote.final_price.cents(), 1_333_333);
//! assert_eq!(quote.profit.cents(), 106_667);
//! # Ok::<(), stockbook_core::CoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod draft;
pub mod error;
pub mod money;
pub mod pricing;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use draft::{PendingTransaction, SnapshotKey};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Marketplace admin fee taken from every selling price (13%).
pub const ADMIN_FEE: Rate = Rate::from_bps(1300);

/// Marketplace packaging fee taken from every selling price (4%).
pub const PACKAGING_FEE: Rate = Rate::from_bps(400);

/// Admin and packaging fee combined (17%), as the sales report applies it.
pub const COMBINED_FEE: Rate = Rate::from_bps(1700);

/// Highest markup still priced as a margin on the final price.
///
/// Above this the calculator switches to cost-plus. The jump between the two
/// formulas just past 99% is kept as-is; see `pricing::recommended_price`.
pub const MARGIN_MARKUP_LIMIT: Rate = Rate::from_bps(9900);

/// Highest markup the calculator accepts (999%).
pub const MAX_MARKUP: Rate = Rate::from_bps(99_900);

/// Highest unit price a product or line may carry (Rp 10.000.000.000,00).
///
/// At this bound a full draft of [`MAX_DRAFT_ITEMS`] lines at
/// [`MAX_ITEM_QUANTITY`] each still fits in an i64 of minor units.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000_000;

/// A product at or below this stock level counts as "low stock".
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Markups (whole percent) offered by the price recommendation table.
pub const DEFAULT_MARKUPS_PERCENT: [u32; 9] = [10, 20, 30, 40, 50, 60, 70, 80, 90];

/// Maximum lines allowed in a single pending transaction.
pub const MAX_DRAFT_ITEMS: usize = 100;

/// Maximum quantity on a single line.
///
/// Restocks arrive in cartons, so this is well above a till's limit.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;
