//! # Pending Transactions
//!
//! The line-item draft behind the purchase, restock and sale pages.
//!
//! ## Draft Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Pending Transaction Lifecycle                        │
//! │                                                                         │
//! │  Page Action               Draft Operation          Snapshot           │
//! │  ───────────               ───────────────          ────────           │
//! │                                                                         │
//! │  Page load ──────────────► from_json() ◄──────────── load_draft        │
//! │                                                                         │
//! │  Pick product + qty ─────► add_item() ───────────────► save_draft      │
//! │                            add_sale_item() (checks stock)              │
//! │                                                                         │
//! │  Change quantity ────────► update_quantity() ────────► save_draft      │
//! │                                                                         │
//! │  Click remove ───────────► remove_item() ────────────► save_draft      │
//! │                                                                         │
//! │  Save transaction ───────► TransactionRepository::commit              │
//! │                            (stock + record + clear_draft, one tx)      │
//! │                                                                         │
//! │  Discard ────────────────► clear() ──────────────────► clear_draft     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id`; adding the same product again adds to
//!   its quantity and keeps the line in place
//! - Every quantity is between 1 and `MAX_ITEM_QUANTITY`
//! - At most `MAX_DRAFT_ITEMS` lines
//! - `total()` is exactly Σ unit_price × quantity

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{LineItem, Product, TransactionKind};
use crate::validation::{validate_draft_size, validate_line_item, validate_quantity};
use crate::{MAX_DRAFT_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Snapshot Keys
// =============================================================================

/// Keys of the per-owner local snapshot store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKey {
    PurchaseDraft,
    RestockDraft,
    SaleDraft,
    SelectedMarkups,
}

impl SnapshotKey {
    /// The draft key for a transaction kind.
    pub const fn for_draft(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Purchase => SnapshotKey::PurchaseDraft,
            TransactionKind::Restock => SnapshotKey::RestockDraft,
            TransactionKind::Sale => SnapshotKey::SaleDraft,
        }
    }

    /// Stored key name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SnapshotKey::PurchaseDraft => "purchaseTransactionDraft",
            SnapshotKey::RestockDraft => "restockTransactionDraft",
            SnapshotKey::SaleDraft => "saleTransactionDraft",
            SnapshotKey::SelectedMarkups => "selectedMarkups",
        }
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Pending Transaction
// =============================================================================

/// A transaction being assembled, not yet committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    kind: TransactionKind,
    items: Vec<LineItem>,
}

impl PendingTransaction {
    /// Creates an empty draft.
    pub fn new(kind: TransactionKind) -> Self {
        PendingTransaction {
            kind,
            items: Vec::new(),
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Lines in the order they were first added.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Adds a product or increases its quantity if already on the draft.
    ///
    /// The line is priced at the buying price for purchases and restocks and
    /// at the selling price for sales; the buying price is always kept as the
    /// unit cost.
    ///
    /// ## Errors
    /// - `Validation` if `quantity` is not positive or too large, or a price
    ///   is outside `0..=MAX_PRICE_CENTS`
    /// - `QuantityTooLarge` if the merged quantity would exceed the maximum
    /// - `DraftTooLarge` if a new line would exceed the line limit
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(item) = self.find_mut(&product.id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            return Ok(());
        }

        validate_draft_size(self.items.len()).map_err(|_| CoreError::DraftTooLarge {
            max: MAX_DRAFT_ITEMS,
        })?;

        let line = self.line_for(product, quantity);
        validate_line_item(&line)?;
        self.items.push(line);
        Ok(())
    }

    /// Adds a product to a sale draft, refusing to go beyond current stock.
    ///
    /// The check counts what is already on the draft:
    /// ```text
    /// stock 5, draft has 3, add 3 ──► InsufficientStock { available: 5, requested: 6 }
    /// ```
    pub fn add_sale_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if self.kind != TransactionKind::Sale {
            return Err(ValidationError::InvalidFormat {
                field: "kind".to_string(),
                reason: format!("stock-checked lines belong on a sale, not a {}", self.kind),
            }
            .into());
        }
        validate_quantity(quantity)?;

        let already = self.find(&product.id).map(|i| i.quantity).unwrap_or(0);
        let requested = already + quantity;
        if requested > product.stock_quantity {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock_quantity,
                requested,
            });
        }

        self.add_item(product, quantity)
    }

    /// Sets the quantity of a line. Zero removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id).map(|_| ());
        }

        validate_quantity(quantity)?;

        match self.find_mut(product_id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ProductNotFound(product_id.to_string())),
        }
    }

    /// Removes a line by product ID and returns it.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<LineItem> {
        let index = self
            .items
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        Ok(self.items.remove(index))
    }

    /// Drops every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Σ unit_price × quantity.
    pub fn total(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Σ quantity.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    // -------------------------------------------------------------------------
    // Snapshot encoding
    // -------------------------------------------------------------------------

    /// Serializes the lines for the snapshot store.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(&self.items).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    /// Restores a draft from its snapshot.
    ///
    /// The snapshot is untrusted: text that is not a list of lines, a line
    /// that fails validation, a repeated product or too many lines all reject
    /// the whole snapshot with `CorruptSnapshot`.
    pub fn from_json(kind: TransactionKind, json: &str) -> CoreResult<Self> {
        let key = SnapshotKey::for_draft(kind).as_str();
        let corrupt = |reason: String| CoreError::CorruptSnapshot {
            key: key.to_string(),
            reason,
        };

        let items: Vec<LineItem> = serde_json::from_str(json).map_err(|e| corrupt(e.to_string()))?;

        if items.len() > MAX_DRAFT_ITEMS {
            return Err(corrupt(format!("more than {} lines", MAX_DRAFT_ITEMS)));
        }

        for (index, item) in items.iter().enumerate() {
            validate_line_item(item).map_err(|e| corrupt(format!("line {}: {}", index, e)))?;
            if items[..index].iter().any(|i| i.product_id == item.product_id) {
                return Err(corrupt(format!(
                    "line {}: product {} appears twice",
                    index, item.product_id
                )));
            }
        }

        Ok(PendingTransaction { kind, items })
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn find(&self, product_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    fn find_mut(&mut self, product_id: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|i| i.product_id == product_id)
    }

    fn line_for(&self, product: &Product, quantity: i64) -> LineItem {
        let unit_price_cents = match self.kind {
            TransactionKind::Sale => product.selling_price_cents,
            TransactionKind::Purchase | TransactionKind::Restock => product.buying_price_cents,
        };
        let supplier = product.supplier.trim();
        LineItem {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
            unit_price_cents,
            unit_cost_cents: product.buying_price_cents,
            supplier_name: (!supplier.is_empty()).then(|| supplier.to_string()),
        }
    }
}

/// Draft totals summary for the page footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DraftTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub total: Money,
}

impl From<&PendingTransaction> for DraftTotals {
    fn from(draft: &PendingTransaction) -> Self {
        DraftTotals {
            item_count: draft.len(),
            total_quantity: draft.total_quantity(),
            total: draft.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_PRICE_CENTS;
    use chrono::Utc;

    fn test_product(id: &str, buying: i64, selling: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            owner_id: "owner-1".to_string(),
            code: format!("P-{}", id),
            name: format!("Product {}", id),
            buying_price_cents: buying,
            selling_price_cents: selling,
            stock_quantity: stock,
            supplier: "Toko Sumber".to_string(),
            last_restock_at: None,
            last_sale_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_restock_lines_use_buying_price() {
        let mut draft = PendingTransaction::new(TransactionKind::Restock);
        let product = test_product("1", 1_000_000, 1_500_000, 0);

        draft.add_item(&product, 3).unwrap();

        assert_eq!(draft.total().cents(), 3_000_000);
        assert_eq!(draft.items()[0].unit_cost_cents, 1_000_000);
        assert_eq!(draft.items()[0].supplier_name.as_deref(), Some("Toko Sumber"));
    }

    #[test]
    fn test_out_of_range_price_is_rejected() {
        let mut draft = PendingTransaction::new(TransactionKind::Restock);
        let product = test_product("1", i64::MAX / 2, 0, 0);

        let err = draft.add_item(&product, 3).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert!(draft.is_empty());
        assert!(draft.total().is_zero());
    }

    #[test]
    fn test_full_draft_at_price_cap_totals_exactly() {
        let mut draft = PendingTransaction::new(TransactionKind::Restock);
        for i in 0..MAX_DRAFT_ITEMS {
            let product = test_product(&i.to_string(), MAX_PRICE_CENTS, MAX_PRICE_CENTS, 0);
            draft.add_item(&product, MAX_ITEM_QUANTITY).unwrap();
        }

        let expected = MAX_PRICE_CENTS * MAX_ITEM_QUANTITY * MAX_DRAFT_ITEMS as i64;
        assert_eq!(draft.total().cents(), expected);
    }

    #[test]
    fn test_sale_lines_use_selling_price() {
        let mut draft = PendingTransaction::new(TransactionKind::Sale);
        let product = test_product("1", 1_000_000, 1_500_000, 10);

        draft.add_sale_item(&product, 2).unwrap();

        assert_eq!(draft.total().cents(), 3_000_000);
        assert_eq!(draft.items()[0].unit_cost_cents, 1_000_000);
    }

    #[test]
    fn test_same_product_merges_and_keeps_order() {
        let mut draft = PendingTransaction::new(TransactionKind::Purchase);
        let a = test_product("a", 100, 200, 0);
        let b = test_product("b", 300, 400, 0);

        draft.add_item(&a, 1).unwrap();
        draft.add_item(&b, 1).unwrap();
        draft.add_item(&a, 4).unwrap();

        assert_eq!(draft.len(), 2);
        assert_eq!(draft.items()[0].product_id, "a");
        assert_eq!(draft.items()[0].quantity, 5);
        assert_eq!(draft.total_quantity(), 6);
    }

    #[test]
    fn test_total_is_exact_sum_of_lines() {
        let mut draft = PendingTransaction::new(TransactionKind::Restock);
        draft.add_item(&test_product("a", 333, 0, 0), 3).unwrap();
        draft.add_item(&test_product("b", 1_999, 0, 0), 7).unwrap();

        assert_eq!(draft.total().cents(), 333 * 3 + 1_999 * 7);
    }

    #[test]
    fn test_sale_refuses_more_than_stock() {
        let mut draft = PendingTransaction::new(TransactionKind::Sale);
        let product = test_product("1", 100, 200, 5);

        draft.add_sale_item(&product, 3).unwrap();
        let err = draft.add_sale_item(&product, 3).unwrap_err();

        assert_eq!(
            err,
            CoreError::InsufficientStock {
                product: "Product 1".to_string(),
                available: 5,
                requested: 6,
            }
        );
        assert_eq!(draft.items()[0].quantity, 3);
    }

    #[test]
    fn test_add_sale_item_requires_sale_draft() {
        let mut draft = PendingTransaction::new(TransactionKind::Restock);
        let product = test_product("1", 100, 200, 5);
        assert!(matches!(
            draft.add_sale_item(&product, 1),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut draft = PendingTransaction::new(TransactionKind::Restock);
        let product = test_product("1", 100, 200, 0);

        draft.add_item(&product, 2).unwrap();
        draft.update_quantity("1", 7).unwrap();
        assert_eq!(draft.total_quantity(), 7);

        draft.update_quantity("1", 0).unwrap();
        assert!(draft.is_empty());

        assert_eq!(
            draft.update_quantity("1", 3),
            Err(CoreError::ProductNotFound("1".to_string()))
        );
    }

    #[test]
    fn test_quantity_limits() {
        let mut draft = PendingTransaction::new(TransactionKind::Restock);
        let product = test_product("1", 100, 200, 0);

        assert!(draft.add_item(&product, 0).is_err());
        draft.add_item(&product, MAX_ITEM_QUANTITY).unwrap();
        assert!(matches!(
            draft.add_item(&product, 1),
            Err(CoreError::QuantityTooLarge { .. })
        ));
    }

    #[test]
    fn test_draft_line_limit() {
        let mut draft = PendingTransaction::new(TransactionKind::Purchase);
        for i in 0..MAX_DRAFT_ITEMS {
            draft
                .add_item(&test_product(&i.to_string(), 100, 200, 0), 1)
                .unwrap();
        }
        assert_eq!(
            draft.add_item(&test_product("extra", 100, 200, 0), 1),
            Err(CoreError::DraftTooLarge {
                max: MAX_DRAFT_ITEMS
            })
        );
    }

    #[test]
    fn test_snapshot_restores_same_lines() {
        let mut draft = PendingTransaction::new(TransactionKind::Restock);
        draft.add_item(&test_product("a", 100, 200, 0), 2).unwrap();
        draft.add_item(&test_product("b", 300, 400, 0), 1).unwrap();

        let json = draft.to_json().unwrap();
        let restored = PendingTransaction::from_json(TransactionKind::Restock, &json).unwrap();

        assert_eq!(restored, draft);
    }

    #[test]
    fn test_corrupt_snapshot_is_rejected() {
        let err = PendingTransaction::from_json(TransactionKind::Purchase, "{not json").unwrap_err();
        assert!(matches!(
            err,
            CoreError::CorruptSnapshot { ref key, .. } if key == "purchaseTransactionDraft"
        ));

        let negative = r#"[{"product_id":"a","product_name":"A","quantity":-2,
            "unit_price_cents":100,"unit_cost_cents":100,"supplier_name":null}]"#;
        assert!(PendingTransaction::from_json(TransactionKind::Purchase, negative).is_err());

        let duplicate = r#"[
            {"product_id":"a","product_name":"A","quantity":1,"unit_price_cents":100,"unit_cost_cents":100,"supplier_name":null},
            {"product_id":"a","product_name":"A","quantity":1,"unit_price_cents":100,"unit_cost_cents":100,"supplier_name":null}
        ]"#;
        assert!(PendingTransaction::from_json(TransactionKind::Purchase, duplicate).is_err());
    }

    #[test]
    fn test_snapshot_keys() {
        assert_eq!(
            SnapshotKey::for_draft(TransactionKind::Restock).as_str(),
            "restockTransactionDraft"
        );
        assert_eq!(SnapshotKey::SelectedMarkups.to_string(), "selectedMarkups");
    }

    #[test]
    fn test_draft_totals() {
        let mut draft = PendingTransaction::new(TransactionKind::Restock);
        draft.add_item(&test_product("a", 100, 200, 0), 2).unwrap();

        let totals = DraftTotals::from(&draft);
        assert_eq!(totals.item_count, 1);
        assert_eq!(totals.total_quantity, 2);
        assert_eq!(totals.total.cents(), 200);
    }
}
