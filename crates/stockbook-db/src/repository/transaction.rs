//! # Transaction Repository
//!
//! The immutable ledger of purchases, restocks and sales, and the only place
//! where a transaction moves stock.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    commit(PendingTransaction)                           │
//! │                                                                         │
//! │  empty? ──► EmptyTransaction                                            │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── sale:     UPDATE products SET stock = stock - q                  │
//! │    │               WHERE id = ? AND owner_id = ? AND stock >= q         │
//! │    │             0 rows ──► NotFound | InsufficientStock  (ROLLBACK)    │
//! │    │                                                                    │
//! │    ├── purchase/restock: UPDATE products SET stock = stock + q          │
//! │    │             0 rows ──► NotFound                      (ROLLBACK)    │
//! │    │                                                                    │
//! │    ├── INSERT transactions + transaction_items (in line order)          │
//! │    ├── DELETE the kind's draft snapshot                                 │
//! │    ▼                                                                    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sale check and the decrement are one statement, and the first
//! statement of the database transaction is a write. Two sales racing for the
//! last units serialize on SQLite's write lock; the loser sees the reduced
//! stock and fails the check.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use stockbook_core::validation::validate_line_item;
use stockbook_core::{
    LineItem, OwnerId, PendingTransaction, SnapshotKey, Transaction, TransactionKind,
};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use crate::repository::snapshot::delete_snapshot;

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    owner_id: String,
    /// Read as text and parsed, so an unknown kind names the row it came from.
    kind: String,
    date: DateTime<Utc>,
    total_cents: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    transaction_id: String,
    product_id: String,
    product_name: String,
    quantity: i64,
    unit_price_cents: i64,
    unit_cost_cents: i64,
    supplier_name: Option<String>,
}

impl From<ItemRow> for LineItem {
    fn from(row: ItemRow) -> Self {
        LineItem {
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
            unit_cost_cents: row.unit_cost_cents,
            supplier_name: row.supplier_name,
        }
    }
}

impl TransactionRow {
    /// Assembles a transaction and checks it still satisfies the ledger rules:
    /// known kind, at least one valid line, total equal to the sum of lines.
    fn into_transaction(self, items: Vec<LineItem>) -> DbResult<Transaction> {
        let kind: TransactionKind = self
            .kind
            .parse()
            .map_err(|e| DbError::malformed("Transaction", &self.id, e))?;

        if items.is_empty() {
            return Err(DbError::malformed("Transaction", &self.id, "no line items"));
        }
        for item in &items {
            validate_line_item(item).map_err(|e| DbError::malformed("Transaction", &self.id, e))?;
        }

        let transaction = Transaction {
            id: self.id,
            owner_id: self.owner_id,
            kind,
            date: self.date,
            items,
            total_cents: self.total_cents,
        };

        let items_total = transaction.items_total();
        if items_total != transaction.total() {
            return Err(DbError::malformed(
                "Transaction",
                &transaction.id,
                format!(
                    "stored total {} does not match line total {}",
                    transaction.total(),
                    items_total
                ),
            ));
        }

        Ok(transaction)
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the transaction ledger.
///
/// ## Usage
/// ```rust,ignore
/// let mut draft = store.snapshots().load_draft(TransactionKind::Sale).await?
///     .unwrap_or_else(|| PendingTransaction::new(TransactionKind::Sale));
/// draft.add_sale_item(&product, 2)?;
///
/// let sale = store.transactions().commit(draft).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
    owner: OwnerId,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool, owner: OwnerId) -> Self {
        TransactionRepository { pool, owner }
    }

    /// Records a draft and applies its stock movement, all or nothing.
    ///
    /// ## Returns
    /// * `Ok(Transaction)` - The stored record, dated now
    /// * `Err(DbError::EmptyTransaction)` - Draft has no lines
    /// * `Err(DbError::InsufficientStock)` - A sale line asks for more than is on hand
    /// * `Err(DbError::NotFound)` - A line names a product this owner doesn't have
    ///
    /// On error nothing is written and the saved draft is kept.
    pub async fn commit(&self, draft: PendingTransaction) -> DbResult<Transaction> {
        let kind = draft.kind();

        if draft.is_empty() {
            warn!(owner = %self.owner, kind = %kind, "Refusing to commit empty transaction");
            return Err(DbError::EmptyTransaction);
        }

        let now = Utc::now();
        let transaction = Transaction {
            id: generate_id(),
            owner_id: self.owner.as_str().to_string(),
            kind,
            date: now,
            total_cents: draft.total().cents(),
            items: draft.into_items(),
        };

        let mut tx = self.pool.begin().await?;

        if let Err(err) = self.apply_stock_movement(&mut *tx, &transaction).await {
            warn!(
                owner = %self.owner,
                kind = %kind,
                error = %err,
                "Transaction rejected, rolling back"
            );
            return Err(err);
        }

        insert_record(&mut *tx, &transaction).await?;
        delete_snapshot(&mut *tx, &self.owner, SnapshotKey::for_draft(kind)).await?;

        tx.commit().await?;

        info!(
            owner = %self.owner,
            id = %transaction.id,
            kind = %kind,
            lines = transaction.items.len(),
            total = %transaction.total(),
            "Transaction committed"
        );

        Ok(transaction)
    }

    async fn apply_stock_movement(
        &self,
        conn: &mut SqliteConnection,
        transaction: &Transaction,
    ) -> DbResult<()> {
        for item in &transaction.items {
            if transaction.kind.increases_stock() {
                add_stock(conn, &self.owner, item, transaction.date).await?;
            } else {
                take_stock(conn, &self.owner, item, transaction.date).await?;
            }
        }
        Ok(())
    }

    /// Gets one transaction with its lines.
    pub async fn get(&self, id: &str) -> DbResult<Option<Transaction>> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, kind, date, total_cents
            FROM transactions
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(id)
        .bind(self.owner.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT transaction_id, product_id, product_name, quantity,
                   unit_price_cents, unit_cost_cents, supplier_name
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let items = items.into_iter().map(LineItem::from).collect();
        row.into_transaction(items).map(Some)
    }

    /// Lists the owner's transactions of one kind, newest first.
    /// Lines keep the order they were added in.
    pub async fn list_by_kind(&self, kind: TransactionKind) -> DbResult<Vec<Transaction>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, kind, date, total_cents
            FROM transactions
            WHERE owner_id = ?1 AND kind = ?2
            ORDER BY date DESC, rowid DESC
            "#,
        )
        .bind(self.owner.as_str())
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        let item_rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT ti.transaction_id, ti.product_id, ti.product_name, ti.quantity,
                   ti.unit_price_cents, ti.unit_cost_cents, ti.supplier_name
            FROM transaction_items ti
            JOIN transactions t ON t.id = ti.transaction_id
            WHERE t.owner_id = ?1 AND t.kind = ?2
            ORDER BY ti.transaction_id, ti.position
            "#,
        )
        .bind(self.owner.as_str())
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_id: HashMap<String, Vec<LineItem>> = HashMap::new();
        for row in item_rows {
            items_by_id
                .entry(row.transaction_id.clone())
                .or_default()
                .push(row.into());
        }

        debug!(owner = %self.owner, kind = %kind, count = rows.len(), "Listed transactions");

        rows.into_iter()
            .map(|row| {
                let items = items_by_id.remove(&row.id).unwrap_or_default();
                row.into_transaction(items)
            })
            .collect()
    }
}

// =============================================================================
// Statements
// =============================================================================

/// Checked decrement for one sale line.
async fn take_stock(
    conn: &mut SqliteConnection,
    owner: &OwnerId,
    item: &LineItem,
    now: DateTime<Utc>,
) -> DbResult<()> {
    debug!(owner = %owner, product = %item.product_id, quantity = item.quantity, "Taking stock");

    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity - ?1, last_sale_at = ?2, updated_at = ?3
        WHERE id = ?4 AND owner_id = ?5 AND stock_quantity >= ?6
        "#,
    )
    .bind(item.quantity)
    .bind(now)
    .bind(now)
    .bind(&item.product_id)
    .bind(owner.as_str())
    .bind(item.quantity)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    let available: Option<i64> = sqlx::query_scalar(
        "SELECT stock_quantity FROM products WHERE id = ?1 AND owner_id = ?2",
    )
    .bind(&item.product_id)
    .bind(owner.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    match available {
        None => Err(DbError::not_found("Product", &item.product_id)),
        Some(available) => Err(DbError::InsufficientStock {
            product: item.product_name.clone(),
            available,
            requested: item.quantity,
        }),
    }
}

/// Increment for one purchase or restock line.
async fn add_stock(
    conn: &mut SqliteConnection,
    owner: &OwnerId,
    item: &LineItem,
    now: DateTime<Utc>,
) -> DbResult<()> {
    debug!(owner = %owner, product = %item.product_id, quantity = item.quantity, "Adding stock");

    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity + ?1, last_restock_at = ?2, updated_at = ?3
        WHERE id = ?4 AND owner_id = ?5
        "#,
    )
    .bind(item.quantity)
    .bind(now)
    .bind(now)
    .bind(&item.product_id)
    .bind(owner.as_str())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", &item.product_id));
    }

    Ok(())
}

async fn insert_record(conn: &mut SqliteConnection, transaction: &Transaction) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO transactions (id, owner_id, kind, date, total_cents)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&transaction.id)
    .bind(&transaction.owner_id)
    .bind(transaction.kind)
    .bind(transaction.date)
    .bind(transaction.total_cents)
    .execute(&mut *conn)
    .await?;

    for (position, item) in transaction.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO transaction_items (
                transaction_id, position, product_id, product_name, quantity,
                unit_price_cents, unit_cost_cents, supplier_name
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&transaction.id)
        .bind(position as i64)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.unit_cost_cents)
        .bind(&item.supplier_name)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
