//! # Snapshot Repository
//!
//! Per-owner key-value store for state that must survive a reload but is not
//! part of the ledger: the three transaction drafts and the markup selection.
//!
//! ```text
//! local_snapshots
//!   (owner, "purchaseTransactionDraft") → [LineItem, ...]
//!   (owner, "restockTransactionDraft")  → [LineItem, ...]
//!   (owner, "saleTransactionDraft")     → [LineItem, ...]
//!   (owner, "selectedMarkups")          → [1000, 2000, ...]   (bps)
//! ```
//!
//! Values are re-validated on load; a snapshot that fails is reported, not
//! silently replaced.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use stockbook_core::pricing::MarkupSelection;
use stockbook_core::{CoreError, OwnerId, PendingTransaction, SnapshotKey, TransactionKind};

use crate::error::{DbError, DbResult};

#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: SqlitePool,
    owner: OwnerId,
}

impl SnapshotRepository {
    pub fn new(pool: SqlitePool, owner: OwnerId) -> Self {
        SnapshotRepository { pool, owner }
    }

    // -------------------------------------------------------------------------
    // Drafts
    // -------------------------------------------------------------------------

    /// Stores the draft under its kind's key. An empty draft clears the key.
    pub async fn save_draft(&self, draft: &PendingTransaction) -> DbResult<()> {
        let key = SnapshotKey::for_draft(draft.kind());
        if draft.is_empty() {
            return self.delete(key).await;
        }

        let value = draft.to_json()?;
        self.put(key, &value).await
    }

    /// Loads the saved draft for `kind`, if any.
    ///
    /// ## Returns
    /// * `Ok(None)` - Nothing saved
    /// * `Err(DbError::Domain(CoreError::CorruptSnapshot))` - Saved value is unusable
    pub async fn load_draft(&self, kind: TransactionKind) -> DbResult<Option<PendingTransaction>> {
        let value = self.get(SnapshotKey::for_draft(kind)).await?;
        value
            .map(|json| PendingTransaction::from_json(kind, &json).map_err(DbError::from))
            .transpose()
    }

    /// Discards the saved draft for `kind`.
    pub async fn clear_draft(&self, kind: TransactionKind) -> DbResult<()> {
        self.delete(SnapshotKey::for_draft(kind)).await
    }

    // -------------------------------------------------------------------------
    // Markup selection
    // -------------------------------------------------------------------------

    pub async fn save_selected_markups(&self, selection: &MarkupSelection) -> DbResult<()> {
        let value = serde_json::to_string(selection)
            .map_err(|e| DbError::Domain(CoreError::Serialization(e.to_string())))?;
        self.put(SnapshotKey::SelectedMarkups, &value).await
    }

    /// Loads the markup selection, falling back to 10%..90% when none is saved.
    pub async fn load_selected_markups(&self) -> DbResult<MarkupSelection> {
        let key = SnapshotKey::SelectedMarkups;
        match self.get(key).await? {
            None => Ok(MarkupSelection::default()),
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                DbError::Domain(CoreError::CorruptSnapshot {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Raw access
    // -------------------------------------------------------------------------

    async fn get(&self, key: SnapshotKey) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT value FROM local_snapshots WHERE owner_id = ?1 AND key = ?2",
        )
        .bind(self.owner.as_str())
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    async fn put(&self, key: SnapshotKey, value: &str) -> DbResult<()> {
        debug!(owner = %self.owner, key = %key, "Saving snapshot");

        sqlx::query(
            r#"
            INSERT INTO local_snapshots (owner_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (owner_id, key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(self.owner.as_str())
        .bind(key.as_str())
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, key: SnapshotKey) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        delete_snapshot(&mut conn, &self.owner, key).await
    }
}

/// Removes a snapshot key on an existing connection, so a commit can clear
/// its draft inside the same database transaction.
pub(crate) async fn delete_snapshot(
    conn: &mut SqliteConnection,
    owner: &OwnerId,
    key: SnapshotKey,
) -> DbResult<()> {
    debug!(owner = %owner, key = %key, "Clearing snapshot");

    sqlx::query("DELETE FROM local_snapshots WHERE owner_id = ?1 AND key = ?2")
        .bind(owner.as_str())
        .bind(key.as_str())
        .execute(conn)
        .await?;

    Ok(())
}
