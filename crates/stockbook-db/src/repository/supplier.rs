//! # Supplier Repository
//!
//! CRUD for suppliers. Products and transaction lines refer to suppliers by
//! name only, so deleting a supplier never touches them.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use stockbook_core::validation::validate_supplier_input;
use stockbook_core::{OwnerId, Supplier, SupplierInput};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;

#[derive(Debug, sqlx::FromRow)]
struct SupplierRow {
    id: String,
    owner_id: String,
    code: String,
    name: String,
    contact: String,
}

impl SupplierRow {
    fn into_supplier(self) -> DbResult<Supplier> {
        if self.code.trim().is_empty() || self.name.trim().is_empty() {
            return Err(DbError::malformed("Supplier", &self.id, "empty code or name"));
        }

        Ok(Supplier {
            id: self.id,
            owner_id: self.owner_id,
            code: self.code,
            name: self.name,
            contact: self.contact,
        })
    }
}

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
    owner: OwnerId,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool, owner: OwnerId) -> Self {
        SupplierRepository { pool, owner }
    }

    /// Lists the owner's suppliers, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let rows: Vec<SupplierRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, code, name, contact
            FROM suppliers
            WHERE owner_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(self.owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        debug!(owner = %self.owner, count = rows.len(), "Listed suppliers");
        rows.into_iter().map(SupplierRow::into_supplier).collect()
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Supplier>> {
        let row: Option<SupplierRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, code, name, contact
            FROM suppliers
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(id)
        .bind(self.owner.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SupplierRow::into_supplier).transpose()
    }

    /// Inserts a new supplier.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Code already used by this owner
    pub async fn insert(&self, input: &SupplierInput) -> DbResult<Supplier> {
        validate_supplier_input(input)?;

        let supplier = Supplier {
            id: generate_id(),
            owner_id: self.owner.as_str().to_string(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            contact: input.contact.trim().to_string(),
        };

        debug!(owner = %self.owner, code = %supplier.code, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, owner_id, code, name, contact, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.owner_id)
        .bind(&supplier.code)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &supplier.code))?;

        Ok(supplier)
    }

    pub async fn update(&self, id: &str, input: &SupplierInput) -> DbResult<Supplier> {
        validate_supplier_input(input)?;

        debug!(owner = %self.owner, id = %id, "Updating supplier");

        let supplier = Supplier {
            id: id.to_string(),
            owner_id: self.owner.as_str().to_string(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            contact: input.contact.trim().to_string(),
        };

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET code = ?3, name = ?4, contact = ?5
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.owner_id)
        .bind(&supplier.code)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &supplier.code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(supplier)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(owner = %self.owner, id = %id, "Deleting supplier");

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(self.owner.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }
}

fn duplicate_code(err: sqlx::Error, code: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("code", code),
        other => other,
    }
}
