//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD scoped to one owner
//! - Direct stock edit from the inventory page (`set_stock`)
//!
//! Stock movements caused by purchases, restocks and sales do not go through
//! here; they happen inside `TransactionRepository::commit` so the record and
//! the stock change land together.
//!
//! ## Read Boundary
//! ```text
//! products row ──► ProductRow (sqlx::FromRow)
//!                     │
//!                     ▼
//!                  into_product()
//!                     ├── stock < 0 or price < 0 → MalformedRecord
//!                     └── OK → Product
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use stockbook_core::validation::{validate_non_negative, validate_price, validate_product_input};
use stockbook_core::{OwnerId, Product, ProductInput};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;

pub(crate) const PRODUCT_COLUMNS: &str = "id, owner_id, code, name, buying_price_cents, \
     selling_price_cents, stock_quantity, supplier, last_restock_at, last_sale_at, \
     created_at, updated_at";

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: String,
    owner_id: String,
    code: String,
    name: String,
    buying_price_cents: i64,
    selling_price_cents: i64,
    stock_quantity: i64,
    supplier: String,
    last_restock_at: Option<DateTime<Utc>>,
    last_sale_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    pub(crate) fn into_product(self) -> DbResult<Product> {
        validate_non_negative("stock_quantity", self.stock_quantity)
            .map_err(|e| DbError::malformed("Product", &self.id, e))?;
        for (field, value) in [
            ("buying_price", self.buying_price_cents),
            ("selling_price", self.selling_price_cents),
        ] {
            validate_price(field, value)
                .map_err(|e| DbError::malformed("Product", &self.id, e))?;
        }

        Ok(Product {
            id: self.id,
            owner_id: self.owner_id,
            code: self.code,
            name: self.name,
            buying_price_cents: self.buying_price_cents,
            selling_price_cents: self.selling_price_cents,
            stock_quantity: self.stock_quantity,
            supplier: self.supplier,
            last_restock_at: self.last_restock_at,
            last_sale_at: self.last_sale_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.scoped(owner).products();
///
/// let product = repo.insert(&input).await?;
/// let found = repo.get_by_code("KS-01").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    owner: OwnerId,
}

impl ProductRepository {
    /// Creates a new ProductRepository for one owner.
    pub fn new(pool: SqlitePool, owner: OwnerId) -> Self {
        ProductRepository { pool, owner }
    }

    /// Lists every product of the owner, oldest first.
    ///
    /// Search and sort are applied by `stockbook_core::catalog`.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE owner_id = ?1 ORDER BY created_at, id",
            PRODUCT_COLUMNS
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(self.owner.as_str())
            .fetch_all(&self.pool)
            .await?;

        debug!(owner = %self.owner, count = rows.len(), "Listed products");
        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - No such product for this owner
    pub async fn get(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE id = ?1 AND owner_id = ?2",
            PRODUCT_COLUMNS
        );
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(self.owner.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Gets a product by its business code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE code = ?1 AND owner_id = ?2",
            PRODUCT_COLUMNS
        );
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(code.trim())
            .bind(self.owner.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with generated id and timestamps
    /// * `Err(DbError::UniqueViolation)` - Code already used by this owner
    /// * `Err(DbError::Domain)` - Form validation failed
    pub async fn insert(&self, input: &ProductInput) -> DbResult<Product> {
        validate_product_input(input)?;

        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            owner_id: self.owner.as_str().to_string(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            buying_price_cents: input.buying_price_cents,
            selling_price_cents: input.selling_price_cents,
            stock_quantity: input.stock_quantity,
            supplier: input.supplier.trim().to_string(),
            last_restock_at: None,
            last_sale_at: None,
            created_at: now,
            updated_at: now,
        };

        debug!(owner = %self.owner, code = %product.code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, owner_id, code, name,
                buying_price_cents, selling_price_cents, stock_quantity, supplier,
                last_restock_at, last_sale_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, NULL, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.owner_id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.buying_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.stock_quantity)
        .bind(&product.supplier)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, &product.code))?;

        Ok(product)
    }

    /// Replaces the editable fields of a product.
    ///
    /// Stock is part of the form, as on the product edit page.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The updated product
    /// * `Err(DbError::NotFound)` - Product doesn't exist for this owner
    pub async fn update(&self, id: &str, input: &ProductInput) -> DbResult<Product> {
        validate_product_input(input)?;

        debug!(owner = %self.owner, id = %id, "Updating product");

        let code = input.code.trim();
        let result = sqlx::query(
            r#"
            UPDATE products SET
                code = ?3,
                name = ?4,
                buying_price_cents = ?5,
                selling_price_cents = ?6,
                stock_quantity = ?7,
                supplier = ?8,
                updated_at = ?9
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(id)
        .bind(self.owner.as_str())
        .bind(code)
        .bind(input.name.trim())
        .bind(input.buying_price_cents)
        .bind(input.selling_price_cents)
        .bind(input.stock_quantity)
        .bind(input.supplier.trim())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_code(e, code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Sets stock to an absolute quantity (inventory page edit).
    ///
    /// Negative quantities are refused; stock history is not recorded.
    pub async fn set_stock(&self, id: &str, quantity: i64) -> DbResult<()> {
        validate_non_negative("stock_quantity", quantity)?;

        debug!(owner = %self.owner, id = %id, quantity, "Setting stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_quantity = ?3, updated_at = ?4
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(id)
        .bind(self.owner.as_str())
        .bind(quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product. Past transactions keep their frozen copy.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(owner = %self.owner, id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(self.owner.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts the owner's products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE owner_id = ?1")
            .bind(self.owner.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn duplicate_code(err: sqlx::Error, code: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("code", code),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
