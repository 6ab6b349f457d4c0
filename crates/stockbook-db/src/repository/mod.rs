//! # Repositories
//!
//! One repository per table family, each bound to a single owner.
//!
//! ```text
//! OwnerStore
//!   ├── ProductRepository      products
//!   ├── SupplierRepository     suppliers
//!   ├── TransactionRepository  transactions + transaction_items (+ products)
//!   ├── TaskRepository         task_categories + tasks
//!   └── SnapshotRepository     local_snapshots
//! ```
//!
//! Rows are read into private `*Row` structs and converted to core types
//! through a validating step, so a row that breaks an invariant surfaces as
//! `DbError::MalformedRecord` instead of leaking into the caller.

pub mod product;
pub mod snapshot;
pub mod supplier;
pub mod task;
pub mod transaction;

use uuid::Uuid;

/// Generates a new record ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use stockbook_core::{OwnerId, ProductInput};

    use crate::pool::{Database, DbConfig, OwnerStore};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn owner(id: &str) -> OwnerId {
        OwnerId::new(id).unwrap()
    }

    pub async fn store(owner_id: &str) -> (Database, OwnerStore) {
        let db = database().await;
        let store = db.scoped(owner(owner_id));
        (db, store)
    }

    pub fn product_input(code: &str, buying: i64, selling: i64, stock: i64) -> ProductInput {
        ProductInput {
            code: code.to_string(),
            name: format!("Product {}", code),
            buying_price_cents: buying,
            selling_price_cents: selling,
            stock_quantity: stock,
            supplier: "Toko Sumber".to_string(),
        }
    }
}
