//! # stockbook-db: Store Layer for Stockbook
//!
//! SQLite storage for products, suppliers, the transaction ledger, tasks and
//! local snapshots, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Data Flow                              │
//! │                                                                         │
//! │  Dashboard page (restock, sale, reports)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockbook-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │ OwnerStore         │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │  ProductRepository │  │ (embedded) │  │   │
//! │  │   │               │    │  SupplierRepository│  │            │  │   │
//! │  │   │ SqlitePool    │◄───│  TransactionRepo.. │  │ 0001_...   │  │   │
//! │  │   │ WAL, busy     │    │  TaskRepository    │  │            │  │   │
//! │  │   │ timeout       │    │  SnapshotRepository│  │            │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   $STOCKBOOK_DB_PATH (default ./stockbook.db)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every repository is obtained through [`Database::scoped`] and filters
//! every statement by the owner it was created for.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, configuration, owner scoping
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_core::{OwnerId, PendingTransaction, TransactionKind};
//! use stockbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//! let store = db.scoped(OwnerId::new("uid-123")?);
//!
//! let product = store.products().get_by_code("KS-01").await?.unwrap();
//! let mut draft = PendingTransaction::new(TransactionKind::Restock);
//! draft.add_item(&product, 12)?;
//! store.transactions().commit(draft).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, OwnerStore};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::snapshot::SnapshotRepository;
pub use repository::supplier::SupplierRepository;
pub use repository::task::TaskRepository;
pub use repository::transaction::TransactionRepository;
