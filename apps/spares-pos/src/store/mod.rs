//! # Collaborator Stores
//!
//! The inventory store and the sale ledger, seen from the application
//! layer as traits so the checkout can run against SQLite in production
//! and against in-memory doubles in tests.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Store Abstraction                                    │
//! │                                                                         │
//! │   CheckoutCoordinator / commands                                       │
//! │        │                         │                                      │
//! │        ▼                         ▼                                      │
//! │   dyn InventoryStore        dyn SaleLedger                             │
//! │        │                         │                                      │
//! │   ┌────┴──────────┐        ┌─────┴────────┐                            │
//! │   ▼               ▼        ▼              ▼                            │
//! │ SqliteInventory  Memory  SqliteLedger   Memory                         │
//! │ (spares-db)      Inventory (spares-db)  Ledger                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use spares_core::{NewProduct, NewSale, Product, Sale};

use crate::feed::LiveCatalog;

pub use memory::{MemoryInventory, MemoryLedger};
pub use sqlite::{SqliteInventory, SqliteLedger};

/// Failures reported by a store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The backend refused the write for this identity or file.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Connectivity or contention; retrying later may succeed.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected the data (constraint violation).
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Product records with live updates.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Every product, newest first.
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    async fn get_product(&self, id: &str) -> StoreResult<Option<Product>>;

    /// Stores a new product; the store assigns the id and creation time.
    async fn create_product(&self, new: &NewProduct) -> StoreResult<Product>;

    /// Replaces the editable fields. `created_at` is kept.
    async fn update_product(&self, product: &Product) -> StoreResult<()>;

    async fn delete_product(&self, id: &str) -> StoreResult<()>;

    async fn delete_all_products(&self) -> StoreResult<u64>;

    /// Stores a batch in one step: either every product lands or none do.
    async fn insert_products(&self, batch: &[NewProduct]) -> StoreResult<Vec<Product>>;

    /// Atomically adds `delta` to the on-hand quantity, flooring at zero,
    /// and returns the new quantity.
    async fn adjust_product_quantity(&self, id: &str, delta: i64) -> StoreResult<i64>;

    /// Re-reads the inventory and republishes the snapshot.
    async fn refresh(&self) -> StoreResult<()>;

    /// Observer for the live product snapshot.
    fn subscribe(&self) -> LiveCatalog;
}

/// Committed sales. Records are immutable once created.
#[async_trait]
pub trait SaleLedger: Send + Sync {
    /// Records the sale and returns it with its ledger id and receipt number.
    async fn create_sale(&self, sale: &NewSale) -> StoreResult<Sale>;

    /// Every sale, newest first.
    async fn list_sales(&self) -> StoreResult<Vec<Sale>>;

    async fn get_sale(&self, id: &str) -> StoreResult<Option<Sale>>;

    async fn delete_sale(&self, id: &str) -> StoreResult<()>;

    /// Reassigns receipt numbers `001…` in ascending creation order.
    async fn renumber_receipts(&self) -> StoreResult<u64>;
}
