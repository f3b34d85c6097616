//! SQLite-backed stores over the spares-db repositories.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use spares_core::{NewProduct, NewSale, Product, Sale};
use spares_db::{Database, DbError};

use super::{InventoryStore, SaleLedger, StoreError, StoreResult};
use crate::feed::{CatalogFeed, LiveCatalog};

/// Maps repository failures onto the collaborator taxonomy.
///
/// ```text
/// DbError::NotFound                 → StoreError::NotFound
/// Check/Unique/ForeignKey violation → StoreError::Rejected
/// transient (pool, locked, closed)  → StoreError::Unavailable
/// read-only database file           → StoreError::PermissionDenied
/// anything else                     → StoreError::Backend
/// ```
impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        if err.is_transient() {
            return StoreError::Unavailable(err.to_string());
        }

        match err {
            DbError::NotFound { entity, id } => StoreError::NotFound { entity, id },
            e @ (DbError::CheckViolation(_)
            | DbError::UniqueViolation { .. }
            | DbError::ForeignKeyViolation { .. }) => StoreError::Rejected(e.to_string()),
            DbError::QueryFailed(msg) if msg.contains("readonly") => {
                StoreError::PermissionDenied(msg)
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Inventory store on the `products` table.
///
/// Every successful write republishes the full snapshot on the feed.
#[derive(Debug)]
pub struct SqliteInventory {
    db: Database,
    feed: CatalogFeed,
}

impl SqliteInventory {
    /// Wraps the database and publishes the initial snapshot.
    pub async fn open(db: Database) -> StoreResult<Self> {
        let inventory = SqliteInventory {
            db,
            feed: CatalogFeed::new(),
        };
        inventory.refresh().await?;
        Ok(inventory)
    }

    /// Republishes after a write. The write already succeeded, so a failed
    /// re-read only leaves the previous snapshot in place.
    async fn republish(&self) {
        match self.db.products().list().await {
            Ok(products) => self.feed.publish(products),
            Err(e) => warn!(error = %e, "Could not refresh inventory snapshot after write"),
        }
    }
}

#[async_trait]
impl InventoryStore for SqliteInventory {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.db.products().list().await?)
    }

    async fn get_product(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.db.products().get_by_id(id).await?)
    }

    async fn create_product(&self, new: &NewProduct) -> StoreResult<Product> {
        let product = self.db.products().insert(new).await?;
        info!(id = %product.id, name = %product.name, "Product created");
        self.republish().await;
        Ok(product)
    }

    async fn update_product(&self, product: &Product) -> StoreResult<()> {
        self.db.products().update(product).await?;
        self.republish().await;
        Ok(())
    }

    async fn delete_product(&self, id: &str) -> StoreResult<()> {
        self.db.products().delete(id).await?;
        info!(id = %id, "Product deleted");
        self.republish().await;
        Ok(())
    }

    async fn delete_all_products(&self) -> StoreResult<u64> {
        let removed = self.db.products().delete_all().await?;
        self.republish().await;
        Ok(removed)
    }

    async fn insert_products(&self, batch: &[NewProduct]) -> StoreResult<Vec<Product>> {
        let inserted = self.db.products().insert_many(batch).await?;
        self.republish().await;
        Ok(inserted)
    }

    async fn adjust_product_quantity(&self, id: &str, delta: i64) -> StoreResult<i64> {
        let quantity = self.db.products().adjust_quantity(id, delta).await?;
        debug!(id = %id, delta = %delta, quantity = %quantity, "Stock adjusted");
        self.republish().await;
        Ok(quantity)
    }

    async fn refresh(&self) -> StoreResult<()> {
        let products = self.db.products().list().await?;
        self.feed.publish(products);
        Ok(())
    }

    fn subscribe(&self) -> LiveCatalog {
        self.feed.subscribe()
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// Sale ledger on the `sales` and `sale_items` tables.
#[derive(Debug, Clone)]
pub struct SqliteLedger {
    db: Database,
}

impl SqliteLedger {
    pub fn new(db: Database) -> Self {
        SqliteLedger { db }
    }
}

#[async_trait]
impl SaleLedger for SqliteLedger {
    async fn create_sale(&self, sale: &NewSale) -> StoreResult<Sale> {
        Ok(self.db.sales().create(sale).await?)
    }

    async fn list_sales(&self) -> StoreResult<Vec<Sale>> {
        Ok(self.db.sales().list().await?)
    }

    async fn get_sale(&self, id: &str) -> StoreResult<Option<Sale>> {
        Ok(self.db.sales().get_by_id(id).await?)
    }

    async fn delete_sale(&self, id: &str) -> StoreResult<()> {
        Ok(self.db.sales().delete(id).await?)
    }

    async fn renumber_receipts(&self) -> StoreResult<u64> {
        Ok(self.db.sales().renumber_receipts().await?)
    }
}
