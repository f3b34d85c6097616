//! # In-Memory Stores
//!
//! Process-local inventory and ledger. Used by tests and demos, with call
//! counters and failure injection so the checkout's failure paths can be
//! driven deterministically.
//!
//! ## Failure Injection
//! ```rust,ignore
//! let ledger = MemoryLedger::new();
//! ledger.fail_creates(StoreError::Unavailable("offline".into()));
//!
//! let inventory = MemoryInventory::with_products(vec![pads]);
//! inventory.fail_adjustments_for("pads-id", StoreError::PermissionDenied("rules".into()));
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use spares_core::{format_receipt_number, NewProduct, NewSale, Product, Sale};

use super::{InventoryStore, SaleLedger, StoreError, StoreResult};
use crate::feed::{CatalogFeed, LiveCatalog};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Inventory
// =============================================================================

/// Inventory kept in a vector, newest first.
#[derive(Debug, Default)]
pub struct MemoryInventory {
    products: Mutex<Vec<Product>>,
    adjust_failures: Mutex<HashMap<String, StoreError>>,
    adjust_calls: AtomicUsize,
    feed: CatalogFeed,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `products` (given newest first) already published.
    pub fn with_products(products: Vec<Product>) -> Self {
        let inventory = Self::new();
        *lock(&inventory.products) = products;
        inventory.publish();
        inventory
    }

    /// Makes every adjustment of `product_id` fail with `error`.
    pub fn fail_adjustments_for(&self, product_id: impl Into<String>, error: StoreError) {
        lock(&self.adjust_failures).insert(product_id.into(), error);
    }

    /// Number of `adjust_product_quantity` calls received, failed ones included.
    pub fn adjust_calls(&self) -> usize {
        self.adjust_calls.load(Ordering::SeqCst)
    }

    /// Current quantity, bypassing the feed.
    pub fn quantity_of(&self, product_id: &str) -> Option<i64> {
        lock(&self.products)
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.quantity)
    }

    fn publish(&self) {
        let snapshot = lock(&self.products).clone();
        self.feed.publish(snapshot);
    }
}

#[async_trait]
impl InventoryStore for MemoryInventory {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(lock(&self.products).clone())
    }

    async fn get_product(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(lock(&self.products).iter().find(|p| p.id == id).cloned())
    }

    async fn create_product(&self, new: &NewProduct) -> StoreResult<Product> {
        let product = Product::from_new(Uuid::new_v4().to_string(), new.clone(), Utc::now());
        lock(&self.products).insert(0, product.clone());
        self.publish();
        Ok(product)
    }

    async fn update_product(&self, product: &Product) -> StoreResult<()> {
        {
            let mut products = lock(&self.products);
            let existing = products
                .iter_mut()
                .find(|p| p.id == product.id)
                .ok_or_else(|| StoreError::not_found("Product", &product.id))?;

            let created_at = existing.created_at;
            *existing = product.clone();
            existing.created_at = created_at;
        }
        self.publish();
        Ok(())
    }

    async fn delete_product(&self, id: &str) -> StoreResult<()> {
        {
            let mut products = lock(&self.products);
            let before = products.len();
            products.retain(|p| p.id != id);
            if products.len() == before {
                return Err(StoreError::not_found("Product", id));
            }
        }
        self.publish();
        Ok(())
    }

    async fn delete_all_products(&self) -> StoreResult<u64> {
        let removed = {
            let mut products = lock(&self.products);
            let removed = products.len() as u64;
            products.clear();
            removed
        };
        self.publish();
        Ok(removed)
    }

    async fn insert_products(&self, batch: &[NewProduct]) -> StoreResult<Vec<Product>> {
        if let Some(bad) = batch.iter().find(|p| p.quantity < 0) {
            return Err(StoreError::Rejected(format!(
                "negative quantity for {}",
                bad.name
            )));
        }

        let now = Utc::now();
        let inserted: Vec<Product> = batch
            .iter()
            .map(|new| Product::from_new(Uuid::new_v4().to_string(), new.clone(), now))
            .collect();

        {
            let mut products = lock(&self.products);
            for product in &inserted {
                products.insert(0, product.clone());
            }
        }
        self.publish();
        Ok(inserted)
    }

    async fn adjust_product_quantity(&self, id: &str, delta: i64) -> StoreResult<i64> {
        self.adjust_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = lock(&self.adjust_failures).get(id) {
            return Err(error.clone());
        }

        let quantity = {
            let mut products = lock(&self.products);
            let product = products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| StoreError::not_found("Product", id))?;
            let adjusted = product.quantity.checked_add(delta).ok_or_else(|| {
                StoreError::Rejected(format!("Stock adjustment of {delta} is out of range"))
            })?;
            product.quantity = adjusted.max(0);
            product.quantity
        };

        debug!(id = %id, delta = %delta, quantity = %quantity, "Stock adjusted");
        self.publish();
        Ok(quantity)
    }

    async fn refresh(&self) -> StoreResult<()> {
        self.publish();
        Ok(())
    }

    fn subscribe(&self) -> LiveCatalog {
        self.feed.subscribe()
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// Ledger kept in a vector, newest first.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    sales: Mutex<Vec<Sale>>,
    create_failure: Mutex<Option<StoreError>>,
    create_calls: AtomicUsize,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `create_sale` fail with `error` until [`accept_creates`](Self::accept_creates).
    pub fn fail_creates(&self, error: StoreError) {
        *lock(&self.create_failure) = Some(error);
    }

    pub fn accept_creates(&self) {
        *lock(&self.create_failure) = None;
    }

    /// Number of `create_sale` calls received, failed ones included.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

fn receipt_sequence(sale: &Sale) -> i64 {
    sale.receipt_number
        .as_deref()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

#[async_trait]
impl SaleLedger for MemoryLedger {
    async fn create_sale(&self, sale: &NewSale) -> StoreResult<Sale> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = lock(&self.create_failure).clone() {
            return Err(error);
        }

        let mut sales = lock(&self.sales);
        let next = sales.iter().map(receipt_sequence).max().unwrap_or(0) + 1;
        let created = Sale::from_new(
            Uuid::new_v4().to_string(),
            Some(format_receipt_number(next)),
            sale.clone(),
        );
        sales.insert(0, created.clone());
        Ok(created)
    }

    async fn list_sales(&self) -> StoreResult<Vec<Sale>> {
        Ok(lock(&self.sales).clone())
    }

    async fn get_sale(&self, id: &str) -> StoreResult<Option<Sale>> {
        Ok(lock(&self.sales).iter().find(|s| s.id == id).cloned())
    }

    async fn delete_sale(&self, id: &str) -> StoreResult<()> {
        let mut sales = lock(&self.sales);
        let before = sales.len();
        sales.retain(|s| s.id != id);
        if sales.len() == before {
            return Err(StoreError::not_found("Sale", id));
        }
        Ok(())
    }

    async fn renumber_receipts(&self) -> StoreResult<u64> {
        let mut sales = lock(&self.sales);

        let mut by_age: Vec<usize> = (0..sales.len()).collect();
        by_age.sort_by_key(|&i| sales[i].created_at);

        for (sequence, index) in by_age.into_iter().enumerate() {
            sales[index].receipt_number = Some(format_receipt_number(sequence as i64 + 1));
        }

        Ok(sales.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use spares_core::{PriceType, SaleItem};

    fn new_sale(offset_minutes: i64) -> NewSale {
        NewSale {
            customer_name: "N/A".to_string(),
            items: vec![SaleItem {
                product_id: "p1".to_string(),
                name: "Spark Plug".to_string(),
                quantity: 1,
                price_cents: 25_000,
                price_type: PriceType::Retail,
            }],
            user_id: "u1".to_string(),
            created_at: Utc::now() + Duration::minutes(offset_minutes),
        }
    }

    #[tokio::test]
    async fn test_adjust_floors_at_zero_and_publishes() {
        let inventory = MemoryInventory::with_products(vec![
            Product::new("Mirror", "Accessories").with_id("m").with_quantity(2),
        ]);
        let live = inventory.subscribe();

        assert_eq!(inventory.adjust_product_quantity("m", -5).await.unwrap(), 0);
        assert_eq!(live.product("m").unwrap().quantity, 0);
        assert_eq!(inventory.adjust_calls(), 1);
    }

    #[tokio::test]
    async fn test_adjust_out_of_range_is_rejected() {
        let inventory = MemoryInventory::with_products(vec![
            Product::new("Mirror", "Accessories").with_id("m").with_quantity(5),
        ]);

        let err = inventory.adjust_product_quantity("m", i64::MAX).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
        assert_eq!(inventory.quantity_of("m"), Some(5));
    }

    #[tokio::test]
    async fn test_injected_adjust_failure() {
        let inventory = MemoryInventory::with_products(vec![
            Product::new("Mirror", "Accessories").with_id("m").with_quantity(2),
        ]);
        inventory.fail_adjustments_for("m", StoreError::PermissionDenied("rules".into()));

        let err = inventory.adjust_product_quantity("m", -1).await.unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied(_)));
        assert_eq!(inventory.quantity_of("m"), Some(2));
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let inventory = MemoryInventory::new();
        let created = inventory
            .create_product(&NewProduct {
                name: "Grip".to_string(),
                category: "Accessories".to_string(),
                cost_price_cents: 9_000,
                retail_price_cents: 20_000,
                wholesale_price_cents: 15_000,
                quantity: 3,
            })
            .await
            .unwrap();

        let edited = created
            .clone()
            .with_quantity(9)
            .with_created_at(created.created_at + Duration::days(3));
        inventory.update_product(&edited).await.unwrap();

        let loaded = inventory.get_product(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.quantity, 9);
        assert_eq!(loaded.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_ledger_numbers_and_renumbers() {
        let ledger = MemoryLedger::new();
        let late = ledger.create_sale(&new_sale(10)).await.unwrap();
        let early = ledger.create_sale(&new_sale(-10)).await.unwrap();
        assert_eq!(late.receipt_number.as_deref(), Some("001"));
        assert_eq!(early.receipt_number.as_deref(), Some("002"));

        assert_eq!(ledger.renumber_receipts().await.unwrap(), 2);
        let early = ledger.get_sale(&early.id).await.unwrap().unwrap();
        let late = ledger.get_sale(&late.id).await.unwrap().unwrap();
        assert_eq!(early.receipt_number.as_deref(), Some("001"));
        assert_eq!(late.receipt_number.as_deref(), Some("002"));
    }

    #[tokio::test]
    async fn test_ledger_failure_injection() {
        let ledger = MemoryLedger::new();
        ledger.fail_creates(StoreError::Unavailable("offline".into()));

        assert!(ledger.create_sale(&new_sale(0)).await.is_err());
        assert!(ledger.list_sales().await.unwrap().is_empty());

        ledger.accept_creates();
        assert!(ledger.create_sale(&new_sale(0)).await.is_ok());
        assert_eq!(ledger.create_calls(), 2);
    }
}
