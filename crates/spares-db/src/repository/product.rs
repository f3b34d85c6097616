//! # Product Repository
//!
//! The inventory store: product CRUD plus the atomic stock adjustment the
//! checkout relies on.
//!
//! ## Clamped Delta Adjustment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: read in Rust, subtract, write back                       │
//! │     let q = SELECT quantity ...; UPDATE ... SET quantity = q - 3    │
//! │     (two terminals selling at once lose one of the updates)        │
//! │                                                                     │
//! │  ✅ CORRECT: one statement, clamped in SQL                          │
//! │     UPDATE products SET quantity = MAX(quantity + ?delta, 0)        │
//! │                                                                     │
//! │  Terminal A: sells 3 → -3                                          │
//! │  Terminal B: sells 2 → -2                                          │
//! │  Both apply; stock floors at zero instead of going negative        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use spares_core::validation::validate_stock_delta;
use spares_core::{NewProduct, Product};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product, newest first.
    ///
    /// This is the snapshot order the live feed publishes.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id,
                name,
                category,
                cost_price_cents,
                retail_price_cents,
                wholesale_price_cents,
                quantity,
                created_at
            FROM products
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id,
                name,
                category,
                cost_price_cents,
                retail_price_cents,
                wholesale_price_cents,
                quantity,
                created_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product with a generated id and creation time.
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        let product = Product::from_new(generate_product_id(), new.clone(), Utc::now());

        debug!(id = %product.id, name = %product.name, "Inserting product");

        insert_product(&self.pool, &product).await?;
        Ok(product)
    }

    /// Inserts a batch of products in one transaction (all or nothing).
    ///
    /// Used for already-parsed bulk uploads.
    pub async fn insert_many(&self, batch: &[NewProduct]) -> DbResult<Vec<Product>> {
        debug!(count = batch.len(), "Inserting product batch");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(batch.len());

        for new in batch {
            let product = Product::from_new(generate_product_id(), new.clone(), now);
            insert_product(&mut *tx, &product).await?;
            inserted.push(product);
        }

        tx.commit().await?;

        info!(count = inserted.len(), "Product batch committed");
        Ok(inserted)
    }

    /// Updates an existing product's editable fields.
    ///
    /// `created_at` is never touched.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                cost_price_cents = ?4,
                retail_price_cents = ?5,
                wholesale_price_cents = ?6,
                quantity = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.cost_price_cents)
        .bind(product.retail_price_cents)
        .bind(product.wholesale_price_cents)
        .bind(product.quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Atomically adds `delta` to the stock level, flooring at zero.
    ///
    /// ## Arguments
    /// * `delta` - Change in stock (negative for sales, positive for restocking)
    ///
    /// ## Returns
    /// The new quantity, `DbError::NotFound` if no row matched, or
    /// `DbError::CheckViolation` if `delta` exceeds `MAX_STOCK_QUANTITY`.
    pub async fn adjust_quantity(&self, id: &str, delta: i64) -> DbResult<i64> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        // SQLite turns an overflowing integer sum into REAL
        validate_stock_delta(delta).map_err(|e| DbError::CheckViolation(e.to_string()))?;

        let quantity: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET
                quantity = MAX(quantity + ?2, 0),
                updated_at = ?3
            WHERE id = ?1
            RETURNING quantity
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        quantity.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product. Historical sales keep their snapshots.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes every product. Returns how many rows were removed.
    pub async fn delete_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM products")
            .execute(&self.pool)
            .await?;

        info!(count = result.rows_affected(), "Deleted all products");
        Ok(result.rows_affected())
    }

    /// Counts total products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn insert_product<'e, E>(executor: E, product: &Product) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO products (
            id, name, category,
            cost_price_cents, retail_price_cents, wholesale_price_cents,
            quantity, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
        "#,
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(&product.category)
    .bind(product.cost_price_cents)
    .bind(product.retail_price_cents)
    .bind(product.wholesale_price_cents)
    .bind(product.quantity)
    .bind(product.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Generates a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::DbError;
    use spares_core::NewProduct;

    fn draft(name: &str, qty: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            category: "Spares".to_string(),
            cost_price_cents: 1_000,
            retail_price_cents: 2_000,
            wholesale_price_cents: 1_500,
            quantity: qty,
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = db().await;
        let repo = db.products();

        let product = repo.insert(&draft("Clutch Cable", 8)).await.unwrap();
        let loaded = repo.get_by_id(&product.id).await.unwrap().unwrap();

        assert_eq!(loaded.name, "Clutch Cable");
        assert_eq!(loaded.quantity, 8);
        assert_eq!(loaded.created_at, product.created_at);
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = db().await;
        let repo = db.products();

        let first = repo.insert(&draft("First", 1)).await.unwrap();
        let second = repo.insert(&draft("Second", 1)).await.unwrap();

        let ids: Vec<_> = repo.list().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_adjust_quantity_clamps_at_zero() {
        let db = db().await;
        let repo = db.products();
        let product = repo.insert(&draft("Mirror", 3)).await.unwrap();

        assert_eq!(repo.adjust_quantity(&product.id, -2).await.unwrap(), 1);
        assert_eq!(repo.adjust_quantity(&product.id, -5).await.unwrap(), 0);
        assert_eq!(repo.adjust_quantity(&product.id, 4).await.unwrap(), 4);

        let err = repo.adjust_quantity("missing", -1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_adjust_quantity_rejects_out_of_range_delta() {
        let db = db().await;
        let repo = db.products();
        let product = repo.insert(&draft("Mirror", 5)).await.unwrap();

        let err = repo.adjust_quantity(&product.id, i64::MAX).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation(_)));

        // The row is untouched and still decodes
        let products = repo.list().await.unwrap();
        assert_eq!(products[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let db = db().await;
        let repo = db.products();
        let mut product = repo.insert(&draft("Grip", 2)).await.unwrap();
        let created = product.created_at;

        product.name = "Grip (Pair)".to_string();
        product.retail_price_cents = 2_500;
        product.created_at = chrono::Utc::now() + chrono::Duration::days(30);
        repo.update(&product).await.unwrap();

        let loaded = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Grip (Pair)");
        assert_eq!(loaded.retail_price_cents, 2_500);
        assert_eq!(loaded.created_at, created);

        product.id = "missing".to_string();
        assert!(matches!(
            repo.update(&product).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_insert_many_is_all_or_nothing() {
        let db = db().await;
        let repo = db.products();

        let ok = repo
            .insert_many(&[draft("A", 1), draft("B", 2)])
            .await
            .unwrap();
        assert_eq!(ok.len(), 2);

        // Negative stock trips the CHECK constraint and rolls back the batch
        let err = repo
            .insert_many(&[draft("C", 1), draft("D", -1)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::CheckViolation(_)));
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_and_delete_all() {
        let db = db().await;
        let repo = db.products();
        let a = repo.insert(&draft("A", 1)).await.unwrap();
        repo.insert(&draft("B", 1)).await.unwrap();
        repo.insert(&draft("C", 1)).await.unwrap();

        repo.delete(&a.id).await.unwrap();
        assert!(matches!(
            repo.delete(&a.id).await,
            Err(DbError::NotFound { .. })
        ));

        assert_eq!(repo.delete_all().await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
