//! # Sale Repository
//!
//! The sale ledger: committed sales and their frozen line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE (one transaction)                                           │
//! │     └── INSERT sales ... receipt_number = next "NNN"                   │
//! │     └── INSERT sale_items (position 0..n)                              │
//! │                                                                         │
//! │  2. READ                                                               │
//! │     └── list() newest first / get_by_id()                              │
//! │                                                                         │
//! │  3. (ADMIN) DELETE                                                     │
//! │     └── delete() → items removed by ON DELETE CASCADE                  │
//! │                                                                         │
//! │  4. (ADMIN) RENUMBER                                                   │
//! │     └── renumber_receipts() → 001.. by creation time                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are never edited after creation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use spares_core::{format_receipt_number, NewSale, PriceType, Sale, SaleItem};

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    receipt_number: Option<String>,
    customer_name: String,
    user_id: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct SaleItemRow {
    sale_id: String,
    product_id: String,
    name: String,
    quantity: i64,
    price_cents: i64,
    price_type: PriceType,
}

impl SaleRow {
    fn into_sale(self, items: Vec<SaleItem>) -> Sale {
        Sale {
            id: self.id,
            receipt_number: self.receipt_number,
            customer_name: self.customer_name,
            items,
            user_id: self.user_id,
            created_at: self.created_at,
        }
    }
}

impl From<SaleItemRow> for SaleItem {
    fn from(row: SaleItemRow) -> Self {
        SaleItem {
            product_id: row.product_id,
            name: row.name,
            quantity: row.quantity,
            price_cents: row.price_cents,
            price_type: row.price_type,
        }
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Writes a sale and all of its items in one transaction.
    ///
    /// The next receipt number is computed inside the INSERT itself, so two
    /// terminals committing at once cannot both read the same maximum.
    pub async fn create(&self, new: &NewSale) -> DbResult<Sale> {
        let id = Uuid::new_v4().to_string();

        debug!(
            sale_id = %id,
            items = new.items.len(),
            total_cents = new.total().cents(),
            "Creating sale"
        );

        let mut tx = self.pool.begin().await?;

        let sequence: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sales (id, receipt_number, customer_name, user_id, created_at)
            VALUES (
                ?1,
                printf('%03d', (
                    SELECT COALESCE(MAX(CAST(receipt_number AS INTEGER)), 0) + 1
                    FROM sales
                )),
                ?2, ?3, ?4
            )
            RETURNING CAST(receipt_number AS INTEGER)
            "#,
        )
        .bind(&id)
        .bind(&new.customer_name)
        .bind(&new.user_id)
        .bind(new.created_at)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in new.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    sale_id, position, product_id, name, quantity, price_cents, price_type
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&id)
            .bind(position as i64)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.price_cents)
            .bind(item.price_type)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let receipt_number = format_receipt_number(sequence);
        info!(sale_id = %id, receipt = %receipt_number, "Sale committed");

        Ok(Sale::from_new(id, Some(receipt_number), new.clone()))
    }

    /// Lists every sale with its items, newest first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, receipt_number, customer_name, user_id, created_at
            FROM sales
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let item_rows = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT sale_id, product_id, name, quantity, price_cents, price_type
            FROM sale_items
            ORDER BY sale_id, position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for row in item_rows {
            items.entry(row.sale_id.clone()).or_default().push(row.into());
        }

        let sales: Vec<Sale> = rows
            .into_iter()
            .map(|row| {
                let sale_items = items.remove(&row.id).unwrap_or_default();
                row.into_sale(sale_items)
            })
            .collect();

        debug!(count = sales.len(), "Listed sales");
        Ok(sales)
    }

    /// Gets a sale with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, receipt_number, customer_name, user_id, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.get_items(id).await?;
        Ok(Some(row.into_sale(items)))
    }

    /// Gets the items of a sale in their original order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let rows = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT sale_id, product_id, name, quantity, price_cents, price_type
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY position
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SaleItem::from).collect())
    }

    /// Deletes a sale; its items go with it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(sale_id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        info!(sale_id = %id, "Sale deleted");
        Ok(())
    }

    /// Reassigns receipt numbers `001…` to every sale, oldest first.
    ///
    /// ## Returns
    /// The number of sales renumbered.
    pub async fn renumber_receipts(&self) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        let ids: Vec<String> =
            sqlx::query_scalar("SELECT id FROM sales ORDER BY created_at ASC, rowid ASC")
                .fetch_all(&mut *tx)
                .await?;

        for (index, id) in ids.iter().enumerate() {
            sqlx::query("UPDATE sales SET receipt_number = ?2 WHERE id = ?1")
                .bind(id)
                .bind(format_receipt_number(index as i64 + 1))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(count = ids.len(), "Receipt numbers reassigned");
        Ok(ids.len() as u64)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Tests
// =============================================================================
