//! # Product Commands
//!
//! Inventory management. Reads come from the live catalog; writes go to
//! the inventory store, which republishes the catalog afterwards.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use spares_core::validation::{validate_new_product, validate_search_query, validate_stock_delta};
use spares_core::{NewProduct, Operator, Product, ValidationError};

use super::{require_admin, require_operator};
use crate::error::ApiError;
use crate::feed::LiveCatalog;
use crate::store::InventoryStore;

/// Result of a bulk upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub inserted: usize,
    pub products: Vec<Product>,
}

/// Every product, newest first.
pub fn list_products(catalog: &LiveCatalog) -> Vec<Product> {
    debug!("list_products command");
    catalog.with(|c| c.products().to_vec())
}

/// Case-insensitive match on name or category. Empty query lists all.
///
/// ## Example
/// ```rust,ignore
/// search_products(&catalog, "brake")?; // "Brake Pads (Front)", "Brake Cable", ...
/// ```
pub fn search_products(catalog: &LiveCatalog, query: &str) -> Result<Vec<Product>, ApiError> {
    let query = validate_search_query(query)?;
    debug!(query = %query, "search_products command");

    Ok(catalog.with(|c| c.search(&query).into_iter().cloned().collect()))
}

pub async fn get_product(inventory: &dyn InventoryStore, id: &str) -> Result<Product, ApiError> {
    debug!(id = %id, "get_product command");

    inventory
        .get_product(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))
}

pub async fn create_product(
    inventory: &dyn InventoryStore,
    operator: Option<&Operator>,
    new: NewProduct,
) -> Result<Product, ApiError> {
    require_operator(operator)?;
    debug!(name = %new.name, "create_product command");

    validate_new_product(&new)?;
    Ok(inventory.create_product(&new).await?)
}

/// Saves edits to an existing product. Its creation time never changes.
pub async fn update_product(
    inventory: &dyn InventoryStore,
    operator: Option<&Operator>,
    product: Product,
) -> Result<(), ApiError> {
    require_operator(operator)?;
    debug!(id = %product.id, "update_product command");

    validate_new_product(&NewProduct::from(&product))?;
    Ok(inventory.update_product(&product).await?)
}

/// Deletes a product. Past sales keep their item snapshots.
pub async fn delete_product(
    inventory: &dyn InventoryStore,
    operator: Option<&Operator>,
    id: &str,
) -> Result<(), ApiError> {
    require_operator(operator)?;
    debug!(id = %id, "delete_product command");

    Ok(inventory.delete_product(id).await?)
}

/// Corrects stock by `delta` (e.g. after a recount or a failed checkout
/// decrement). Returns the new quantity.
///
/// `delta` is limited to `MAX_STOCK_QUANTITY` units either way.
pub async fn adjust_stock(
    inventory: &dyn InventoryStore,
    operator: Option<&Operator>,
    id: &str,
    delta: i64,
) -> Result<i64, ApiError> {
    let operator = require_operator(operator)?;
    validate_stock_delta(delta)?;

    let quantity = inventory.adjust_product_quantity(id, delta).await?;
    info!(id = %id, delta = %delta, quantity = %quantity, by = %operator.id, "Stock corrected");
    Ok(quantity)
}

/// Admin only. Removes the whole catalog.
pub async fn delete_all_products(
    inventory: &dyn InventoryStore,
    operator: Option<&Operator>,
) -> Result<u64, ApiError> {
    let operator = require_admin(operator)?;

    let removed = inventory.delete_all_products().await?;
    info!(removed = %removed, by = %operator.id, "All products deleted");
    Ok(removed)
}

/// Admin only. Stores already-parsed upload rows in one step.
///
/// Every row is validated first; one bad row rejects the whole upload.
pub async fn upload_products(
    inventory: &dyn InventoryStore,
    operator: Option<&Operator>,
    batch: Vec<NewProduct>,
) -> Result<UploadResponse, ApiError> {
    let operator = require_admin(operator)?;
    debug!(count = batch.len(), "upload_products command");

    if batch.is_empty() {
        return Err(ValidationError::Required {
            field: "products".to_string(),
        }
        .into());
    }

    for (row, product) in batch.iter().enumerate() {
        validate_new_product(product)
            .map_err(|e| ApiError::validation(format!("Row {}: {}", row + 1, e)))?;
    }

    let products = inventory.insert_products(&batch).await?;
    info!(count = products.len(), by = %operator.id, "Products uploaded");

    Ok(UploadResponse {
        inserted: products.len(),
        products,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::store::MemoryInventory;

    fn draft(name: &str, category: &str, qty: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            category: category.to_string(),
            cost_price_cents: 18_000,
            retail_price_cents: 35_000,
            wholesale_price_cents: 28_000,
            quantity: qty,
        }
    }

    fn staff() -> Operator {
        Operator::fallback("s1", "staff@shop.test")
    }

    fn admin() -> Operator {
        Operator::fallback("a1", "admin@shop.test")
    }

    #[tokio::test]
    async fn test_create_then_search() {
        let inventory = MemoryInventory::new();
        let live = inventory.subscribe();

        create_product(&inventory, Some(&staff()), draft("Brake Pads", "Brakes", 40))
            .await
            .unwrap();
        create_product(&inventory, Some(&staff()), draft("Spark Plug", "Engine", 80))
            .await
            .unwrap();

        assert_eq!(list_products(&live).len(), 2);
        let hits = search_products(&live, "  BRAKES ").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Brake Pads");
    }

    #[tokio::test]
    async fn test_create_requires_operator_and_valid_input() {
        let inventory = MemoryInventory::new();

        let err = create_product(&inventory, None, draft("Chain", "Drive", 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);

        let err = create_product(&inventory, Some(&staff()), draft("", "Drive", 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = create_product(&inventory, Some(&staff()), draft("Chain", "Drive", -1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let inventory = MemoryInventory::new();
        let err = get_product(&inventory, "nope").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_update_and_adjust() {
        let inventory = MemoryInventory::new();
        let product = create_product(&inventory, Some(&staff()), draft("Mirror", "Accessories", 2))
            .await
            .unwrap();

        let mut edited = product.clone();
        edited.retail_price_cents = 60_000;
        update_product(&inventory, Some(&staff()), edited).await.unwrap();
        assert_eq!(
            get_product(&inventory, &product.id).await.unwrap().retail_price_cents,
            60_000
        );

        assert_eq!(
            adjust_stock(&inventory, Some(&staff()), &product.id, 5).await.unwrap(),
            7
        );
        assert_eq!(
            adjust_stock(&inventory, Some(&staff()), &product.id, -10).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_out_of_range_values_are_rejected() {
        let inventory = MemoryInventory::new();

        let mut pricey = draft("Engine Kit", "Engine", 5);
        pricey.retail_price_cents = i64::MAX / 2 + 1;
        let err = create_product(&inventory, Some(&staff()), pricey).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let product = create_product(&inventory, Some(&staff()), draft("Chain", "Drive", 5))
            .await
            .unwrap();
        let err = adjust_stock(&inventory, Some(&staff()), &product.id, i64::MAX)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(inventory.quantity_of(&product.id), Some(5));
        assert_eq!(list_products(&inventory.subscribe())[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_upload_is_admin_only_and_validated() {
        let inventory = MemoryInventory::new();
        let batch = vec![draft("Chain", "Drive", 12), draft("Sprocket", "Drive", 8)];

        let err = upload_products(&inventory, Some(&staff()), batch.clone())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        let mut bad = batch.clone();
        bad[1].name = String::new();
        let err = upload_products(&inventory, Some(&admin()), bad).await.unwrap_err();
        assert!(err.message.starts_with("Row 2:"));
        assert!(inventory.list_products().await.unwrap().is_empty());

        let response = upload_products(&inventory, Some(&admin()), batch).await.unwrap();
        assert_eq!(response.inserted, 2);
    }

    #[tokio::test]
    async fn test_delete_all_is_admin_only() {
        let inventory = MemoryInventory::new();
        create_product(&inventory, Some(&staff()), draft("Chain", "Drive", 1))
            .await
            .unwrap();

        assert_eq!(
            delete_all_products(&inventory, Some(&staff())).await.unwrap_err().code,
            ErrorCode::PermissionDenied
        );
        assert_eq!(delete_all_products(&inventory, Some(&admin())).await.unwrap(), 1);
    }
}
