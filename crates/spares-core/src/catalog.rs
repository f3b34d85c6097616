//! # Catalog
//!
//! An indexed, immutable snapshot of the inventory store's products.
//!
//! The live inventory feed publishes a fresh `Catalog` every time the store
//! changes. The cart never caches stock itself; it asks whatever
//! [`StockLevels`] source it is handed at the moment of each mutation.
//!
//! ```text
//! Inventory Store ──(change)──► Catalog snapshot ──► Cart::add_line / set_line_quantity
//!                                       │
//!                                       └──────────► product grid, search, reports
//! ```

use std::collections::HashMap;

use crate::types::Product;

// =============================================================================
// Stock Levels
// =============================================================================

/// Source of current on-hand quantities, as last observed.
pub trait StockLevels {
    /// Units on hand for a product, or `None` if it is not known.
    fn on_hand(&self, product_id: &str) -> Option<i64>;
}

impl StockLevels for HashMap<String, i64> {
    fn on_hand(&self, product_id: &str) -> Option<i64> {
        self.get(product_id).copied()
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Products in store order (newest first) with an id index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        let index = products
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        Self { products, index }
    }

    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.index.get(product_id).map(|&i| &self.products[i])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Case-insensitive substring match on name or category.
    ///
    /// An empty (or blank) term returns every product.
    ///
    /// ## Example
    /// ```rust
    /// use spares_core::{Catalog, Product};
    ///
    /// let catalog = Catalog::new(vec![
    ///     Product::new("Brake Pads (Front)", "Brakes"),
    ///     Product::new("Full-Face Helmet", "Helmets"),
    /// ]);
    /// assert_eq!(catalog.search("BRAKE").len(), 1);
    /// assert_eq!(catalog.search("helmets").len(), 1);
    /// assert_eq!(catalog.search("").len(), 2);
    /// ```
    pub fn search(&self, term: &str) -> Vec<&Product> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.products.iter().collect();
        }

        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Products with fewer than `threshold` units on hand.
    pub fn low_stock(&self, threshold: i64) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.quantity < threshold)
            .collect()
    }

    /// Total units across every product.
    pub fn total_units(&self) -> i64 {
        self.products.iter().map(|p| p.quantity).sum()
    }
}

impl StockLevels for Catalog {
    fn on_hand(&self, product_id: &str) -> Option<i64> {
        self.get(product_id).map(|p| p.quantity)
    }
}

impl From<Vec<Product>> for Catalog {
    fn from(products: Vec<Product>) -> Self {
        Catalog::new(products)
    }
}
