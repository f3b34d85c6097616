//! # Reports
//!
//! Pure aggregations over a product snapshot and the sale history.
//!
//! ## Profit Rule
//! ```text
//! item profit = (price charged − product's CURRENT cost price) × quantity
//!
//!   product deleted since the sale  →  cost taken as 0
//! ```
//! Cost is read from today's catalog, not frozen on the sale item, so a
//! re-priced supplier invoice changes historical profit figures.
//!
//! ## Months
//! Sales are grouped by the UTC calendar month of `created_at`, keyed
//! `YYYY-MM` and labelled `October 2026`, newest month first.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::money::Money;
use crate::types::{Product, Sale, SaleItem};

// =============================================================================
// Report Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyReport {
    /// `YYYY-MM`
    pub month_key: String,
    /// `October 2026`
    pub month_label: String,
    pub sale_count: usize,
    pub sales_value: Money,
    pub profit: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductReport {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub units_sold: i64,
    pub stock_value: Money,
}

/// The full reports page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    pub total_stock_value: Money,
    pub total_sales_value: Money,
    pub total_profit: Money,
    pub monthly: Vec<MonthlyReport>,
    pub products: Vec<ProductReport>,
}

/// The landing page summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dashboard {
    pub low_stock_threshold: i64,
    pub low_stock: Vec<Product>,
    pub total_units_in_stock: i64,
    pub recent_sales: Vec<Sale>,
}

// =============================================================================
// Aggregations
// =============================================================================

/// Profit on one sold item against the catalog's current cost price.
pub fn item_profit(item: &SaleItem, catalog: &Catalog) -> Money {
    let cost = catalog
        .get(&item.product_id)
        .map(Product::cost_price)
        .unwrap_or_else(Money::zero);
    (item.price() - cost).multiply_quantity(item.quantity)
}

/// Σ quantity × cost price over the catalog.
pub fn total_stock_value(catalog: &Catalog) -> Money {
    catalog.products().iter().map(Product::stock_value).sum()
}

/// Σ sale totals.
pub fn total_sales_value(sales: &[Sale]) -> Money {
    sales.iter().map(Sale::total).sum()
}

pub fn total_profit(sales: &[Sale], catalog: &Catalog) -> Money {
    sales
        .iter()
        .flat_map(|s| s.items.iter())
        .map(|item| item_profit(item, catalog))
        .sum()
}

/// Sales value and profit per calendar month, newest month first.
pub fn monthly_breakdown(sales: &[Sale], catalog: &Catalog) -> Vec<MonthlyReport> {
    let mut months: BTreeMap<String, MonthlyReport> = BTreeMap::new();

    for sale in sales {
        let key = sale.created_at.format("%Y-%m").to_string();
        let entry = months.entry(key.clone()).or_insert_with(|| MonthlyReport {
            month_key: key,
            month_label: sale.created_at.format("%B %Y").to_string(),
            sale_count: 0,
            sales_value: Money::zero(),
            profit: Money::zero(),
        });

        entry.sale_count += 1;
        for item in &sale.items {
            entry.sales_value += item.line_total();
            entry.profit += item_profit(item, catalog);
        }
    }

    months.into_values().rev().collect()
}

/// Units sold and stock value for every product in the catalog, in catalog
/// order. Sales of deleted products are not listed.
pub fn product_breakdown(sales: &[Sale], catalog: &Catalog) -> Vec<ProductReport> {
    let mut units_sold: HashMap<&str, i64> = HashMap::new();
    for item in sales.iter().flat_map(|s| s.items.iter()) {
        *units_sold.entry(item.product_id.as_str()).or_default() += item.quantity;
    }

    catalog
        .products()
        .iter()
        .map(|p| ProductReport {
            product_id: p.id.clone(),
            name: p.name.clone(),
            category: p.category.clone(),
            quantity: p.quantity,
            units_sold: units_sold.get(p.id.as_str()).copied().unwrap_or(0),
            stock_value: p.stock_value(),
        })
        .collect()
}

pub fn sales_report(sales: &[Sale], catalog: &Catalog) -> SalesReport {
    SalesReport {
        total_stock_value: total_stock_value(catalog),
        total_sales_value: total_sales_value(sales),
        total_profit: total_profit(sales, catalog),
        monthly: monthly_breakdown(sales, catalog),
        products: product_breakdown(sales, catalog),
    }
}

/// Dashboard summary.
///
/// `sales` must already be newest-first (the ledger's list order); the
/// first `recent_limit` are shown.
pub fn dashboard(
    catalog: &Catalog,
    sales: &[Sale],
    low_stock_threshold: i64,
    recent_limit: usize,
) -> Dashboard {
    Dashboard {
        low_stock_threshold,
        low_stock: catalog
            .low_stock(low_stock_threshold)
            .into_iter()
            .cloned()
            .collect(),
        total_units_in_stock: catalog.total_units(),
        recent_sales: sales.iter().take(recent_limit).cloned().collect(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewSale, PriceType};
    use chrono::{TimeZone, Utc};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Product::new("Helmet", "Helmets")
                .with_id("helmet")
                .with_prices(
                    Money::from_cents(9_000),
                    Money::from_cents(15_000),
                    Money::from_cents(12_000),
                )
                .with_quantity(4),
            Product::new("Chain", "Drive")
                .with_id("chain")
                .with_prices(
                    Money::from_cents(1_000),
                    Money::from_cents(2_000),
                    Money::from_cents(1_500),
                )
                .with_quantity(20),
        ])
    }

    fn sale(id: &str, month: u32, items: Vec<(&str, i64, i64)>) -> Sale {
        Sale::from_new(
            id,
            None,
            NewSale {
                customer_name: "N/A".to_string(),
                items: items
                    .into_iter()
                    .map(|(pid, qty, price)| SaleItem {
                        product_id: pid.to_string(),
                        name: pid.to_string(),
                        quantity: qty,
                        price_cents: price,
                        price_type: PriceType::Retail,
                    })
                    .collect(),
                user_id: "u1".to_string(),
                created_at: Utc.with_ymd_and_hms(2026, month, 3, 10, 0, 0).unwrap(),
            },
        )
    }

    #[test]
    fn test_totals() {
        let c = catalog();
        let sales = vec![
            sale("s1", 9, vec![("helmet", 1, 15_000), ("chain", 2, 2_000)]),
            sale("s2", 10, vec![("gone", 1, 5_000)]),
        ];

        assert_eq!(total_stock_value(&c).cents(), 4 * 9_000 + 20 * 1_000);
        assert_eq!(total_sales_value(&sales).cents(), 15_000 + 4_000 + 5_000);
        // helmet 6_000 + chain 2_000 + deleted product at zero cost 5_000
        assert_eq!(total_profit(&sales, &c).cents(), 13_000);
    }

    #[test]
    fn test_selling_below_cost_reduces_profit() {
        let c = catalog();
        let sales = vec![sale("s1", 9, vec![("helmet", 2, 8_000)])];
        assert_eq!(total_profit(&sales, &c).cents(), -2_000);
    }

    #[test]
    fn test_monthly_breakdown_newest_first() {
        let c = catalog();
        let sales = vec![
            sale("s1", 9, vec![("chain", 1, 2_000)]),
            sale("s2", 10, vec![("helmet", 1, 15_000)]),
            sale("s3", 9, vec![("chain", 3, 2_000)]),
        ];

        let months = monthly_breakdown(&sales, &c);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month_key, "2026-10");
        assert_eq!(months[0].month_label, "October 2026");
        assert_eq!(months[1].month_key, "2026-09");
        assert_eq!(months[1].sale_count, 2);
        assert_eq!(months[1].sales_value.cents(), 8_000);
        assert_eq!(months[1].profit.cents(), 4_000);
    }

    #[test]
    fn test_product_breakdown_counts_units() {
        let c = catalog();
        let sales = vec![
            sale("s1", 9, vec![("chain", 1, 2_000), ("helmet", 1, 15_000)]),
            sale("s2", 9, vec![("chain", 4, 1_500)]),
        ];

        let rows = product_breakdown(&sales, &c);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_id, "helmet");
        assert_eq!(rows[0].units_sold, 1);
        assert_eq!(rows[1].units_sold, 5);
        assert_eq!(rows[1].stock_value.cents(), 20_000);
    }

    #[test]
    fn test_dashboard() {
        let c = catalog();
        let sales: Vec<Sale> = (0..7)
            .map(|i| sale(&format!("s{i}"), 10, vec![("chain", 1, 2_000)]))
            .collect();

        let d = dashboard(&c, &sales, 15, 5);
        assert_eq!(d.low_stock.len(), 1);
        assert_eq!(d.low_stock[0].id, "helmet");
        assert_eq!(d.total_units_in_stock, 24);
        assert_eq!(d.recent_sales.len(), 5);
        assert_eq!(d.recent_sales[0].id, "s0");
    }

    #[test]
    fn test_empty_inputs() {
        let report = sales_report(&[], &Catalog::default());
        assert!(report.total_sales_value.is_zero());
        assert!(report.monthly.is_empty());
        assert!(report.products.is_empty());
    }
}
