//! # Validation Module
//!
//! Input validation for products and sales before they reach a store.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web front end (form checks, immediate feedback)              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: spares-pos commands                                          │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite (NOT NULL, CHECK (quantity >= 0), FKs)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use spares_core::validation::{validate_product_name, validate_quantity};
//!
//! assert!(validate_product_name("Brake Pads (Front)").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{NewProduct, NewSale};
use crate::{MAX_PRICE_CENTS, MAX_STOCK_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 100;
const MAX_QUERY_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a category label. May be empty (uncategorised).
pub fn validate_category(category: &str) -> ValidationResult<()> {
    if category.trim().chars().count() > MAX_CATEGORY_LEN {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: MAX_CATEGORY_LEN,
        });
    }
    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string. Empty means "everything".
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity sold or requested (must be at least 1).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a stock level or price (zero allowed, negative not).
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a value against an inclusive upper bound.
pub fn validate_at_most(field: &str, value: i64, max: i64) -> ValidationResult<()> {
    if value > max {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a price in cents: `0..=MAX_PRICE_CENTS`.
pub fn validate_price(field: &str, cents: i64) -> ValidationResult<()> {
    validate_non_negative(field, cents)?;
    validate_at_most(field, cents, MAX_PRICE_CENTS)
}

/// Validates a stock correction: at most `MAX_STOCK_QUANTITY` units either way.
pub fn validate_stock_delta(delta: i64) -> ValidationResult<()> {
    if delta.unsigned_abs() > MAX_STOCK_QUANTITY.unsigned_abs() {
        return Err(ValidationError::TooLarge {
            field: "delta".to_string(),
            max: MAX_STOCK_QUANTITY,
        });
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a product draft before create or update.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_category(&product.category)?;
    validate_price("costPrice", product.cost_price_cents)?;
    validate_price("retailPrice", product.retail_price_cents)?;
    validate_price("wholesalePrice", product.wholesale_price_cents)?;
    validate_non_negative("quantity", product.quantity)?;
    validate_at_most("quantity", product.quantity, MAX_STOCK_QUANTITY)?;
    Ok(())
}

/// Validates a sale before it is submitted to the ledger.
pub fn validate_new_sale(sale: &NewSale) -> ValidationResult<()> {
    if sale.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if sale.user_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "userId".to_string(),
        });
    }

    for item in &sale.items {
        validate_quantity(item.quantity)?;
        validate_at_most("quantity", item.quantity, MAX_STOCK_QUANTITY)?;
        validate_price("price", item.price_cents)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PriceType, SaleItem};
    use chrono::Utc;

    fn draft() -> NewProduct {
        NewProduct {
            name: "Spark Plug".to_string(),
            category: "Engine".to_string(),
            cost_price_cents: 200,
            retail_price_cents: 450,
            wholesale_price_cents: 350,
            quantity: 10,
        }
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Spark Plug").is_ok());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_search_query_trims() {
        assert_eq!(validate_search_query("  helmet ").unwrap(), "helmet");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        assert!(validate_new_product(&draft()).is_ok());

        let mut bad = draft();
        bad.quantity = -1;
        assert_eq!(
            validate_new_product(&bad),
            Err(ValidationError::Negative {
                field: "quantity".to_string()
            })
        );

        let mut bad = draft();
        bad.retail_price_cents = -5;
        assert!(validate_new_product(&bad).is_err());
    }

    #[test]
    fn test_validate_new_product_upper_bounds() {
        let mut edge = draft();
        edge.retail_price_cents = MAX_PRICE_CENTS;
        edge.quantity = MAX_STOCK_QUANTITY;
        assert!(validate_new_product(&edge).is_ok());

        let mut bad = draft();
        bad.retail_price_cents = i64::MAX / 2 + 1;
        assert_eq!(
            validate_new_product(&bad),
            Err(ValidationError::TooLarge {
                field: "retailPrice".to_string(),
                max: MAX_PRICE_CENTS,
            })
        );

        let mut bad = draft();
        bad.quantity = MAX_STOCK_QUANTITY + 1;
        assert!(matches!(
            validate_new_product(&bad),
            Err(ValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_stock_delta() {
        assert!(validate_stock_delta(-MAX_STOCK_QUANTITY).is_ok());
        assert!(validate_stock_delta(MAX_STOCK_QUANTITY).is_ok());
        assert!(validate_stock_delta(i64::MAX).is_err());
        assert!(validate_stock_delta(i64::MIN).is_err());
    }

    #[test]
    fn test_validate_new_sale() {
        let item = SaleItem {
            product_id: "p1".to_string(),
            name: "Spark Plug".to_string(),
            quantity: 1,
            price_cents: 450,
            price_type: PriceType::Retail,
        };
        let mut sale = NewSale {
            customer_name: "N/A".to_string(),
            items: vec![item],
            user_id: "u1".to_string(),
            created_at: Utc::now(),
        };
        assert!(validate_new_sale(&sale).is_ok());

        sale.items[0].quantity = 0;
        assert!(validate_new_sale(&sale).is_err());

        sale.items.clear();
        assert!(matches!(
            validate_new_sale(&sale),
            Err(ValidationError::Required { .. })
        ));
    }
}
