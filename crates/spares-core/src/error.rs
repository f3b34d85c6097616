//! # Error Types
//!
//! Domain-specific error types for spares-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  spares-core errors (this file)                                        │
//! │  ├── CoreError        - Cart rejections, domain failures               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  spares-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  spares-pos errors (app)                                               │
//! │  ├── StoreError       - Collaborator failures (NotFound, ...)          │
//! │  ├── CheckoutError    - Checkout refused or aborted                    │
//! │  └── ApiError         - What the front end sees (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Front end              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart rejections (`OutOfStock`, `StockLimitExceeded`) are advisory: the
//! cart is left untouched and the cashier sees a notice.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Adding one more unit would exceed the stock on hand.
    ///
    /// ## When This Occurs
    /// - The line for this product/price type already holds every unit
    /// - The product is new to the cart and has zero stock
    #[error("{name} is out of stock")]
    OutOfStock { product_id: String, name: String },

    /// A requested line quantity exceeds the stock on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Set quantity (qty: 5)
    ///      │
    ///      ▼
    /// Check live stock: available=3
    ///      │
    ///      ▼
    /// StockLimitExceeded { name: "Chain", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Chain available"
    /// ```
    #[error("Only {available} {name} available (requested {requested})")]
    StockLimitExceeded {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The line key is not in the cart.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// Checkout or sale draft requested with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The cart total would no longer fit in a money amount.
    #[error("Cart total is too large")]
    AmountTooLarge,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before anything reaches a store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value exceeds the allowed maximum.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
