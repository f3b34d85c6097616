//! # API Error Type
//!
//! Unified error type for the command layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Spares POS                             │
//! │                                                                         │
//! │  Command Function: Result<T, ApiError>                                  │
//! │         │                                                               │
//! │         ├── CoreError::OutOfStock ───────────► OUT_OF_STOCK             │
//! │         ├── CoreError::Validation ───────────► VALIDATION_ERROR         │
//! │         ├── StoreError::NotFound ────────────► NOT_FOUND                │
//! │         ├── StoreError::Unavailable ─────────► UNAVAILABLE              │
//! │         ├── StoreError::Backend ─────────────► DATABASE_ERROR (logged)  │
//! │         ├── CheckoutError::SaleCreationFailed► SALE_CREATION_FAILED     │
//! │         ├── CartLocked ──────────────────────► CHECKOUT_IN_PROGRESS     │
//! │         └── Success ─────────────────────────► T                        │
//! │                                                                         │
//! │  Front end:                                                             │
//! │  try { await checkout() } catch (e) {                                   │
//! │    // e.code = "SALE_CREATION_FAILED"                                   │
//! │    // e.message = "Sale could not be recorded: ..."                     │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use spares_core::{CoreError, ValidationError};

use crate::checkout::CheckoutError;
use crate::state::CartLocked;
use crate::store::StoreError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 9b1d..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// No unit left to add
    OutOfStock,

    /// Requested quantity above stock on hand
    StockLimitExceeded,

    EmptyCart,

    /// No operator signed in
    NotAuthenticated,

    /// Operator lacks the admin role, or the backend refused the write
    PermissionDenied,

    /// Another checkout is still running
    CheckoutInProgress,

    /// The ledger did not record the sale; the cart is kept
    SaleCreationFailed,

    /// Database operation failed
    DatabaseError,

    /// Store temporarily unreachable; retry later
    Unavailable,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn not_authenticated() -> Self {
        ApiError::new(ErrorCode::NotAuthenticated, "Please log in")
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::PermissionDenied, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            StoreError::PermissionDenied(msg) => ApiError::permission_denied(msg),
            StoreError::Unavailable(msg) => {
                tracing::warn!("Store unavailable: {}", msg);
                ApiError::new(ErrorCode::Unavailable, "Database unavailable, try again")
            }
            StoreError::Rejected(msg) => ApiError::validation(msg),
            StoreError::Backend(msg) => {
                // Log the actual error but return a generic message
                tracing::error!("Store operation failed: {}", msg);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::OutOfStock { .. } => ErrorCode::OutOfStock,
            CoreError::StockLimitExceeded { .. } => ErrorCode::StockLimitExceeded,
            CoreError::ProductNotFound(id) => return ApiError::not_found("Product", id),
            CoreError::LineNotFound(key) => return ApiError::not_found("Cart line", key),
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::AmountTooLarge => ErrorCode::ValidationError,
            CoreError::Validation(e) => return ApiError::validation(e.to_string()),
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts checkout errors to API errors.
impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::NotAuthenticated => ApiError::not_authenticated(),
            CheckoutError::InProgress => ApiError::new(ErrorCode::CheckoutInProgress, err.to_string()),
            CheckoutError::EmptyCart => ApiError::new(ErrorCode::EmptyCart, "Add products first"),
            CheckoutError::Invalid(e) => e.into(),
            CheckoutError::SaleCreationFailed(ref e) => {
                tracing::error!("Sale creation failed: {}", e);
                ApiError::new(ErrorCode::SaleCreationFailed, err.to_string())
            }
        }
    }
}

impl From<CartLocked> for ApiError {
    fn from(err: CartLocked) -> Self {
        ApiError::new(ErrorCode::CheckoutInProgress, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
