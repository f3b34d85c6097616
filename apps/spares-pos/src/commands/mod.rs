//! # Commands
//!
//! The operations the front end invokes. Each command takes the state it
//! needs plus the signed-in operator, and returns a serializable DTO or an
//! [`ApiError`].
//!
//! ## Access
//! ```text
//! ┌──────────────────────────┬─────────────┬─────────────┬───────────┐
//! │ Area                     │ Signed out  │ Staff       │ Admin     │
//! ├──────────────────────────┼─────────────┼─────────────┼───────────┤
//! │ Cart, product list       │ ✓           │ ✓           │ ✓         │
//! │ Checkout, product edits  │ ✗           │ ✓           │ ✓         │
//! │ Dashboard                │ ✗           │ ✓           │ ✓         │
//! │ Sales history, reports   │ ✗           │ ✗           │ ✓         │
//! │ Bulk upload, delete all  │ ✗           │ ✗           │ ✓         │
//! └──────────────────────────┴─────────────┴─────────────┴───────────┘
//! ```

pub mod cart;
pub mod product;
pub mod report;
pub mod sale;

use spares_core::Operator;

use crate::error::ApiError;

/// Fails with `NOT_AUTHENTICATED` when nobody is signed in.
pub(crate) fn require_operator(operator: Option<&Operator>) -> Result<&Operator, ApiError> {
    operator.ok_or_else(ApiError::not_authenticated)
}

/// Fails unless an admin is signed in.
pub(crate) fn require_admin(operator: Option<&Operator>) -> Result<&Operator, ApiError> {
    let operator = require_operator(operator)?;
    if !operator.is_admin() {
        return Err(ApiError::permission_denied("Admin access required"));
    }
    Ok(operator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_access_checks() {
        let admin = Operator::fallback("a", "admin@shop.test");
        let staff = Operator::fallback("s", "cashier@shop.test");

        assert_eq!(
            require_operator(None).unwrap_err().code,
            ErrorCode::NotAuthenticated
        );
        assert!(require_operator(Some(&staff)).is_ok());
        assert_eq!(
            require_admin(Some(&staff)).unwrap_err().code,
            ErrorCode::PermissionDenied
        );
        assert_eq!(require_admin(Some(&admin)).unwrap().name, "Admin User");
    }
}
