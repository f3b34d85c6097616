//! # Cart State
//!
//! The active sale session's cart, shared between commands and the
//! checkout coordinator.
//!
//! The cart rules themselves (stock ceilings, line keys, totals) live in
//! `spares_core::Cart`; this wrapper provides shared ownership and the
//! checkout hold. While a checkout holds the cart, operator edits are
//! refused so the committed sale and the cart reset see the same lines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use spares_core::Cart;
use thiserror::Error;

/// An operator edit arrived while a checkout holds the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("The cart cannot change while a checkout is in progress")]
pub struct CartLocked;

/// Session-scoped cart state.
///
/// ## Thread Safety
/// Uses `Arc<Mutex<Cart>>` because:
/// - `Arc`: the checkout coordinator and the commands share one cart
/// - `Mutex`: only one mutation at a time
///
/// The lock is never held across an `.await`; callers get a closure scope.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
    held: Arc<AtomicBool>,
}

/// Keeps operator edits out until dropped.
#[derive(Debug)]
pub struct CartHold {
    held: Arc<AtomicBool>,
}

impl Drop for CartHold {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = cart_state.with_cart(|cart| cart.totals());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.add_line(&product, PriceType::Retail))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    /// Applies an operator edit, unless a checkout holds the cart.
    pub fn edit<F, R>(&self, f: F) -> Result<R, CartLocked>
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_held() {
            return Err(CartLocked);
        }
        Ok(f(&mut cart))
    }

    /// Takes the checkout hold. `None` if another checkout already has it.
    pub fn hold(&self) -> Option<CartHold> {
        // Taken under the cart lock so no edit straddles the hand-over
        let _cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CartHold {
                held: self.held.clone(),
            })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// Copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.with_cart(|c| c.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spares_core::{PriceType, Product};

    #[test]
    fn test_clones_share_one_cart() {
        let state = CartState::new();
        let other = state.clone();
        let product = Product::new("Spark Plug", "Engine").with_quantity(3);

        other
            .with_cart_mut(|c| c.add_line(&product, PriceType::Retail))
            .unwrap();

        assert_eq!(state.with_cart(|c| c.len()), 1);
        assert_eq!(state.snapshot(), other.snapshot());
    }

    #[test]
    fn test_hold_refuses_edits_until_dropped() {
        let state = CartState::new();
        let product = Product::new("Spark Plug", "Engine").with_quantity(3);

        let hold = state.hold().unwrap();
        assert!(state.hold().is_none());

        let err = state
            .clone()
            .edit(|c| c.add_line(&product, PriceType::Retail))
            .unwrap_err();
        assert_eq!(err, CartLocked);
        assert!(state.with_cart(|c| c.is_empty()));

        drop(hold);
        assert!(!state.is_held());
        state
            .edit(|c| c.add_line(&product, PriceType::Retail))
            .unwrap()
            .unwrap();
        assert_eq!(state.with_cart(|c| c.len()), 1);
    }
}
