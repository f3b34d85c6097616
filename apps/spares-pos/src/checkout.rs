//! # Checkout Coordinator
//!
//! Turns the session cart into a committed sale plus stock decrements.
//!
//! ## State Machine (one attempt)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Idle ──► Submitting ──┬──► SaleCommitted ──► DecrementingStock ──► Done
//! │                         │                                               │
//! │                         └──► SaleRejected   (no side effects)           │
//! │                                                                         │
//! │  Before Submitting (no I/O at all):                                     │
//! │    • no operator        → NotAuthenticated                              │
//! │    • attempt in flight  → CheckoutInProgress                            │
//! │                           (cart edits too, until the attempt ends)      │
//! │    • empty cart         → EmptyCart                                     │
//! │                                                                         │
//! │  DecrementingStock always ends in Done. Each failed decrement becomes   │
//! │  a StockDecrementFailed warning for manual reconciliation.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! The ledger write completes before any decrement starts. The decrements
//! themselves run concurrently and may finish in any order. Each is a
//! single atomic clamped update in the inventory store, so concurrent
//! sales on other terminals never lose an update.
//!
//! ## Cancellation
//! Dropping the checkout future releases the in-flight flag. Writes that
//! were already issued stay in place; there is no compensating rollback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use spares_core::validation::validate_new_sale;
use spares_core::{CoreError, Operator, Receipt, Sale, SaleItem, StoreIdentity, ValidationError};

use crate::state::CartState;
use crate::store::{InventoryStore, SaleLedger, StoreError};

// =============================================================================
// Phase & Errors
// =============================================================================

/// Where the current (or last) checkout attempt stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum CheckoutPhase {
    Idle,
    Submitting,
    SaleCommitted { sale_id: String },
    DecrementingStock { sale_id: String },
    Done { sale_id: String, warnings: usize },
    SaleRejected { reason: String },
}

impl CheckoutPhase {
    /// True while inputs should stay disabled.
    pub fn is_processing(&self) -> bool {
        matches!(
            self,
            CheckoutPhase::Submitting
                | CheckoutPhase::SaleCommitted { .. }
                | CheckoutPhase::DecrementingStock { .. }
        )
    }
}

/// Why a checkout did not produce a sale.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("A checkout is already in progress")]
    InProgress,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid sale: {0}")]
    Invalid(#[from] ValidationError),

    /// The ledger refused or could not be reached. The cart is untouched
    /// and no stock was adjusted.
    #[error("Sale could not be recorded: {0}")]
    SaleCreationFailed(StoreError),
}

/// A stock decrement that failed after the sale was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDecrementFailed {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub reason: String,
}

/// A committed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub sale: Sale,
    /// Empty when every decrement applied.
    pub warnings: Vec<StockDecrementFailed>,
}

impl CheckoutOutcome {
    pub fn receipt(&self, operator: Option<&Operator>, store: &StoreIdentity) -> Receipt {
        Receipt::new(&self.sale, operator, store)
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// One stock decrement: every unit of a product sold in this sale, across
/// both price types.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Decrement {
    product_id: String,
    name: String,
    quantity: i64,
}

/// Merges items per product, first appearance first, so each product
/// record receives exactly one adjustment.
fn merge_decrements(items: &[SaleItem]) -> Vec<Decrement> {
    let mut merged: Vec<Decrement> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for item in items {
        match index.get(item.product_id.as_str()) {
            Some(&i) => merged[i].quantity += item.quantity,
            None => {
                index.insert(&item.product_id, merged.len());
                merged.push(Decrement {
                    product_id: item.product_id.clone(),
                    name: item.name.clone(),
                    quantity: item.quantity,
                });
            }
        }
    }

    merged
}

/// Clears the in-flight flag when the attempt ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// Coordinator
// =============================================================================

pub struct CheckoutCoordinator {
    inventory: Arc<dyn InventoryStore>,
    ledger: Arc<dyn SaleLedger>,
    in_flight: AtomicBool,
    phase: watch::Sender<CheckoutPhase>,
}

impl CheckoutCoordinator {
    pub fn new(inventory: Arc<dyn InventoryStore>, ledger: Arc<dyn SaleLedger>) -> Self {
        let (phase, _rx) = watch::channel(CheckoutPhase::Idle);
        CheckoutCoordinator {
            inventory,
            ledger,
            in_flight: AtomicBool::new(false),
            phase,
        }
    }

    /// Observer for phase changes (e.g. to disable the pay button).
    pub fn phases(&self) -> watch::Receiver<CheckoutPhase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase.borrow().clone()
    }

    fn set_phase(&self, phase: CheckoutPhase) {
        debug!(phase = ?phase, "Checkout phase");
        self.phase.send_replace(phase);
    }

    /// Runs one checkout of `cart` for `operator`.
    ///
    /// ## Returns
    /// * `Ok(outcome)` - Sale committed and cart cleared; `outcome.warnings`
    ///   lists decrements that need manual stock correction
    /// * `Err(CheckoutError)` - No sale was recorded and the cart is as it was
    pub async fn checkout(
        &self,
        operator: Option<&Operator>,
        cart: &CartState,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let operator = operator.ok_or(CheckoutError::NotAuthenticated)?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CheckoutError::InProgress);
        }
        let _guard = InFlight(&self.in_flight);
        // Operator edits wait until the attempt ends
        let _hold = cart.hold().ok_or(CheckoutError::InProgress)?;

        let draft = cart
            .with_cart(|c| c.draft_sale(&operator.id, Utc::now()))
            .map_err(|e| match e {
                CoreError::Validation(v) => CheckoutError::Invalid(v),
                _ => CheckoutError::EmptyCart,
            })?;
        validate_new_sale(&draft)?;

        // Step 1: the ledger write. Nothing has changed anywhere yet.
        self.set_phase(CheckoutPhase::Submitting);
        debug!(
            user_id = %operator.id,
            items = draft.items.len(),
            total = %draft.total(),
            "Submitting sale"
        );

        let sale = match self.ledger.create_sale(&draft).await {
            Ok(sale) => sale,
            Err(e) => {
                warn!(error = %e, "Sale rejected by ledger; cart kept");
                self.set_phase(CheckoutPhase::SaleRejected {
                    reason: e.to_string(),
                });
                return Err(CheckoutError::SaleCreationFailed(e));
            }
        };

        info!(
            sale_id = %sale.id,
            receipt = ?sale.receipt_number,
            total = %sale.total(),
            "Sale committed"
        );
        self.set_phase(CheckoutPhase::SaleCommitted {
            sale_id: sale.id.clone(),
        });

        // Step 2: best-effort decrements, all at once.
        self.set_phase(CheckoutPhase::DecrementingStock {
            sale_id: sale.id.clone(),
        });
        let warnings = self.decrement_stock(&sale).await;

        cart.with_cart_mut(|c| c.reset());

        self.set_phase(CheckoutPhase::Done {
            sale_id: sale.id.clone(),
            warnings: warnings.len(),
        });

        Ok(CheckoutOutcome { sale, warnings })
    }

    async fn decrement_stock(&self, sale: &Sale) -> Vec<StockDecrementFailed> {
        let decrements = merge_decrements(&sale.items);

        let results = join_all(decrements.iter().map(|d| async move {
            let result = self
                .inventory
                .adjust_product_quantity(&d.product_id, -d.quantity)
                .await;
            (d, result)
        }))
        .await;

        results
            .into_iter()
            .filter_map(|(d, result)| match result {
                Ok(remaining) => {
                    debug!(product_id = %d.product_id, remaining = %remaining, "Stock decremented");
                    None
                }
                Err(e) => {
                    warn!(
                        sale_id = %sale.id,
                        product_id = %d.product_id,
                        quantity = %d.quantity,
                        error = %e,
                        "Stock decrement failed; reconcile manually"
                    );
                    Some(StockDecrementFailed {
                        product_id: d.product_id.clone(),
                        name: d.name.clone(),
                        quantity: d.quantity,
                        reason: e.to_string(),
                    })
                }
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
