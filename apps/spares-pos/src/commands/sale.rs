//! # Sale Commands
//!
//! Checkout plus the admin-only sales history.
//!
//! ## Checkout Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator clicks "Complete Sale"                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  checkout() ──► CheckoutCoordinator::checkout()                         │
//! │       │              │                                                  │
//! │       │              ├── Err ──► "Checkout Failed" notice, cart kept    │
//! │       │              │                                                  │
//! │       │              └── Ok ───► "Sale Processed" notice                │
//! │       │                          one "Stock Update Failed" per warning  │
//! │       ▼                                                                 │
//! │  CheckoutResponse { sale, receipt, receiptText, warnings }              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use spares_core::{Money, Operator, Receipt, Sale};

use super::{require_admin, require_operator};
use crate::checkout::{CheckoutCoordinator, StockDecrementFailed};
use crate::error::ApiError;
use crate::notify::{Notice, Notifier};
use crate::state::{CartState, PosConfig};
use crate::store::SaleLedger;

/// A sale with its recomputed total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    #[serde(flatten)]
    pub sale: Sale,
    pub total: Money,
}

impl From<Sale> for SaleResponse {
    fn from(sale: Sale) -> Self {
        let total = sale.total();
        SaleResponse { sale, total }
    }
}

/// Receipt data plus its plain-text rendering for the printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub receipt: Receipt,
    pub text: String,
}

impl ReceiptResponse {
    fn new(receipt: Receipt, config: &PosConfig) -> Self {
        let text = receipt.render_text_with_width(config.receipt_width);
        ReceiptResponse { receipt, text }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub sale: SaleResponse,
    pub receipt: ReceiptResponse,
    /// Decrements that did not apply; stock needs a manual correction.
    pub warnings: Vec<StockDecrementFailed>,
}

/// Records the cart as a sale, decrements stock and clears the cart.
///
/// ## Errors
/// - `NOT_AUTHENTICATED`, `EMPTY_CART`, `CHECKOUT_IN_PROGRESS` before any I/O
/// - `SALE_CREATION_FAILED` if the ledger refused; the cart is kept for a retry
pub async fn checkout(
    coordinator: &CheckoutCoordinator,
    cart: &CartState,
    operator: Option<&Operator>,
    config: &PosConfig,
    notifier: &Notifier,
) -> Result<CheckoutResponse, ApiError> {
    debug!("checkout command");

    let outcome = match coordinator.checkout(operator, cart).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let err = ApiError::from(e);
            notifier.notify(Notice::error("Checkout Failed", err.message.clone()));
            return Err(err);
        }
    };

    let total = outcome.sale.total();
    notifier.notify(Notice::info(
        "Sale Processed",
        format!(
            "Sale for {} totaling {} recorded.",
            outcome.sale.customer_name,
            config.format_currency(total)
        ),
    ));

    for warning in &outcome.warnings {
        notifier.notify(Notice::warning(
            "Stock Update Failed",
            format!(
                "Could not deduct {} x {} from stock. Please correct it manually.",
                warning.quantity, warning.name
            ),
        ));
    }

    let receipt = outcome.receipt(operator, &config.store);

    Ok(CheckoutResponse {
        sale: outcome.sale.into(),
        receipt: ReceiptResponse::new(receipt, config),
        warnings: outcome.warnings,
    })
}

/// Admin only. Every sale, newest first.
pub async fn list_sales(
    ledger: &dyn SaleLedger,
    operator: Option<&Operator>,
) -> Result<Vec<SaleResponse>, ApiError> {
    require_admin(operator)?;
    debug!("list_sales command");

    let sales = ledger.list_sales().await?;
    Ok(sales.into_iter().map(SaleResponse::from).collect())
}

/// Rebuilds the receipt of a past sale, served by the current operator.
pub async fn get_receipt(
    ledger: &dyn SaleLedger,
    operator: Option<&Operator>,
    config: &PosConfig,
    sale_id: &str,
) -> Result<ReceiptResponse, ApiError> {
    let operator = require_operator(operator)?;
    debug!(sale_id = %sale_id, "get_receipt command");

    let sale = ledger
        .get_sale(sale_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", sale_id))?;

    let receipt = Receipt::new(&sale, Some(operator), &config.store);
    Ok(ReceiptResponse::new(receipt, config))
}

/// Admin only. Stock sold in the sale is not returned to inventory.
pub async fn delete_sale(
    ledger: &dyn SaleLedger,
    operator: Option<&Operator>,
    notifier: &Notifier,
    sale_id: &str,
) -> Result<(), ApiError> {
    let operator = require_admin(operator)?;

    ledger.delete_sale(sale_id).await?;
    info!(sale_id = %sale_id, by = %operator.id, "Sale deleted");
    notifier.notify(Notice::info("Sale Deleted", format!("Sale {} was removed.", sale_id)));
    Ok(())
}

/// Admin only. Reassigns receipt numbers `001…` by creation time.
pub async fn renumber_receipts(
    ledger: &dyn SaleLedger,
    operator: Option<&Operator>,
    notifier: &Notifier,
) -> Result<u64, ApiError> {
    let operator = require_admin(operator)?;

    let count = ledger.renumber_receipts().await?;
    info!(count = %count, by = %operator.id, "Receipts renumbered");
    notifier.notify(Notice::info(
        "Renumbering Complete",
        format!("{} sales have been updated.", count),
    ));
    Ok(count)
}
