//! # Report Commands
//!
//! Dashboard and sales reports, computed from the live catalog and the
//! ledger's sale list. The arithmetic lives in `spares_core::report`.

use tracing::debug;

use spares_core::report::{self, Dashboard, SalesReport};
use spares_core::Operator;

use super::{require_admin, require_operator};
use crate::error::ApiError;
use crate::feed::LiveCatalog;
use crate::state::PosConfig;
use crate::store::SaleLedger;

/// Low-stock products, units on hand and the most recent sales.
pub async fn get_dashboard(
    catalog: &LiveCatalog,
    ledger: &dyn SaleLedger,
    operator: Option<&Operator>,
    config: &PosConfig,
) -> Result<Dashboard, ApiError> {
    require_operator(operator)?;
    debug!("get_dashboard command");

    let sales = ledger.list_sales().await?;
    Ok(catalog.with(|c| {
        report::dashboard(
            c,
            &sales,
            config.low_stock_threshold,
            config.recent_sales_limit,
        )
    }))
}

/// Admin only. Stock value, sales value, profit, and the monthly and
/// per-product breakdowns.
///
/// Profit uses each product's current cost price; items whose product has
/// since been deleted count at zero cost.
pub async fn get_sales_report(
    catalog: &LiveCatalog,
    ledger: &dyn SaleLedger,
    operator: Option<&Operator>,
) -> Result<SalesReport, ApiError> {
    require_admin(operator)?;
    debug!("get_sales_report command");

    let sales = ledger.list_sales().await?;
    Ok(catalog.with(|c| report::sales_report(&sales, c)))
}
