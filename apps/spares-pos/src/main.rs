//! Spares POS terminal backend.
//!
//! Opens the shop database, starts the inventory feed and prints the
//! dashboard as JSON. Point `SPARES_CONFIG` at a TOML file to configure it.

use std::path::PathBuf;

use spares_pos::commands::report;
use spares_pos::state::PosConfig;
use spares_pos::{init_tracing, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Spares POS");

    let config_path = std::env::var("SPARES_CONFIG").ok().map(PathBuf::from);
    let config = PosConfig::load(config_path.as_deref())?;

    let app = AppState::open(config).await?;
    let _refresh = app.start_inventory_refresh();

    // The dashboard is visible to every signed-in role; use a staff profile
    let operator = spares_core::Operator::fallback("terminal", "staff@localhost");
    let dashboard =
        report::get_dashboard(&app.catalog, app.ledger.as_ref(), Some(&operator), &app.config)
            .await?;

    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    Ok(())
}
