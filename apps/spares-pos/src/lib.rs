//! # Spares POS Application Library
//!
//! The application layer: wires the SQLite stores, the live inventory feed,
//! the session cart and the checkout coordinator together, and exposes the
//! command functions a front end calls.
//!
//! ## Module Organization
//! ```text
//! spares_pos/
//! ├── lib.rs          ◄─── You are here (AppState, startup, tracing)
//! ├── state/
//! │   ├── cart.rs     ◄─── Session cart (Arc<Mutex<Cart>>)
//! │   └── config.rs   ◄─── PosConfig (defaults → TOML → SPARES_* env)
//! ├── store/
//! │   ├── mod.rs      ◄─── InventoryStore / SaleLedger traits, StoreError
//! │   ├── sqlite.rs   ◄─── spares-db backed stores
//! │   └── memory.rs   ◄─── In-memory stores with failure injection
//! ├── feed.rs         ◄─── Live catalog snapshots (watch channel)
//! ├── checkout.rs     ◄─── Checkout coordinator state machine
//! ├── notify.rs       ◄─── Operator notices (broadcast channel)
//! ├── commands/       ◄─── Cart, product, sale and report commands
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()            RUST_LOG or "info,spares=debug,sqlx=warn" │
//! │  2. PosConfig::load()         defaults → spares.toml → SPARES_* env     │
//! │  3. AppState::open(config)    SQLite (WAL, migrations), first snapshot  │
//! │  4. start_inventory_refresh() poll for other terminals' stock changes   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod checkout;
pub mod commands;
pub mod error;
pub mod feed;
pub mod notify;
pub mod state;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use checkout::CheckoutCoordinator;
use feed::LiveCatalog;
use notify::Notifier;
use spares_db::{Database, DbConfig, DbError};
use state::{CartState, ConfigError, PosConfig};
use store::{InventoryStore, SaleLedger, SqliteInventory, SqliteLedger, StoreError};

/// Why the application could not start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database: {0}")]
    Database(#[from] DbError),

    #[error("Inventory: {0}")]
    Store(#[from] StoreError),
}

/// Everything one terminal session needs.
pub struct AppState {
    pub config: PosConfig,
    pub inventory: Arc<dyn InventoryStore>,
    pub ledger: Arc<dyn SaleLedger>,
    pub catalog: LiveCatalog,
    pub cart: CartState,
    pub checkout: CheckoutCoordinator,
    pub notifier: Notifier,
}

impl AppState {
    /// Assembles state over any pair of stores.
    pub fn new(
        config: PosConfig,
        inventory: Arc<dyn InventoryStore>,
        ledger: Arc<dyn SaleLedger>,
    ) -> Self {
        AppState {
            catalog: inventory.subscribe(),
            checkout: CheckoutCoordinator::new(inventory.clone(), ledger.clone()),
            cart: CartState::new(),
            notifier: Notifier::default(),
            config,
            inventory,
            ledger,
        }
    }

    /// Opens the configured SQLite database and loads the first snapshot.
    pub async fn open(config: PosConfig) -> Result<Self, StartupError> {
        let db_path = config.resolve_database_path()?;
        info!(db_path = %db_path.display(), "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        Self::with_database(config, db).await
    }

    /// Builds state over an already-open database.
    pub async fn with_database(config: PosConfig, db: Database) -> Result<Self, StartupError> {
        let inventory = SqliteInventory::open(db.clone()).await?;
        let ledger = SqliteLedger::new(db);

        info!("State initialized");
        Ok(Self::new(config, Arc::new(inventory), Arc::new(ledger)))
    }

    /// Starts polling the inventory, unless disabled in the config.
    pub fn start_inventory_refresh(&self) -> Option<JoinHandle<()>> {
        match self.config.inventory_refresh_secs {
            0 => None,
            secs => Some(feed::spawn_refresh(
                self.inventory.clone(),
                Duration::from_secs(secs),
            )),
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=spares_pos=trace` - Trace the application layer only
/// - Default: `info,spares=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,spares=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}
