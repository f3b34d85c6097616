//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SPARES_*`)
//! 2. Config file (`spares.toml`, path from `SPARES_CONFIG`)
//! 3. Defaults (this file)
//!
//! ## Example File
//! ```toml
//! low_stock_threshold = 10
//! database_path = "/var/lib/spares/spares.db"
//!
//! [store]
//! name = "Prasamz Spares"
//! currency_symbol = "Shs"
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use spares_core::{Money, StoreIdentity, DEFAULT_LOW_STOCK_THRESHOLD, RECENT_SALES_LIMIT};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// No platform data directory (e.g. no home directory) and no
    /// `database_path` configured.
    #[error("Could not determine app data directory")]
    NoDataDir,

    #[error("Could not create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosConfig {
    /// Receipt header/footer and currency symbol.
    pub store: StoreIdentity,

    /// Products with fewer units than this are flagged on the dashboard.
    /// Default: 15
    pub low_stock_threshold: i64,

    /// Sales shown in the dashboard's recent list.
    /// Default: 5
    pub recent_sales_limit: usize,

    /// Characters per line on the plain-text receipt.
    /// Default: 40
    pub receipt_width: usize,

    /// SQLite file. `None` means the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Seconds between inventory snapshot refreshes, which pick up stock
    /// changes made by other terminals. 0 disables polling.
    /// Default: 5
    pub inventory_refresh_secs: u64,
}

impl Default for PosConfig {
    fn default() -> Self {
        PosConfig {
            store: StoreIdentity::default(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            recent_sales_limit: RECENT_SALES_LIMIT,
            receipt_width: 40,
            database_path: None,
            inventory_refresh_secs: 5,
        }
    }
}

impl PosConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Defaults, then the optional file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&source)?
            }
            None => PosConfig::default(),
        };

        config.apply_env();
        Ok(config)
    }

    /// Applies `SPARES_*` environment overrides.
    ///
    /// ## Environment Variables
    /// - `SPARES_STORE_NAME`: Override store name
    /// - `SPARES_CURRENCY`: Override currency symbol
    /// - `SPARES_LOW_STOCK_THRESHOLD`: Override low-stock threshold
    /// - `SPARES_DB_PATH`: Override database file
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("SPARES_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(symbol) = lookup("SPARES_CURRENCY") {
            self.store.currency_symbol = symbol;
        }

        if let Some(raw) = lookup("SPARES_LOW_STOCK_THRESHOLD") {
            match raw.trim().parse::<i64>() {
                Ok(threshold) if threshold >= 0 => self.low_stock_threshold = threshold,
                _ => warn!(value = %raw, "Ignoring invalid SPARES_LOW_STOCK_THRESHOLD"),
            }
        }

        if let Some(path) = lookup("SPARES_DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }
    }

    /// The configured database file, or the platform default.
    pub fn resolve_database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => default_database_path(),
        }
    }

    /// Formats an amount with the configured currency symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = PosConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(150_000)), "Shs 1,500.00");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.store.currency_symbol)
    }
}

/// Determines the database file path based on the platform.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.prasamz.spares-pos/spares.db`
/// - **Windows**: `%APPDATA%\prasamz\spares-pos\data\spares.db`
/// - **Linux**: `~/.local/share/spares-pos/spares.db`
pub fn default_database_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("com", "prasamz", "spares-pos").ok_or(ConfigError::NoDataDir)?;

    let data_dir = proj_dirs.data_dir();

    std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::CreateDir {
        path: data_dir.to_path_buf(),
        source,
    })?;

    Ok(data_dir.join("spares.db"))
}
