//! # Application State
//!
//! Focused state types; each command takes only the ones it needs.
//!
//! ```text
//! ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐
//! │    CartState     │ │   LiveCatalog    │ │    PosConfig         │
//! │                  │ │   (crate::feed)  │ │                      │
//! │  • Current cart  │ │  • Latest stock  │ │  • Store identity    │
//! │  • Customer name │ │    snapshot      │ │  • Low-stock limit   │
//! └──────────────────┘ └──────────────────┘ └──────────────────────┘
//! ```

pub mod cart;
pub mod config;

pub use cart::{CartHold, CartLocked, CartState};
pub use config::{default_database_path, ConfigError, PosConfig};
