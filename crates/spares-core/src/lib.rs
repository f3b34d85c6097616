//! # spares-core: Pure Business Logic for Spares POS
//!
//! Everything in this crate is deterministic and free of I/O. The database
//! layer and the checkout coordinator build on these types.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Spares POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Web Front End (product grid, cart)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           spares-pos (checkout coordinator, live feed)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ spares-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ receipt │ │ report  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Operator, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`catalog`] - Indexed product snapshot used for live stock lookups
//! - [`cart`] - The Cart Engine
//! - [`receipt`] - Receipt Renderer
//! - [`report`] - Sales, profit and stock reports
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use spares_core::{Cart, Money, PriceType, Product};
//!
//! let helmet = Product::new("Pro-Tec Classic Helmet", "Helmets")
//!     .with_prices(Money::from_cents(9_000), Money::from_cents(15_000), Money::from_cents(12_000))
//!     .with_quantity(1);
//!
//! let mut cart = Cart::new();
//! cart.add_line(&helmet, PriceType::Retail).unwrap();
//!
//! // Only one in stock: the second add is rejected and nothing changes
//! assert!(cart.add_line(&helmet, PriceType::Retail).is_err());
//! assert_eq!(cart.totals().subtotal.cents(), 15_000);
//! ```

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod receipt;
pub mod report;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine, CartNotice, CartTotals, LineKey};
pub use catalog::{Catalog, StockLevels};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use receipt::{Receipt, ReceiptLine, StoreIdentity};
pub use types::*;

/// Customer name recorded when the cashier leaves the field blank.
pub const WALK_IN_CUSTOMER: &str = "N/A";

/// Products with fewer units than this show up on the dashboard's
/// low-stock list (configurable in spares-pos).
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 15;

/// Number of sales shown in the dashboard's "recent sales" panel.
pub const RECENT_SALES_LIMIT: usize = 5;

/// Highest unit price accepted for a product, in cents (Shs 100 million).
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;

/// Highest stock level, and largest single stock correction, accepted.
///
/// Together with [`MAX_PRICE_CENTS`] this keeps every line total and
/// stock value far inside `i64`.
pub const MAX_STOCK_QUANTITY: i64 = 1_000_000;
