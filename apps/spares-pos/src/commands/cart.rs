//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│ Receipt  │       │
//! │  │  Cart    │     │          │     │          │     │          │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │       ▲                │             (sale.rs)           │              │
//! │       │           add_to_cart                            │              │
//! │       │           update_cart_line                       │              │
//! │       │           remove_from_cart                       │              │
//! │       │           set_customer_name                      │              │
//! │       └──────────────────────────────────────────────────┘              │
//! │                      cart reset after commit                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stock check reads the live catalog at the moment of the command.
//! While a checkout is in flight every mutation fails with
//! `CHECKOUT_IN_PROGRESS` and the cart is left as the checkout drafted it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use spares_core::{Cart, CartLine, CartTotals, CoreError, LineKey, Money, PriceType};

use crate::error::ApiError;
use crate::feed::LiveCatalog;
use crate::notify::{Notice, Notifier};
use crate::state::CartState;

/// One cart row as the front end renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    /// `"{productId}-{priceType}"`, passed back to update/remove.
    pub line_key: String,
    pub product_id: String,
    pub name: String,
    pub price_type: PriceType,
    pub unit_price: Money,
    pub cart_quantity: i64,
    pub line_total: Money,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        CartLineView {
            line_key: line.key().to_string(),
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            price_type: line.price_type,
            unit_price: line.unit_price(),
            cart_quantity: line.cart_quantity,
            line_total: line.line_total(),
        }
    }
}

/// Cart response including lines and freshly computed totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLineView>,
    pub totals: CartTotals,
    pub customer_name: String,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            lines: cart.lines().map(CartLineView::from).collect(),
            totals: cart.totals(),
            customer_name: cart.customer_name().to_string(),
        }
    }
}

fn parse_line_key(raw: &str) -> Result<LineKey, ApiError> {
    raw.parse::<LineKey>().map_err(ApiError::validation)
}

/// Publishes the advisory for a rejected mutation, then hands the error on.
fn advise(notifier: &Notifier, err: CoreError) -> ApiError {
    if let Some(notice) = Notice::for_cart_error(&err) {
        notifier.notify(notice);
    }
    err.into()
}

/// Gets the current cart contents.
pub fn get_cart(cart: &CartState) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|c| CartResponse::from(c))
}

/// Adds one unit of a product at the given price type.
///
/// ## Behavior
/// - Same product + price type already in cart: quantity increases by one
/// - Otherwise: new line with quantity 1, price frozen from the catalog
/// - No unit left: `OUT_OF_STOCK`, cart unchanged
pub fn add_to_cart(
    cart: &CartState,
    catalog: &LiveCatalog,
    notifier: &Notifier,
    product_id: &str,
    price_type: PriceType,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, price_type = %price_type, "add_to_cart command");

    let product = catalog
        .product(product_id)
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    let notice = cart
        .edit(|c| c.add_line(&product, price_type))?
        .map_err(|e| advise(notifier, e))?;
    notifier.notify(Notice::for_cart(&notice));

    Ok(get_cart(cart))
}

/// Sets a line's quantity. Zero or less removes the line.
///
/// ## Errors
/// - `STOCK_LIMIT_EXCEEDED` if the catalog holds fewer units
/// - `NOT_FOUND` if the line is not in the cart
pub fn update_cart_line(
    cart: &CartState,
    catalog: &LiveCatalog,
    notifier: &Notifier,
    line_key: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(line_key = %line_key, quantity = %quantity, "update_cart_line command");

    let key = parse_line_key(line_key)?;
    catalog
        .with(|stock| cart.edit(|c| c.set_line_quantity(&key, quantity, stock)))?
        .map_err(|e| advise(notifier, e))?;

    Ok(get_cart(cart))
}

/// Removes a line. Removing a line that is not there is a no-op.
pub fn remove_from_cart(cart: &CartState, line_key: &str) -> Result<CartResponse, ApiError> {
    debug!(line_key = %line_key, "remove_from_cart command");

    let key = parse_line_key(line_key)?;
    cart.edit(|c| c.remove_line(&key))?;

    Ok(get_cart(cart))
}

pub fn set_customer_name(cart: &CartState, name: &str) -> Result<CartResponse, ApiError> {
    debug!("set_customer_name command");
    cart.edit(|c| c.set_customer_name(name))?;
    Ok(get_cart(cart))
}

/// Empties the cart without recording anything.
pub fn clear_cart(cart: &CartState) -> Result<CartResponse, ApiError> {
    debug!("clear_cart command");
    cart.edit(|c| c.reset())?;
    Ok(get_cart(cart))
}
