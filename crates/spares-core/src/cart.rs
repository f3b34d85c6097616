//! # Cart Engine
//!
//! The in-memory line-item collection for one active sale session.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Engine Operations                               │
//! │                                                                         │
//! │  Cashier Action           Operation                 State Change        │
//! │  ──────────────           ─────────                 ────────────        │
//! │                                                                         │
//! │  Tap product (retail) ──► add_line() ─────────────► qty += 1 or insert  │
//! │                                                                         │
//! │  Type quantity ─────────► set_line_quantity() ────► qty = n (≤ stock)   │
//! │                                                     n ≤ 0 removes line  │
//! │                                                                         │
//! │  Click remove ──────────► remove_line() ──────────► line deleted        │
//! │                                                                         │
//! │  View totals ───────────► totals() ───────────────► (read only)         │
//! │                                                                         │
//! │  Sale committed ────────► reset() ────────────────► empty cart          │
//! │                                                                         │
//! │  NOTE: every rejected mutation leaves the cart exactly as it was.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Ceiling
//! A line's quantity may never exceed the product's on-hand quantity as last
//! observed from the inventory store. The check always runs against the
//! snapshot handed in at the moment of the mutation, so a product whose
//! stock drops on another terminal stops accepting units here as soon as the
//! new snapshot arrives.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::StockLevels;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{NewSale, PriceType, Product, SaleItem};
use crate::WALK_IN_CUSTOMER;

// =============================================================================
// Line Key
// =============================================================================

/// Identity of a cart line: the same product at the same price type always
/// lands on the same line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineKey {
    pub product_id: String,
    pub price_type: PriceType,
}

impl LineKey {
    pub fn new(product_id: impl Into<String>, price_type: PriceType) -> Self {
        Self {
            product_id: product_id.into(),
            price_type,
        }
    }
}

/// Renders as `"{product_id}-{price_type}"`, the key the front end uses.
impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.product_id, self.price_type)
    }
}

impl FromStr for LineKey {
    type Err = String;

    /// Splits on the last `-`, so UUID product ids survive the round trip.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (product_id, price_type) = s
            .rsplit_once('-')
            .ok_or_else(|| format!("invalid cart line key: {s}"))?;

        if product_id.is_empty() {
            return Err(format!("invalid cart line key: {s}"));
        }

        Ok(LineKey::new(product_id, price_type.parse()?))
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One product + price type entry in the cart. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    /// Product name when the line was created.
    pub name: String,
    pub price_type: PriceType,
    /// Unit price locked in when the line was created.
    pub unit_price_cents: i64,
    /// Always at least 1 while the line exists.
    pub cart_quantity: i64,
}

impl CartLine {
    fn from_product(product: &Product, price_type: PriceType) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price_type,
            unit_price_cents: product.price_for(price_type).cents(),
            cart_quantity: 1,
        }
    }

    pub fn key(&self) -> LineKey {
        LineKey::new(self.product_id.clone(), self.price_type)
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.cart_quantity)
    }

    /// Freezes the line into a sale item.
    pub fn to_sale_item(&self) -> SaleItem {
        SaleItem {
            product_id: self.product_id.clone(),
            name: self.name.clone(),
            quantity: self.cart_quantity,
            price_cents: self.unit_price_cents,
            price_type: self.price_type,
        }
    }
}

// =============================================================================
// Notices & Totals
// =============================================================================

/// Advisory message produced by a successful add. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CartNotice {
    /// A new line was created.
    Added { name: String, price_type: PriceType },
    /// An existing line gained one unit.
    Updated { name: String, cart_quantity: i64 },
}

impl CartNotice {
    pub fn message(&self) -> String {
        match self {
            CartNotice::Added { name, price_type } => {
                format!("{name} added with {price_type} price")
            }
            CartNotice::Updated { name, .. } => format!("{name} updated"),
        }
    }
}

/// Cart totals. There is no tax or discount layer, so the grand total
/// equals the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub unit_count: i64,
    pub subtotal: Money,
    pub grand_total: Money,
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `(product_id, price_type)`
/// - Every line has `cart_quantity >= 1`
/// - Lines iterate in the order they were first added
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: HashMap<LineKey, CartLine>,
    order: Vec<LineKey>,
    customer_name: String,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `product` at `price_type`.
    ///
    /// `product` must be the latest snapshot from the inventory store; its
    /// `quantity` is the stock ceiling.
    ///
    /// ## Errors
    /// - `OutOfStock` if the existing line already holds every unit, or the
    ///   product is new to the cart and has no stock. The cart is unchanged.
    /// - `AmountTooLarge` if the cart total would overflow
    pub fn add_line(&mut self, product: &Product, price_type: PriceType) -> CoreResult<CartNotice> {
        let key = LineKey::new(product.id.clone(), price_type);

        let (in_cart, unit_price_cents) = match self.lines.get(&key) {
            Some(line) => (line.cart_quantity, line.unit_price_cents),
            None => (0, product.price_for(price_type).cents()),
        };
        if in_cart >= product.quantity {
            return Err(out_of_stock(product));
        }
        self.ensure_subtotal_fits(&key, in_cart + 1, unit_price_cents)?;

        if let Some(line) = self.lines.get_mut(&key) {
            line.cart_quantity += 1;
            return Ok(CartNotice::Updated {
                name: line.name.clone(),
                cart_quantity: line.cart_quantity,
            });
        }

        self.lines
            .insert(key.clone(), CartLine::from_product(product, price_type));
        self.order.push(key);

        Ok(CartNotice::Added {
            name: product.name.clone(),
            price_type,
        })
    }

    /// Sets a line's quantity, checked against `stock`.
    ///
    /// A quantity of zero or less removes the line (same as
    /// [`remove_line`](Self::remove_line)). A product missing from `stock`
    /// counts as having nothing on hand.
    ///
    /// ## Errors
    /// - `LineNotFound` if the key is not in the cart
    /// - `StockLimitExceeded` if `new_quantity` is above the stock on hand
    /// - `AmountTooLarge` if the cart total would overflow
    pub fn set_line_quantity(
        &mut self,
        key: &LineKey,
        new_quantity: i64,
        stock: &impl StockLevels,
    ) -> CoreResult<()> {
        if new_quantity <= 0 {
            self.remove_line(key);
            return Ok(());
        }

        let line = self
            .lines
            .get(key)
            .ok_or_else(|| CoreError::LineNotFound(key.to_string()))?;

        let available = stock.on_hand(&key.product_id).unwrap_or(0);
        if new_quantity > available {
            return Err(CoreError::StockLimitExceeded {
                product_id: key.product_id.clone(),
                name: line.name.clone(),
                available,
                requested: new_quantity,
            });
        }

        let unit_price_cents = line.unit_price_cents;
        self.ensure_subtotal_fits(key, new_quantity, unit_price_cents)?;

        if let Some(line) = self.lines.get_mut(key) {
            line.cart_quantity = new_quantity;
        }
        Ok(())
    }

    /// Checks that the subtotal stays representable if the line at `key`
    /// held `quantity` units at `unit_price_cents`.
    fn ensure_subtotal_fits(
        &self,
        key: &LineKey,
        quantity: i64,
        unit_price_cents: i64,
    ) -> CoreResult<()> {
        let changed = Money::from_cents(unit_price_cents).checked_multiply_quantity(quantity);

        self.lines
            .iter()
            .filter(|(k, _)| *k != key)
            .try_fold(changed.ok_or(CoreError::AmountTooLarge)?, |acc, (_, line)| {
                line.unit_price()
                    .checked_multiply_quantity(line.cart_quantity)
                    .and_then(|total| acc.checked_add(total))
                    .ok_or(CoreError::AmountTooLarge)
            })
            .map(|_| ())
    }

    /// Deletes a line. Removing an absent line is a no-op.
    pub fn remove_line(&mut self, key: &LineKey) -> Option<CartLine> {
        let removed = self.lines.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    /// Totals over the lines currently present. Recomputed on every call.
    pub fn totals(&self) -> CartTotals {
        let subtotal: Money = self.lines.values().map(CartLine::line_total).sum();
        CartTotals {
            line_count: self.lines.len(),
            unit_count: self
                .lines
                .values()
                .fold(0i64, |n, l| n.saturating_add(l.cart_quantity)),
            subtotal,
            grand_total: subtotal,
        }
    }

    /// Clears every line and the customer name.
    pub fn reset(&mut self) {
        self.lines.clear();
        self.order.clear();
        self.customer_name.clear();
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> + '_ {
        self.order.iter().filter_map(|k| self.lines.get(k))
    }

    pub fn line(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.get(key)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn set_customer_name(&mut self, name: impl Into<String>) {
        self.customer_name = name.into();
    }

    /// Snapshots the cart into a sale for the ledger.
    ///
    /// A blank customer name becomes `"N/A"`. The cart itself is untouched;
    /// call [`reset`](Self::reset) once the ledger accepts the sale.
    pub fn draft_sale(&self, user_id: &str, created_at: DateTime<Utc>) -> CoreResult<NewSale> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let customer = self.customer_name.trim();
        let customer_name = if customer.is_empty() {
            WALK_IN_CUSTOMER.to_string()
        } else {
            customer.to_string()
        };

        Ok(NewSale {
            customer_name,
            items: self.lines().map(CartLine::to_sale_item).collect(),
            user_id: user_id.to_string(),
            created_at,
        })
    }
}

fn out_of_stock(product: &Product) -> CoreError {
    CoreError::OutOfStock {
        product_id: product.id.clone(),
        name: product.name.clone(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn product(id: &str, qty: i64, retail: i64, wholesale: i64) -> Product {
        Product::new(format!("Part {id}"), "Spares")
            .with_id(id)
            .with_prices(
                Money::from_cents(retail / 2),
                Money::from_cents(retail),
                Money::from_cents(wholesale),
            )
            .with_quantity(qty)
    }

    #[test]
    fn test_add_line_respects_stock_ceiling() {
        let a = product("a", 1, 15_000, 12_000);
        let mut cart = Cart::new();

        let notice = cart.add_line(&a, PriceType::Retail).unwrap();
        assert_eq!(notice.message(), "Part a added with retail price");

        let before = cart.clone();
        let err = cart.add_line(&a, PriceType::Retail).unwrap_err();
        assert!(matches!(err, CoreError::OutOfStock { .. }));
        assert_eq!(cart, before);

        let key = LineKey::new("a", PriceType::Retail);
        assert_eq!(cart.line(&key).unwrap().cart_quantity, 1);
        assert_eq!(cart.totals().subtotal.cents(), 15_000);
    }

    #[test]
    fn test_overflowing_total_is_rejected() {
        let kit = product("kit", 5, i64::MAX / 2 + 1, 10);
        let mut cart = Cart::new();

        cart.add_line(&kit, PriceType::Retail).unwrap();
        let before = cart.clone();
        assert_eq!(
            cart.add_line(&kit, PriceType::Retail),
            Err(CoreError::AmountTooLarge)
        );
        assert_eq!(cart, before);
        assert_eq!(cart.totals().subtotal.cents(), i64::MAX / 2 + 1);

        let stock = Catalog::new(vec![kit.clone()]);
        let key = LineKey::new("kit", PriceType::Retail);
        assert_eq!(
            cart.set_line_quantity(&key, 3, &stock),
            Err(CoreError::AmountTooLarge)
        );
        assert_eq!(cart, before);

        // Overflow across lines counts too
        let other = product("other", 1, i64::MAX / 2 + 1, 10);
        assert_eq!(
            cart.add_line(&other, PriceType::Retail),
            Err(CoreError::AmountTooLarge)
        );
        assert!(cart.add_line(&kit, PriceType::Wholesale).is_ok());
    }

    #[test]
    fn test_repeated_adds_never_exceed_stock() {
        let a = product("a", 3, 1_000, 800);
        let mut cart = Cart::new();

        let results: Vec<_> = (0..5).map(|_| cart.add_line(&a, PriceType::Retail)).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
        assert!(results[3].is_err());
        assert!(results[4].is_err());

        let key = LineKey::new("a", PriceType::Retail);
        assert_eq!(cart.line(&key).unwrap().cart_quantity, 3);
    }

    #[test]
    fn test_add_increments_existing_line() {
        let a = product("a", 5, 1_000, 800);
        let mut cart = Cart::new();

        cart.add_line(&a, PriceType::Wholesale).unwrap();
        let notice = cart.add_line(&a, PriceType::Wholesale).unwrap();

        assert_eq!(notice.message(), "Part a updated");
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.totals().subtotal.cents(), 1_600);
    }

    #[test]
    fn test_same_product_different_price_types_are_separate_lines() {
        let a = product("a", 5, 1_000, 800);
        let mut cart = Cart::new();

        cart.add_line(&a, PriceType::Retail).unwrap();
        cart.add_line(&a, PriceType::Wholesale).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.totals().subtotal.cents(), 1_800);
    }

    #[test]
    fn test_zero_stock_product_is_rejected() {
        let a = product("a", 0, 1_000, 800);
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add_line(&a, PriceType::Retail),
            Err(CoreError::OutOfStock { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_uses_live_quantity() {
        let mut a = product("a", 2, 1_000, 800);
        let mut cart = Cart::new();
        cart.add_line(&a, PriceType::Retail).unwrap();

        // Another terminal sold one; the next snapshot shows 1 left
        a.quantity = 1;
        assert!(cart.add_line(&a, PriceType::Retail).is_err());
    }

    #[test]
    fn test_totals_two_lines() {
        let a = product("a", 10, 100, 80);
        let b = product("b", 10, 60, 50);
        let mut cart = Cart::new();

        cart.add_line(&a, PriceType::Retail).unwrap();
        cart.add_line(&a, PriceType::Retail).unwrap();
        cart.add_line(&b, PriceType::Wholesale).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.subtotal.cents(), 250);
        assert_eq!(totals.grand_total.cents(), 250);
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.unit_count, 3);
    }

    #[test]
    fn test_set_line_quantity() {
        let a = product("a", 4, 1_000, 800);
        let catalog = Catalog::new(vec![a.clone()]);
        let key = LineKey::new("a", PriceType::Retail);
        let mut cart = Cart::new();
        cart.add_line(&a, PriceType::Retail).unwrap();

        cart.set_line_quantity(&key, 4, &catalog).unwrap();
        assert_eq!(cart.totals().subtotal.cents(), 4_000);

        let before = cart.clone();
        let err = cart.set_line_quantity(&key, 5, &catalog).unwrap_err();
        assert_eq!(
            err,
            CoreError::StockLimitExceeded {
                product_id: "a".to_string(),
                name: "Part a".to_string(),
                available: 4,
                requested: 5,
            }
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn test_set_zero_equals_remove() {
        let a = product("a", 4, 1_000, 800);
        let b = product("b", 4, 500, 400);
        let catalog = Catalog::new(vec![a.clone(), b.clone()]);
        let key = LineKey::new("a", PriceType::Retail);

        let mut via_set = Cart::new();
        via_set.add_line(&a, PriceType::Retail).unwrap();
        via_set.add_line(&b, PriceType::Retail).unwrap();
        let mut via_remove = via_set.clone();

        via_set.set_line_quantity(&key, 0, &catalog).unwrap();
        via_remove.remove_line(&key);

        assert_eq!(via_set, via_remove);
        assert_eq!(via_set.totals().subtotal.cents(), 500);
    }

    #[test]
    fn test_set_quantity_for_product_missing_from_stock() {
        let a = product("a", 4, 1_000, 800);
        let key = LineKey::new("a", PriceType::Retail);
        let mut cart = Cart::new();
        cart.add_line(&a, PriceType::Retail).unwrap();

        let empty = Catalog::default();
        assert!(matches!(
            cart.set_line_quantity(&key, 2, &empty),
            Err(CoreError::StockLimitExceeded { available: 0, .. })
        ));
    }

    #[test]
    fn test_set_quantity_unknown_line() {
        let catalog = Catalog::default();
        let key = LineKey::new("ghost", PriceType::Retail);
        let mut cart = Cart::new();
        assert!(matches!(
            cart.set_line_quantity(&key, 1, &catalog),
            Err(CoreError::LineNotFound(_))
        ));
        assert!(cart.set_line_quantity(&key, 0, &catalog).is_ok());
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        for id in ["c", "a", "b"] {
            cart.add_line(&product(id, 1, 100, 90), PriceType::Retail)
                .unwrap();
        }
        cart.remove_line(&LineKey::new("a", PriceType::Retail));

        let ids: Vec<_> = cart.lines().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[test]
    fn test_draft_sale_and_reset() {
        let a = product("a", 2, 1_000, 800);
        let mut cart = Cart::new();
        assert_eq!(cart.draft_sale("u1", Utc::now()), Err(CoreError::EmptyCart));

        cart.add_line(&a, PriceType::Wholesale).unwrap();
        cart.set_customer_name("   ");
        let sale = cart.draft_sale("u1", Utc::now()).unwrap();

        assert_eq!(sale.customer_name, "N/A");
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].price_cents, 800);
        assert_eq!(sale.items[0].price_type, PriceType::Wholesale);
        assert_eq!(sale.total().cents(), 800);

        cart.set_customer_name("Kamau Garage");
        assert_eq!(
            cart.draft_sale("u1", Utc::now()).unwrap().customer_name,
            "Kamau Garage"
        );

        cart.reset();
        assert!(cart.is_empty());
        assert_eq!(cart.customer_name(), "");
        assert_eq!(cart.totals().subtotal, Money::zero());
    }

    #[test]
    fn test_line_key_round_trip_with_uuid() {
        let key = LineKey::new("1b4e28ba-2fa1-11d2-883f-0016d3cca427", PriceType::Wholesale);
        let text = key.to_string();
        assert_eq!(text, "1b4e28ba-2fa1-11d2-883f-0016d3cca427-wholesale");
        assert_eq!(text.parse::<LineKey>().unwrap(), key);
        assert!("nodash".parse::<LineKey>().is_err());
        assert!("abc-bulk".parse::<LineKey>().is_err());
    }
}
