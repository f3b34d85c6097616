//! # Domain Types
//!
//! Core domain types used throughout Spares POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Operator     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id             │       │
//! │  │  name/category  │   │  receipt_number │   │  email          │       │
//! │  │  cost/retail/   │   │  customer_name  │   │  role           │       │
//! │  │  wholesale      │   │  items[] ───────┼─┐ └─────────────────┘       │
//! │  │  quantity       │   │  user_id        │ │                            │
//! │  └────────▲────────┘   └─────────────────┘ │ ┌─────────────────┐       │
//! │           │ weak back-reference            └►│    SaleItem     │       │
//! │           └──────────────────────────────────┤  product_id     │       │
//! │                                              │  name snapshot  │       │
//! │  ┌─────────────────┐   ┌─────────────────┐   │  price snapshot │       │
//! │  │   PriceType     │   │      Role       │   └─────────────────┘       │
//! │  │  Retail         │   │  Admin          │                             │
//! │  │  Wholesale      │   │  Staff          │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `SaleItem` copies the product's name and the unit price charged at the
//! time of sale. Later product edits (or deletion) never rewrite history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Price Type
// =============================================================================

/// Which of the product's two selling prices a cart line uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    /// Walk-in customer price.
    Retail,
    /// Trade price for garages and resellers.
    Wholesale,
}

impl PriceType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PriceType::Retail => "retail",
            PriceType::Wholesale => "wholesale",
        }
    }
}

impl Default for PriceType {
    fn default() -> Self {
        PriceType::Retail
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retail" => Ok(PriceType::Retail),
            "wholesale" => Ok(PriceType::Wholesale),
            other => Err(format!("unknown price type: {other}")),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product held in the inventory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4), assigned by the store.
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Free-text grouping ("Helmets", "Brake Pads", ...).
    pub category: String,

    /// What the shop paid per unit, in cents.
    pub cost_price_cents: i64,

    /// Selling price for walk-in customers, in cents.
    pub retail_price_cents: i64,

    /// Selling price for trade customers, in cents.
    pub wholesale_price_cents: i64,

    /// Units on hand. Authoritative stock level, never negative.
    pub quantity: i64,

    /// When the product was created. Never changed by updates.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product with a fresh id, zero prices and no stock.
    ///
    /// Mostly useful for tests and seed data; stores assign their own ids
    /// when given a [`NewProduct`].
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            category: category.into(),
            cost_price_cents: 0,
            retail_price_cents: 0,
            wholesale_price_cents: 0,
            quantity: 0,
            created_at: Utc::now(),
        }
    }

    /// Builds a stored product from a draft plus store-assigned identity.
    pub fn from_new(id: impl Into<String>, new: NewProduct, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: new.name,
            category: new.category,
            cost_price_cents: new.cost_price_cents,
            retail_price_cents: new.retail_price_cents,
            wholesale_price_cents: new.wholesale_price_cents,
            quantity: new.quantity,
            created_at,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_prices(mut self, cost: Money, retail: Money, wholesale: Money) -> Self {
        self.cost_price_cents = cost.cents();
        self.retail_price_cents = retail.cents();
        self.wholesale_price_cents = wholesale.cents();
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    #[inline]
    pub fn retail_price(&self) -> Money {
        Money::from_cents(self.retail_price_cents)
    }

    #[inline]
    pub fn wholesale_price(&self) -> Money {
        Money::from_cents(self.wholesale_price_cents)
    }

    /// Returns the selling price for the given price type.
    pub fn price_for(&self, price_type: PriceType) -> Money {
        match price_type {
            PriceType::Retail => self.retail_price(),
            PriceType::Wholesale => self.wholesale_price(),
        }
    }

    /// Value of the units on hand at cost.
    pub fn stock_value(&self) -> Money {
        self.cost_price().multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn is_in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// A product as submitted for creation, before the store assigns identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub cost_price_cents: i64,
    pub retail_price_cents: i64,
    pub wholesale_price_cents: i64,
    pub quantity: i64,
}

impl From<&Product> for NewProduct {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            category: p.category.clone(),
            cost_price_cents: p.cost_price_cents,
            retail_price_cents: p.retail_price_cents,
            wholesale_price_cents: p.wholesale_price_cents,
            quantity: p.quantity,
        }
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    /// Weak back-reference; the product may since have been deleted.
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    /// Units sold.
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub price_cents: i64,
    pub price_type: PriceType,
}

impl SaleItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Unit price × quantity. Always computed, never stored.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale as submitted to the ledger, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub customer_name: String,
    pub items: Vec<SaleItem>,
    pub user_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl NewSale {
    pub fn total(&self) -> Money {
        self.items.iter().map(SaleItem::line_total).sum()
    }
}

/// A committed sale. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    /// Assigned by the ledger on create.
    pub id: String,
    /// Human-readable sequence ("001", "002", ...). Older records may lack one
    /// until the ledger is renumbered.
    pub receipt_number: Option<String>,
    pub customer_name: String,
    pub items: Vec<SaleItem>,
    /// Operator who recorded the sale.
    pub user_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Finalizes a submitted sale with its ledger-assigned identity.
    pub fn from_new(id: impl Into<String>, receipt_number: Option<String>, new: NewSale) -> Self {
        Self {
            id: id.into(),
            receipt_number,
            customer_name: new.customer_name,
            items: new.items,
            user_id: new.user_id,
            created_at: new.created_at,
        }
    }

    /// Σ price × quantity over the items. Recomputed on every call.
    pub fn total(&self) -> Money {
        self.items.iter().map(SaleItem::line_total).sum()
    }

    /// Total units across all items.
    pub fn units(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Formats a 1-based sequence number as a receipt number ("001").
pub fn format_receipt_number(sequence: i64) -> String {
    format!("{:03}", sequence)
}

// =============================================================================
// Operator
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access: sales history, reports, bulk upload.
    Admin,
    /// Counter access: POS and products.
    Staff,
}

impl Role {
    /// Role used when the identity provider has no profile for a user.
    ///
    /// ## Example
    /// ```rust
    /// use spares_core::Role;
    ///
    /// assert_eq!(Role::from_email("admin@shop.co.ke"), Role::Admin);
    /// assert_eq!(Role::from_email("jane@shop.co.ke"), Role::Staff);
    /// ```
    pub fn from_email(email: &str) -> Self {
        if email.trim().to_lowercase().starts_with("admin") {
            Role::Admin
        } else {
            Role::Staff
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated staff or admin identity performing actions.
///
/// Passed explicitly (`Option<&Operator>`) into the coordinator and commands;
/// `None` means nobody is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Operator {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Operator {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
        }
    }

    /// Profile created for a signed-in user that has none yet.
    pub fn fallback(id: impl Into<String>, email: impl Into<String>) -> Self {
        let email = email.into();
        let role = Role::from_email(&email);
        let name = match role {
            Role::Admin => "Admin User",
            Role::Staff => "Staff User",
        };
        Self::new(id, name, email, role)
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(qty: i64, price: i64) -> SaleItem {
        SaleItem {
            product_id: "p1".to_string(),
            name: "Brake Pad".to_string(),
            quantity: qty,
            price_cents: price,
            price_type: PriceType::Retail,
        }
    }

    #[test]
    fn test_price_type_wire_format() {
        let json = serde_json::to_string(&PriceType::Wholesale).unwrap();
        assert_eq!(json, "\"wholesale\"");

        let parsed: SaleItem = serde_json::from_value(serde_json::json!({
            "product_id": "p1",
            "name": "Brake Pad",
            "quantity": 2,
            "price_cents": 35_000,
            "price_type": "retail",
        }))
        .unwrap();
        assert_eq!(parsed, item(2, 35_000));
    }

    #[test]
    fn test_price_for_selects_field() {
        let p = Product::new("Chain", "Drive").with_prices(
            Money::from_cents(500),
            Money::from_cents(1_000),
            Money::from_cents(800),
        );
        assert_eq!(p.price_for(PriceType::Retail).cents(), 1_000);
        assert_eq!(p.price_for(PriceType::Wholesale).cents(), 800);
    }

    #[test]
    fn test_price_type_parse_and_display() {
        assert_eq!("Retail".parse::<PriceType>(), Ok(PriceType::Retail));
        assert_eq!(" wholesale ".parse::<PriceType>(), Ok(PriceType::Wholesale));
        assert!("trade".parse::<PriceType>().is_err());
        assert_eq!(PriceType::Wholesale.to_string(), "wholesale");
    }

    #[test]
    fn test_price_type_serializes_lowercase() {
        let json = serde_json::to_string(&PriceType::Wholesale).unwrap();
        assert_eq!(json, "\"wholesale\"");
    }

    #[test]
    fn test_sale_total_is_recomputed() {
        let mut sale = Sale::from_new(
            "s1",
            Some(format_receipt_number(1)),
            NewSale {
                customer_name: "N/A".to_string(),
                items: vec![item(2, 10_000), item(1, 5_000)],
                user_id: "u1".to_string(),
                created_at: Utc::now(),
            },
        );
        assert_eq!(sale.total().cents(), 25_000);
        assert_eq!(sale.units(), 3);

        sale.items.pop();
        assert_eq!(sale.total().cents(), 20_000);
    }

    #[test]
    fn test_receipt_number_padding() {
        assert_eq!(format_receipt_number(1), "001");
        assert_eq!(format_receipt_number(42), "042");
        assert_eq!(format_receipt_number(1234), "1234");
    }

    #[test]
    fn test_operator_fallback_role() {
        let admin = Operator::fallback("u1", "Admin@shop.co.ke");
        assert!(admin.is_admin());
        assert_eq!(admin.name, "Admin User");

        let staff = Operator::fallback("u2", "counter@shop.co.ke");
        assert_eq!(staff.role, Role::Staff);
        assert_eq!(staff.name, "Staff User");
    }

    #[test]
    fn test_stock_value_uses_cost() {
        let p = Product::new("Mirror", "Accessories")
            .with_prices(Money::from_cents(300), Money::from_cents(700), Money::from_cents(500))
            .with_quantity(4);
        assert_eq!(p.stock_value().cents(), 1_200);
    }
}
