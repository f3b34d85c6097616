//! # Receipt Renderer
//!
//! Turns a committed [`Sale`] into a printable receipt.
//!
//! ```text
//!          PRASAMZ SPARES
//!  Motorbike and bicycle accessories
//! K7 Building, Nyamakima, 1st Floor, Shop 57
//!  Call: 0713-702-111 / 0721-268-951
//! ----------------------------------------
//! Receipt:                             007
//! Date:                   19/10/2026 14:05
//! Served by:                         Peter
//! ----------------------------------------
//! Item           Qty  Unit Price     Total
//! Chain Lube       2      450.00    900.00
//! ----------------------------------------
//! Subtotal:                     Shs 900.00
//! Total:                        Shs 900.00
//! ----------------------------------------
//!    Thank you for shopping with us!
//! ```
//!
//! Building the [`Receipt`] value is pure; nothing here prints or reads a
//! clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Operator, Sale};

const DEFAULT_WIDTH: usize = 40;
const QTY_WIDTH: usize = 5;
const PRICE_WIDTH: usize = 12;
const TOTAL_WIDTH: usize = 10;

// =============================================================================
// Store Identity
// =============================================================================

/// The fixed header and footer printed on every receipt.
///
/// Missing fields fall back to the defaults, so a config file may override
/// only the store name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct StoreIdentity {
    pub name: String,
    /// Lines printed under the store name (trade, address, phone).
    pub header_lines: Vec<String>,
    pub footer_lines: Vec<String>,
    pub currency_symbol: String,
}

impl Default for StoreIdentity {
    fn default() -> Self {
        Self {
            name: "Prasamz Spares".to_string(),
            header_lines: vec![
                "Motorbike and bicycle accessories".to_string(),
                "K7 Building, Nyamakima, 1st Floor, Shop 57".to_string(),
                "Call: 0713-702-111 / 0721-268-951".to_string(),
            ],
            footer_lines: vec![
                "Thank you for shopping with us!".to_string(),
                "For pos and ICT solutions contact : 0758515042".to_string(),
            ],
            currency_symbol: "Shs".to_string(),
        }
    }
}

// =============================================================================
// Receipt
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Everything a printed receipt shows, already resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receipt {
    pub store: StoreIdentity,
    pub sale_id: String,
    pub receipt_number: Option<String>,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub served_by: String,
    pub customer_name: String,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Money,
    pub total: Money,
}

impl Receipt {
    /// Builds the receipt for a committed sale.
    ///
    /// `served_by` is the operator's name, or `"-"` when no identity is
    /// available (e.g. reprinting an old sale).
    pub fn new(sale: &Sale, operator: Option<&Operator>, store: &StoreIdentity) -> Self {
        let lines: Vec<ReceiptLine> = sale
            .items
            .iter()
            .map(|item| ReceiptLine {
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.price(),
                line_total: item.line_total(),
            })
            .collect();

        let subtotal: Money = lines.iter().map(|l| l.line_total).sum();

        Self {
            store: store.clone(),
            sale_id: sale.id.clone(),
            receipt_number: sale.receipt_number.clone(),
            date: sale.created_at,
            served_by: operator
                .map(|o| o.name.clone())
                .unwrap_or_else(|| "-".to_string()),
            customer_name: sale.customer_name.clone(),
            lines,
            subtotal,
            total: subtotal,
        }
    }

    /// Renders at the default 40-column width.
    pub fn render_text(&self) -> String {
        self.render_text_with_width(DEFAULT_WIDTH)
    }

    /// Renders as fixed-width plain text for a thermal printer.
    ///
    /// Item names longer than their column go on their own line with the
    /// numbers underneath.
    pub fn render_text_with_width(&self, width: usize) -> String {
        let width = width.max(QTY_WIDTH + PRICE_WIDTH + TOTAL_WIDTH + 8);
        let item_width = width - QTY_WIDTH - PRICE_WIDTH - TOTAL_WIDTH;
        let rule = "-".repeat(width);
        let symbol = &self.store.currency_symbol;
        let mut out: Vec<String> = Vec::new();

        out.push(center(&self.store.name.to_uppercase(), width));
        for line in &self.store.header_lines {
            out.push(center(line, width));
        }
        out.push(rule.clone());

        if let Some(number) = &self.receipt_number {
            out.push(spread("Receipt:", number, width));
        }
        out.push(spread(
            "Date:",
            &self.date.format("%d/%m/%Y %H:%M").to_string(),
            width,
        ));
        out.push(spread("Served by:", &self.served_by, width));
        out.push(spread("Customer:", &self.customer_name, width));
        out.push(rule.clone());

        out.push(format!(
            "{:<iw$}{:>qw$}{:>pw$}{:>tw$}",
            "Item",
            "Qty",
            "Unit Price",
            "Total",
            iw = item_width,
            qw = QTY_WIDTH,
            pw = PRICE_WIDTH,
            tw = TOTAL_WIDTH,
        ));

        for line in &self.lines {
            let name = if line.name.chars().count() < item_width {
                line.name.clone()
            } else {
                out.push(line.name.clone());
                String::new()
            };
            out.push(format!(
                "{:<iw$}{:>qw$}{:>pw$}{:>tw$}",
                name,
                line.quantity,
                line.unit_price.format_with_symbol(""),
                line.line_total.format_with_symbol(""),
                iw = item_width,
                qw = QTY_WIDTH,
                pw = PRICE_WIDTH,
                tw = TOTAL_WIDTH,
            ));
        }

        out.push(rule.clone());
        out.push(spread("Subtotal:", &self.subtotal.format_with_symbol(symbol), width));
        out.push(spread("Total:", &self.total.format_with_symbol(symbol), width));
        out.push(rule);

        for line in &self.store.footer_lines {
            out.push(center(line, width));
        }

        let mut text = out
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n");
        text.push('\n');
        text
    }
}

/// Label on the left, value flush right.
fn spread(label: &str, value: &str, width: usize) -> String {
    let used = label.chars().count() + value.chars().count();
    if used >= width {
        return format!("{label} {value}");
    }
    format!("{label}{}{value}", " ".repeat(width - used))
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    format!("{}{}", " ".repeat((width - len) / 2), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewSale, PriceType, Role, SaleItem};
    use chrono::TimeZone;

    fn sale() -> Sale {
        Sale::from_new(
            "sale-1",
            Some("007".to_string()),
            NewSale {
                customer_name: "N/A".to_string(),
                items: vec![
                    SaleItem {
                        product_id: "p1".to_string(),
                        name: "Chain Lube".to_string(),
                        quantity: 2,
                        price_cents: 45_000,
                        price_type: PriceType::Retail,
                    },
                    SaleItem {
                        product_id: "p2".to_string(),
                        name: "Motorcycle Brake Pads (Front, Sintered)".to_string(),
                        quantity: 1,
                        price_cents: 150_000,
                        price_type: PriceType::Wholesale,
                    },
                ],
                user_id: "u1".to_string(),
                created_at: Utc.with_ymd_and_hms(2026, 10, 19, 14, 5, 0).unwrap(),
            },
        )
    }

    #[test]
    fn test_receipt_totals_match_sale() {
        let op = Operator::new("u1", "Peter", "peter@shop.co.ke", Role::Staff);
        let receipt = Receipt::new(&sale(), Some(&op), &StoreIdentity::default());

        assert_eq!(receipt.lines.len(), 2);
        assert_eq!(receipt.lines[0].line_total.cents(), 90_000);
        assert_eq!(receipt.subtotal.cents(), 240_000);
        assert_eq!(receipt.total, receipt.subtotal);
        assert_eq!(receipt.served_by, "Peter");
    }

    #[test]
    fn test_render_text_layout() {
        let op = Operator::new("u1", "Peter", "peter@shop.co.ke", Role::Staff);
        let text = Receipt::new(&sale(), Some(&op), &StoreIdentity::default()).render_text();

        assert!(text.contains("PRASAMZ SPARES"));
        assert!(text.contains("K7 Building, Nyamakima, 1st Floor, Shop 57"));
        assert!(text.contains("Date:                   19/10/2026 14:05"));
        assert!(text.contains("Receipt:                             007"));
        assert!(text.contains("Subtotal:                   Shs 2,400.00"));
        assert!(text.contains("Thank you for shopping with us!"));

        // Long names get their own line
        assert!(text.contains("\nMotorcycle Brake Pads (Front, Sintered)\n"));

        for line in text.lines() {
            assert!(line.chars().count() <= 46, "line too wide: {line:?}");
        }
    }

    #[test]
    fn test_missing_operator() {
        let receipt = Receipt::new(&sale(), None, &StoreIdentity::default());
        assert_eq!(receipt.served_by, "-");
    }
}
