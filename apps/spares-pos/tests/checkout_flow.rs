//! End-to-end terminal session on an in-memory SQLite database.

use spares_core::{NewProduct, Operator, PriceType};
use spares_db::{Database, DbConfig};
use spares_pos::commands::{cart, product, report, sale};
use spares_pos::error::ErrorCode;
use spares_pos::state::PosConfig;
use spares_pos::store::InventoryStore;
use spares_pos::AppState;

fn row(name: &str, category: &str, retail: i64, wholesale: i64, quantity: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        category: category.to_string(),
        cost_price_cents: wholesale / 2,
        retail_price_cents: retail,
        wholesale_price_cents: wholesale,
        quantity,
    }
}

async fn open_shop() -> (AppState, Operator, Operator) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let config = PosConfig {
        inventory_refresh_secs: 0,
        ..PosConfig::default()
    };
    let app = AppState::with_database(config, db).await.unwrap();

    let admin = Operator::fallback("a1", "admin@shop.test");
    let cashier = Operator::fallback("s1", "cashier@shop.test");

    product::upload_products(
        app.inventory.as_ref(),
        Some(&admin),
        vec![
            row("Brake Pads (Front)", "Brakes", 35_000, 28_000, 4),
            row("Spark Plug", "Engine", 25_000, 20_000, 80),
        ],
    )
    .await
    .unwrap();

    (app, admin, cashier)
}

fn product_id(app: &AppState, name: &str) -> String {
    product::list_products(&app.catalog)
        .into_iter()
        .find(|p| p.name == name)
        .map(|p| p.id)
        .unwrap()
}

#[tokio::test]
async fn test_sale_decrements_stock_and_numbers_receipts() {
    let (app, admin, cashier) = open_shop().await;
    let pads = product_id(&app, "Brake Pads (Front)");

    cart::add_to_cart(&app.cart, &app.catalog, &app.notifier, &pads, PriceType::Retail).unwrap();
    cart::add_to_cart(&app.cart, &app.catalog, &app.notifier, &pads, PriceType::Retail).unwrap();
    let view =
        cart::add_to_cart(&app.cart, &app.catalog, &app.notifier, &pads, PriceType::Wholesale)
            .unwrap();
    cart::set_customer_name(&app.cart, "Otieno Motors").unwrap();

    assert_eq!(view.lines.len(), 2);
    assert_eq!(view.totals.unit_count, 3);
    assert_eq!(view.totals.grand_total.cents(), 98_000);

    let response = sale::checkout(
        &app.checkout,
        &app.cart,
        Some(&cashier),
        &app.config,
        &app.notifier,
    )
    .await
    .unwrap();

    assert!(response.warnings.is_empty());
    assert_eq!(response.sale.sale.receipt_number.as_deref(), Some("001"));
    assert_eq!(response.sale.total.cents(), 98_000);
    assert!(response.receipt.text.contains("Otieno Motors"));

    assert!(cart::get_cart(&app.cart).lines.is_empty());
    assert_eq!(app.catalog.product(&pads).unwrap().quantity, 1);
    assert_eq!(
        product::get_product(app.inventory.as_ref(), &pads)
            .await
            .unwrap()
            .quantity,
        1
    );

    let plug = product_id(&app, "Spark Plug");
    cart::add_to_cart(&app.cart, &app.catalog, &app.notifier, &plug, PriceType::Retail).unwrap();
    let second = sale::checkout(
        &app.checkout,
        &app.cart,
        Some(&cashier),
        &app.config,
        &app.notifier,
    )
    .await
    .unwrap();
    assert_eq!(second.sale.sale.receipt_number.as_deref(), Some("002"));
    assert_eq!(second.sale.sale.customer_name, "N/A");

    let history = sale::list_sales(app.ledger.as_ref(), Some(&admin)).await.unwrap();
    assert_eq!(history.len(), 2);

    let dashboard = report::get_dashboard(
        &app.catalog,
        app.ledger.as_ref(),
        Some(&cashier),
        &app.config,
    )
    .await
    .unwrap();
    assert_eq!(dashboard.total_units_in_stock, 80);
    assert_eq!(dashboard.recent_sales.len(), 2);
}

#[tokio::test]
async fn test_stock_limits_hold_before_checkout() {
    let (app, _admin, cashier) = open_shop().await;
    let pads = product_id(&app, "Brake Pads (Front)");

    let view =
        cart::add_to_cart(&app.cart, &app.catalog, &app.notifier, &pads, PriceType::Retail).unwrap();
    let key = view.lines[0].line_key.clone();

    let err = cart::update_cart_line(&app.cart, &app.catalog, &app.notifier, &key, 5).unwrap_err();
    assert_eq!(err.code, ErrorCode::StockLimitExceeded);
    assert_eq!(cart::get_cart(&app.cart).totals.unit_count, 1);

    cart::update_cart_line(&app.cart, &app.catalog, &app.notifier, &key, 4).unwrap();
    let err = cart::add_to_cart(&app.cart, &app.catalog, &app.notifier, &pads, PriceType::Retail)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OutOfStock);

    // Another terminal sells one unit; the next edit sees the new stock.
    app.inventory.adjust_product_quantity(&pads, -1).await.unwrap();
    let err = cart::update_cart_line(&app.cart, &app.catalog, &app.notifier, &key, 4).unwrap_err();
    assert_eq!(err.code, ErrorCode::StockLimitExceeded);

    let err = sale::checkout(&app.checkout, &app.cart, None, &app.config, &app.notifier)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotAuthenticated);
    assert_eq!(cart::get_cart(&app.cart).totals.unit_count, 4);

    sale::checkout(
        &app.checkout,
        &app.cart,
        Some(&cashier),
        &app.config,
        &app.notifier,
    )
    .await
    .unwrap();
    assert_eq!(app.catalog.product(&pads).unwrap().quantity, 0);
}
