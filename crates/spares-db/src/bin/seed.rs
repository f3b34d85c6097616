//! # Seed Data Generator
//!
//! Populates the database with a demo catalog of motorbike and bicycle
//! spares for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p spares-db --bin seed
//!
//! # Specify database path
//! cargo run -p spares-db --bin seed -- --db ./data/spares.db
//!
//! # Wipe existing products first
//! cargo run -p spares-db --bin seed -- --reset
//! ```

use spares_core::NewProduct;
use spares_db::{Database, DbConfig};
use std::env;

/// (category, name, cost, retail, wholesale, quantity) in whole shillings
const CATALOG: &[(&str, &str, i64, i64, i64, i64)] = &[
    ("Helmets", "Pro-Tec Classic Helmet", 900, 1_500, 1_200, 6),
    ("Helmets", "Full-Face Helmet (Visor)", 2_400, 3_800, 3_200, 4),
    ("Brakes", "Brake Pads (Front)", 180, 350, 280, 40),
    ("Brakes", "Brake Pads (Rear)", 160, 320, 250, 35),
    ("Brakes", "Brake Cable", 60, 150, 110, 60),
    ("Drive", "Chain 428H x 120L", 650, 1_100, 900, 12),
    ("Drive", "Sprocket Kit", 1_400, 2_300, 1_900, 8),
    ("Drive", "Bicycle Chain 1/2 x 1/8", 250, 450, 380, 25),
    ("Engine", "Spark Plug", 120, 250, 200, 80),
    ("Engine", "Air Filter", 200, 400, 320, 14),
    ("Engine", "Engine Oil 1L", 450, 700, 620, 30),
    ("Tyres", "Inner Tube 26\"", 180, 300, 250, 50),
    ("Tyres", "Tyre 2.75-18", 1_500, 2_400, 2_100, 10),
    ("Accessories", "Side Mirror (Pair)", 300, 600, 480, 18),
    ("Accessories", "Handle Grips", 90, 200, 150, 3),
    ("Accessories", "LED Indicator Set", 400, 750, 600, 0),
];

fn catalog() -> Vec<NewProduct> {
    CATALOG
        .iter()
        .map(|&(category, name, cost, retail, wholesale, qty)| NewProduct {
            name: name.to_string(),
            category: category.to_string(),
            cost_price_cents: cost * 100,
            retail_price_cents: retail * 100,
            wholesale_price_cents: wholesale * 100,
            quantity: qty,
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./spares_dev.db");
    let mut reset = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--reset" => reset = true,
            "--help" | "-h" => {
                println!("Spares POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./spares_dev.db)");
                println!("      --reset        Delete all products before seeding");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Spares POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if reset {
        let removed = db.products().delete_all().await?;
        println!("✓ Removed {} existing products", removed);
    }

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Re-run with --reset to replace them.");
        return Ok(());
    }

    let inserted = db.products().insert_many(&catalog()).await?;
    println!("✓ Inserted {} products", inserted.len());

    let low: Vec<_> = inserted
        .iter()
        .filter(|p| p.quantity < spares_core::DEFAULT_LOW_STOCK_THRESHOLD)
        .map(|p| p.name.as_str())
        .collect();
    println!("  Low stock: {}", low.join(", "));

    db.close().await;
    Ok(())
}
