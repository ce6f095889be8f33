//! # Seed Data Generator
//!
//! Populates a database with a development catalog and tax table.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p tillbook-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p tillbook-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p tillbook-db --bin seed -- --db ./data/tillbook.db
//! ```
//!
//! ## Generated Data
//! - Products named `{item} {size}` across a few categories, with prices
//!   between 1.99 and 14.99 and stock between 0 and 100
//! - Two fixed taxes: a 10% service charge and a 0.50 bag fee
//!
//! An existing catalog is left alone.

use clap::Parser;
use rust_decimal::Decimal;
use tillbook_core::{AdjustmentKind, FixedTax, Money, Product};
use tillbook_db::{load_collection, Database, DbConfig, KeyValueStore, StoreKey};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Products per category for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Drinks",
        &[
            "Espresso",
            "Cappuccino",
            "Latte",
            "Iced Tea",
            "Orange Juice",
            "Lemonade",
            "Sparkling Water",
            "Hot Chocolate",
        ],
    ),
    (
        "Bakery",
        &[
            "Croissant",
            "Cheese Bread",
            "Banana Bread",
            "Blueberry Muffin",
            "Cinnamon Roll",
            "Baguette",
        ],
    ),
    (
        "Snacks",
        &[
            "Potato Chips",
            "Granola Bar",
            "Trail Mix",
            "Chocolate Bar",
            "Popcorn",
        ],
    ),
];

/// Size variants with their price add-on in cents
const SIZES: &[(&str, i64)] = &[("Small", 0), ("Medium", 150), ("Large", 300)];

/// Tillbook seed data generator
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Number of products to generate
    #[arg(short, long, default_value_t = 200)]
    count: usize,

    /// Database file path
    #[arg(short, long, default_value = "./tillbook_dev.db")]
    db: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args = Args::parse();

    println!("🌱 Tillbook Seed Data Generator");
    println!("===============================");
    println!("Database: {}", args.db);
    println!("Products: {}", args.count);
    println!();

    let db = Database::new(DbConfig::new(&args.db)).await?;
    let store = db.store();

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing: Vec<Product> = load_collection(&store, StoreKey::Inventory).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let products: Vec<Product> = CATEGORIES
        .iter()
        .flat_map(|(_, items)| items.iter())
        .flat_map(|item| SIZES.iter().map(move |size| (item, size)))
        .cycle()
        .take(args.count)
        .enumerate()
        .map(|(seed, (item, (size, addon)))| generate_product(item, size, *addon, seed))
        .collect();

    let taxes = vec![
        FixedTax::new("Service", Decimal::from(10), AdjustmentKind::Percentage),
        FixedTax::new("Bag fee", Decimal::new(50, 2), AdjustmentKind::Amount),
    ];

    store
        .save_many(vec![
            (
                StoreKey::Inventory,
                tillbook_db::encode_collection(StoreKey::Inventory, &products)?,
            ),
            (
                StoreKey::FixedTaxes,
                tillbook_db::encode_collection(StoreKey::FixedTaxes, &taxes)?,
            ),
        ])
        .await?;

    info!(products = products.len(), taxes = taxes.len(), "Seed written");

    println!();
    println!(
        "✓ Generated {} products and {} fixed taxes in {:?}",
        products.len(),
        taxes.len(),
        start.elapsed()
    );

    db.close().await;
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic, varied data.
fn generate_product(item: &str, size: &str, price_addon: i64, seed: usize) -> Product {
    let seed = seed as i64;

    // Base price 1.99 - 11.99, plus the size add-on
    let price_cents = 199 + (seed * 37) % 1000 + price_addon;

    // Stock 0 - 100
    let stock = (seed * 13) % 101;

    Product::new(format!("{} {}", item, size), stock, Money::from_cents(price_cents))
}
