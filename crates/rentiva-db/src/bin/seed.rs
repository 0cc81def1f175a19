//! # Seed Data Generator
//!
//! Populates the database with development shops and rentable products.
//!
//! ## Usage
//! ```bash
//! # Seed the default database (./rentiva.db)
//! cargo run -p rentiva-db --bin seed
//!
//! # Specify database path
//! cargo run -p rentiva-db --bin seed -- --db ./data/rentiva.db
//! ```

use std::env;

use rentiva_db::{Database, DbConfig, ProductRepository, ShopRepository};

/// Development catalog: (owner id, shop name, products as (name, cents/day)).
const SHOPS: &[(&str, &str, &[(&str, i64)])] = &[
    (
        "seed-user-lens",
        "Northside Camera House",
        &[
            ("Full-Frame DSLR Kit", 6500),
            ("50mm f/1.4 Prime Lens", 1800),
            ("Carbon Tripod", 900),
            ("LED Light Panel Pair", 2200),
        ],
    ),
    (
        "seed-user-tools",
        "Harbor Tool Library",
        &[
            ("Rotary Hammer Drill", 3200),
            ("Tile Saw", 4100),
            ("Pressure Washer", 2800),
        ],
    ),
    (
        "seed-user-trail",
        "Trailhead Outfitters",
        &[
            ("4-Person Tent", 2500),
            ("Touring Kayak", 5500),
            ("Snowshoe Pair", 1200),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut db_path = "./rentiva.db".to_string();

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" if i + 1 < args.len() => {
                db_path = args[i + 1].clone();
                i += 2;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!("Usage: seed [--db <path>]");
                std::process::exit(1);
            }
        }
    }

    println!("Seeding database at {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let mut shop_count = 0;
    let mut product_count = 0;

    for (owner_id, shop_name, products) in SHOPS {
        if db.shops().find_by_owner(owner_id).await?.is_some() {
            println!("  {shop_name}: already seeded, skipping");
            continue;
        }

        let shop = ShopRepository::build(owner_id, shop_name);
        db.shops().insert(&shop).await?;
        shop_count += 1;

        for (name, price_per_day_cents) in *products {
            let product = ProductRepository::build(&shop.id, name, *price_per_day_cents);
            db.products().insert(&product).await?;
            product_count += 1;
        }

        println!("  {shop_name}: {} products", products.len());
    }

    println!("Done: {shop_count} shops, {product_count} products inserted");

    db.close().await;
    Ok(())
}
