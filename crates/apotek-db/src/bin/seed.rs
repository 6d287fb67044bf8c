//! # Seed Data Generator
//!
//! Populates the database with sample pharmacy data for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p apotek-db --bin seed
//!
//! # Specify database path
//! cargo run -p apotek-db --bin seed -- --db ./data/apotek.db
//! ```
//!
//! Seeds the standard Indonesian pharmacy categories plus a handful of
//! products, each with one dated batch so FEFO has something to chew on.

use std::collections::HashMap;
use std::env;

use chrono::{Duration, Utc};
use uuid::Uuid;

use apotek_core::ProductBatch;
use apotek_db::{Database, DbConfig, NewProduct};

const CATEGORIES: &[&str] = &[
    "Obat Bebas",
    "Obat Keras",
    "Vitamin & Suplemen",
    "Alat Kesehatan",
    "Perawatan Tubuh",
];

/// (name, generic, sku, drug type, base unit, sell price, category, stock)
const PRODUCTS: &[(&str, &str, &str, &str, &str, i64, &str, i64)] = &[
    ("Paracetamol 500mg", "Paracetamol", "MED-001", "Tablet", "Strip", 5000, "Obat Bebas", 120),
    ("Amoxicillin 500mg", "Amoxicillin", "MED-002", "Kaplet", "Strip", 12000, "Obat Keras", 80),
    ("Vitamin C 1000mg", "Ascorbic Acid", "MED-003", "Tablet", "Strip", 15000, "Vitamin & Suplemen", 60),
    ("OBH Combi 100ml", "Succus Liquiritiae", "MED-004", "Sirup", "Botol", 18000, "Obat Bebas", 40),
    ("Termometer Digital", "", "ALK-001", "", "Pcs", 35000, "Alat Kesehatan", 15),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = parse_db_arg().unwrap_or_else(|| "./apotek.db".to_string());
    println!("Seeding database at {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    if db.products().count().await? > 0 {
        println!("Database already has products, nothing to do");
        return Ok(());
    }

    let mut category_ids: HashMap<&str, String> = HashMap::new();
    for name in CATEGORIES {
        let category = db.categories().insert(name).await?;
        category_ids.insert(*name, category.id);
        println!("  category: {name}");
    }

    for (name, generic, sku, drug_type, base_unit, price, category, stock) in PRODUCTS {
        let product = db
            .products()
            .create(NewProduct {
                name: (*name).to_string(),
                generic_name: non_empty(generic),
                barcode: None,
                sku: Some((*sku).to_string()),
                drug_type: non_empty(drug_type),
                base_unit: Some((*base_unit).to_string()),
                sell_price: *price,
                category_id: category_ids.get(category).cloned(),
                initial_stock: 0,
            })
            .await?;

        // One dated batch per product instead of the INITIAL- batch,
        // so expiry-driven allocation is visible in dev
        db.products()
            .insert_batch(&ProductBatch {
                id: Uuid::new_v4().to_string(),
                product_id: product.id.clone(),
                batch_number: format!("{sku}-B1"),
                stock: *stock,
                buy_price: price * 7 / 10,
                expiry_date: Some((Utc::now() + Duration::days(365)).date_naive()),
                created_at: Utc::now(),
            })
            .await?;

        println!("  product: {name} ({stock} {base_unit})");
    }

    println!("Seed complete");
    Ok(())
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn parse_db_arg() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
}
