//! # Product Repository
//!
//! Database operations for products and their batches.
//!
//! ## Batch-Based Stock
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 How Product Stock Works                             │
//! │                                                                     │
//! │  Products never store a stock column. Stock lives on batches:       │
//! │                                                                     │
//! │  Paracetamol 500mg                                                  │
//! │  ├── Batch PCT-2024-03  stock 40   exp 2026-03-01                   │
//! │  ├── Batch PCT-2024-09  stock 100  exp 2026-09-01                   │
//! │  └── Batch INITIAL-...  stock 10   (no expiry)                      │
//! │                         ──────                                      │
//! │       totalStock =       150   (computed at read time)              │
//! │                                                                     │
//! │  Sales drain batches FEFO (first-expired-first-out); the batch      │
//! │  with the earliest expiry date empties first.                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use apotek_core::{
    total_stock, Category, LedgerEntryType, Product, ProductBatch, StockLedgerEntry,
};

use crate::error::DbResult;
use crate::repository::ledger;

// =============================================================================
// Read Model
// =============================================================================

/// A product with its category, batches and computed total stock.
///
/// This is the shape `GET /products` returns: the product's fields are
/// flattened into the object, `totalStock` is the sum of batch stock.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithStock {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
    pub batches: Vec<ProductBatch>,
    pub total_stock: i64,
}

// =============================================================================
// Write Model
// =============================================================================

/// Input for creating a product, optionally with an initial stock batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub generic_name: Option<String>,
    pub barcode: Option<String>,
    pub sku: Option<String>,
    pub drug_type: Option<String>,
    /// Smallest sellable unit; defaults to "Pcs".
    pub base_unit: Option<String>,
    /// Selling price per base unit, integer rupiah.
    pub sell_price: i64,
    pub category_id: Option<String>,
    /// When positive, one initial batch with this stock gets created.
    pub initial_stock: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product with category, batches and computed total stock.
    ///
    /// Three queries (products, batches, categories), grouped in memory;
    /// no per-product round trips.
    pub async fn list_with_stock(&self) -> DbResult<Vec<ProductWithStock>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, generic_name, barcode, sku, drug_type, base_unit,
                   sell_price, category_id, created_at, updated_at
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let batches = sqlx::query_as::<_, ProductBatch>(
            r#"
            SELECT id, product_id, batch_number, stock, buy_price, expiry_date, created_at
            FROM product_batches
            ORDER BY expiry_date IS NULL, expiry_date, created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name, created_at FROM categories")
                .fetch_all(&self.pool)
                .await?;

        let mut batches_by_product: HashMap<String, Vec<ProductBatch>> = HashMap::new();
        for batch in batches {
            batches_by_product
                .entry(batch.product_id.clone())
                .or_default()
                .push(batch);
        }

        let categories_by_id: HashMap<String, Category> =
            categories.into_iter().map(|c| (c.id.clone(), c)).collect();

        let result = products
            .into_iter()
            .map(|product| {
                let batches = batches_by_product.remove(&product.id).unwrap_or_default();
                let category = product
                    .category_id
                    .as_ref()
                    .and_then(|id| categories_by_id.get(id).cloned());
                let stock = total_stock(&batches);
                ProductWithStock {
                    product,
                    category,
                    batches,
                    total_stock: stock,
                }
            })
            .collect();

        Ok(result)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, generic_name, barcode, sku, drug_type, base_unit,
                   sell_price, category_id, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product's batches in FEFO order (earliest expiry first,
    /// batches without expiry last, ties broken by creation time).
    pub async fn get_batches(&self, product_id: &str) -> DbResult<Vec<ProductBatch>> {
        let batches = sqlx::query_as::<_, ProductBatch>(
            r#"
            SELECT id, product_id, batch_number, stock, buy_price, expiry_date, created_at
            FROM product_batches
            WHERE product_id = ?1
            ORDER BY expiry_date IS NULL, expiry_date, created_at
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    /// Creates a product and, when `initial_stock > 0`, its initial batch
    /// plus a `restock` ledger entry - all in one database transaction.
    ///
    /// ## Returns
    /// The created product. The initial batch is named
    /// `INITIAL-<millis>`, carries buy price 0 and no expiry date.
    pub async fn create(&self, new: NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            generic_name: new.generic_name,
            barcode: new.barcode,
            sku: new.sku,
            drug_type: new.drug_type,
            base_unit: new.base_unit.unwrap_or_else(|| "Pcs".to_string()),
            sell_price: new.sell_price,
            category_id: new.category_id,
            created_at: now,
            updated_at: now,
        };

        debug!(name = %product.name, initial_stock = new.initial_stock, "Creating product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, generic_name, barcode, sku, drug_type, base_unit,
                sell_price, category_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.generic_name)
        .bind(&product.barcode)
        .bind(&product.sku)
        .bind(&product.drug_type)
        .bind(&product.base_unit)
        .bind(product.sell_price)
        .bind(&product.category_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        if new.initial_stock > 0 {
            let batch = ProductBatch {
                id: Uuid::new_v4().to_string(),
                product_id: product.id.clone(),
                batch_number: format!("INITIAL-{}", now.timestamp_millis()),
                stock: new.initial_stock,
                buy_price: 0,
                expiry_date: None,
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO product_batches (
                    id, product_id, batch_number, stock, buy_price, expiry_date, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&batch.id)
            .bind(&batch.product_id)
            .bind(&batch.batch_number)
            .bind(batch.stock)
            .bind(batch.buy_price)
            .bind(batch.expiry_date)
            .bind(batch.created_at)
            .execute(&mut *tx)
            .await?;

            // First movement of a fresh product: snapshot equals the stock
            ledger::record_movement(
                &mut *tx,
                &StockLedgerEntry {
                    id: Uuid::new_v4().to_string(),
                    entry_type: LedgerEntryType::Restock,
                    quantity: new.initial_stock,
                    balance_snapshot: new.initial_stock,
                    notes: Some(format!("Initial batch {}", batch.batch_number)),
                    product_id: product.id.clone(),
                    batch_id: Some(batch.id.clone()),
                    created_at: now,
                },
            )
            .await?;
        }

        tx.commit().await?;

        Ok(product)
    }

    /// Inserts a batch directly (restocking, seeding, tests).
    pub async fn insert_batch(&self, batch: &ProductBatch) -> DbResult<()> {
        debug!(
            product_id = %batch.product_id,
            batch_number = %batch.batch_number,
            stock = batch.stock,
            "Inserting batch"
        );

        sqlx::query(
            r#"
            INSERT INTO product_batches (
                id, product_id, batch_number, stock, buy_price, expiry_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&batch.id)
        .bind(&batch.product_id)
        .bind(&batch.batch_number)
        .bind(batch.stock)
        .bind(batch.buy_price)
        .bind(batch.expiry_date)
        .bind(batch.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn new_product(name: &str, initial_stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            generic_name: None,
            barcode: None,
            sku: None,
            drug_type: None,
            base_unit: None,
            sell_price: 5000,
            category_id: None,
            initial_stock,
        }
    }

    #[tokio::test]
    async fn test_create_with_stock_yields_one_batch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = repo.create(new_product("Paracetamol 500mg", 50)).await.unwrap();

        let batches = repo.get_batches(&product.id).await.unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].stock, 50);
        assert!(batches[0].batch_number.starts_with("INITIAL-"));

        // Restock ledger entry with snapshot
        let entries = db.ledger().list_for_product(&product.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].quantity, 50);
        assert_eq!(entries[0].balance_snapshot, 50);
        assert_eq!(entries[0].entry_type, LedgerEntryType::Restock);
    }

    #[tokio::test]
    async fn test_create_without_stock_yields_no_batch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = repo.create(new_product("Thermometer", 0)).await.unwrap();

        assert!(repo.get_batches(&product.id).await.unwrap().is_empty());
        assert_eq!(db.ledger().count_for_product(&product.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_with_stock_sums_batches() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = repo.create(new_product("Amoxicillin 500mg", 10)).await.unwrap();
        repo.insert_batch(&ProductBatch {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            batch_number: "AMX-2026-01".to_string(),
            stock: 25,
            buy_price: 8000,
            expiry_date: None,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

        let empty = repo.create(new_product("Masker Medis", 0)).await.unwrap();

        let listed = repo.list_with_stock().await.unwrap();
        assert_eq!(listed.len(), 2);

        let amox = listed.iter().find(|p| p.product.id == product.id).unwrap();
        assert_eq!(amox.total_stock, 35);
        assert_eq!(amox.batches.len(), 2);

        let mask = listed.iter().find(|p| p.product.id == empty.id).unwrap();
        assert_eq!(mask.total_stock, 0);
        assert!(mask.batches.is_empty());
    }

    #[tokio::test]
    async fn test_list_embeds_category() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category = db.categories().insert("Obat Keras").await.unwrap();

        let mut new = new_product("Amoxicillin 500mg", 0);
        new.category_id = Some(category.id.clone());
        db.products().create(new).await.unwrap();

        let listed = db.products().list_with_stock().await.unwrap();
        assert_eq!(listed[0].category.as_ref().unwrap().name, "Obat Keras");
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let mut first = new_product("Paracetamol 500mg", 0);
        first.sku = Some("MED-001".to_string());
        repo.create(first).await.unwrap();

        let mut second = new_product("Paracetamol Forte", 0);
        second.sku = Some("MED-001".to_string());
        let err = repo.create(second).await.unwrap_err();
        assert!(matches!(err, crate::DbError::UniqueViolation { .. }));
    }
}
