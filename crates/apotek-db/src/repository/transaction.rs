//! # Transaction Repository
//!
//! Database operations for sales: the direct (online) path and the
//! offline-to-online sync path.
//!
//! ## Sync Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                Offline Sync, One Database Transaction               │
//! │                                                                     │
//! │  POST /transactions/sync { id, items, ... }                         │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  BEGIN                                                              │
//! │    INSERT transaction header (client id becomes the primary key)    │
//! │       ├─UNIQUE conflict─► ROLLBACK, "Already synced" (no writes)    │
//! │       ▼                                                             │
//! │    for each item:                                                   │
//! │      1. load the product's batches (FEFO order)                     │
//! │      2. allocate: client's batch first, FEFO for the rest           │
//! │      3. guarded decrement per batch (stock >= take)                 │
//! │      4. ledger row per touched batch, snapshot = post-move total    │
//! │      5. INSERT transaction item                                     │
//! │  COMMIT ◄── any failing item rolls the whole sale back              │
//! │                                                                     │
//! │  Idempotency is real because the client UUID is the primary key:    │
//! │  a replayed or concurrently re-uploaded sale conflicts on the       │
//! │  header insert and writes nothing.                                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The direct path (`POST /transactions`) runs the same item pipeline;
//! the only differences are a server-minted id and a server-side date.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use apotek_core::{
    allocate, CoreError, LedgerEntryType, PaymentMethod, ProductBatch, StockLedgerEntry,
    Transaction, TransactionItem,
};

use crate::error::{DbError, DbResult};
use crate::repository::ledger;

// =============================================================================
// Write Models
// =============================================================================

/// One line of an incoming sale.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransactionItem {
    pub product_id: String,
    /// The batch the client sold from, when it knows one. Unknown or
    /// missing ids fall back to FEFO allocation.
    pub batch_id: Option<String>,
    pub unit_name: String,
    pub quantity: i64,
    pub conversion_factor: i64,
    pub total_base_qty: i64,
    pub price: i64,
}

/// A direct (online) sale. The server mints the id and timestamps it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub total: i64,
    pub payment_method: PaymentMethod,
    pub user_id: Option<String>,
    pub items: Vec<NewTransactionItem>,
}

/// A sale recorded on an offline device, now being synced up.
/// `id` and `date` come from the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineTransaction {
    pub id: String,
    pub total: i64,
    pub payment_method: PaymentMethod,
    pub user_id: Option<String>,
    pub date: DateTime<Utc>,
    pub items: Vec<NewTransactionItem>,
}

/// Result of a sync attempt.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// The transaction id already exists server-side; nothing was written.
    AlreadySynced { id: String },
    /// The sale was created and stock deducted.
    Created(Transaction),
}

// =============================================================================
// Read Model
// =============================================================================

/// A transaction with its line items, as `GET /transactions` returns it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionWithItems {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale transactions.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Gets a transaction by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(
            "SELECT id, total, payment_method, user_id, date FROM transactions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Lists all transactions with their items, newest first.
    pub async fn list_with_items(&self) -> DbResult<Vec<TransactionWithItems>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT id, total, payment_method, user_id, date FROM transactions ORDER BY date DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT id, transaction_id, product_id, batch_id, unit_name,
                   quantity, conversion_factor, total_base_qty, price
            FROM transaction_items
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_transaction: HashMap<String, Vec<TransactionItem>> = HashMap::new();
        for item in items {
            items_by_transaction
                .entry(item.transaction_id.clone())
                .or_default()
                .push(item);
        }

        let result = transactions
            .into_iter()
            .map(|transaction| {
                let items = items_by_transaction
                    .remove(&transaction.id)
                    .unwrap_or_default();
                TransactionWithItems { transaction, items }
            })
            .collect();

        Ok(result)
    }

    /// Creates a direct (online) sale: header, FEFO stock deduction,
    /// ledger rows and item rows, in one database transaction.
    pub async fn create(&self, new: NewTransaction) -> DbResult<Transaction> {
        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            total: new.total,
            payment_method: new.payment_method,
            user_id: new.user_id,
            date: Utc::now(),
        };

        debug!(id = %transaction.id, items = new.items.len(), "Creating sale");

        let mut tx = self.pool.begin().await?;
        insert_header(&mut tx, &transaction).await?;
        for item in &new.items {
            apply_sale_item(&mut tx, &transaction.id, item, "Sale").await?;
        }
        tx.commit().await?;

        Ok(transaction)
    }

    /// Syncs an offline sale.
    ///
    /// The client id becomes the server-side primary key, so the header
    /// insert itself is the idempotency check: a replayed or concurrently
    /// re-uploaded sale conflicts there, the database transaction rolls
    /// back, and [`SyncOutcome::AlreadySynced`] comes back with nothing
    /// written. Otherwise the sale is applied like a direct one, except
    /// the client's batch hints and timestamp are honored.
    pub async fn sync(&self, offline: OfflineTransaction) -> DbResult<SyncOutcome> {
        let transaction = Transaction {
            id: offline.id,
            total: offline.total,
            payment_method: offline.payment_method,
            user_id: offline.user_id,
            date: offline.date,
        };

        debug!(id = %transaction.id, items = offline.items.len(), "Syncing offline sale");

        let mut tx = self.pool.begin().await?;
        match insert_header(&mut tx, &transaction).await {
            Err(DbError::UniqueViolation { field }) if field.contains("transactions.id") => {
                tx.rollback().await?;
                debug!(id = %transaction.id, "Transaction already synced");
                return Ok(SyncOutcome::AlreadySynced { id: transaction.id });
            }
            result => result?,
        }
        for item in &offline.items {
            apply_sale_item(&mut tx, &transaction.id, item, "Synced Tx").await?;
        }
        tx.commit().await?;

        Ok(SyncOutcome::Created(transaction))
    }
}

// =============================================================================
// Shared Sale Pipeline
// =============================================================================

async fn insert_header(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    transaction: &Transaction,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO transactions (id, total, payment_method, user_id, date)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&transaction.id)
    .bind(transaction.total)
    .bind(transaction.payment_method)
    .bind(&transaction.user_id)
    .bind(transaction.date)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Applies one sold line inside the enclosing database transaction:
/// allocation, guarded batch decrements, ledger rows, item row.
async fn apply_sale_item(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    transaction_id: &str,
    item: &NewTransactionItem,
    notes_prefix: &str,
) -> DbResult<()> {
    let product_exists: Option<String> =
        sqlx::query_scalar("SELECT id FROM products WHERE id = ?1")
            .bind(&item.product_id)
            .fetch_optional(&mut **tx)
            .await?;
    if product_exists.is_none() {
        return Err(CoreError::ProductNotFound(item.product_id.clone()).into());
    }

    let batches = sqlx::query_as::<_, ProductBatch>(
        r#"
        SELECT id, product_id, batch_number, stock, buy_price, expiry_date, created_at
        FROM product_batches
        WHERE product_id = ?1
        ORDER BY expiry_date IS NULL, expiry_date, created_at
        "#,
    )
    .bind(&item.product_id)
    .fetch_all(&mut **tx)
    .await?;

    let plan = allocate(
        &item.product_id,
        &batches,
        item.total_base_qty,
        item.batch_id.as_deref(),
    )?;

    let now = Utc::now();

    for slice in &plan {
        // Guarded decrement: a concurrent sale that drained the batch
        // first makes rows_affected 0, and the whole sale rolls back.
        let result = sqlx::query(
            "UPDATE product_batches SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2",
        )
        .bind(&slice.batch_id)
        .bind(slice.quantity)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            let available: i64 = sqlx::query_scalar(
                "SELECT COALESCE(SUM(stock), 0) FROM product_batches WHERE product_id = ?1",
            )
            .bind(&item.product_id)
            .fetch_one(&mut **tx)
            .await?;

            return Err(CoreError::InsufficientStock {
                product_id: item.product_id.clone(),
                available,
                requested: item.total_base_qty,
            }
            .into());
        }

        let balance_snapshot: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(stock), 0) FROM product_batches WHERE product_id = ?1",
        )
        .bind(&item.product_id)
        .fetch_one(&mut **tx)
        .await?;

        ledger::record_movement(
            &mut **tx,
            &StockLedgerEntry {
                id: Uuid::new_v4().to_string(),
                entry_type: LedgerEntryType::Sale,
                quantity: -slice.quantity,
                balance_snapshot,
                notes: Some(format!("{notes_prefix} #{transaction_id}")),
                product_id: item.product_id.clone(),
                batch_id: Some(slice.batch_id.clone()),
                created_at: now,
            },
        )
        .await?;
    }

    // The item row records the batch the sale primarily drew from
    let primary_batch = &plan[0].batch_id;

    sqlx::query(
        r#"
        INSERT INTO transaction_items (
            id, transaction_id, product_id, batch_id, unit_name,
            quantity, conversion_factor, total_base_qty, price
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(transaction_id)
    .bind(&item.product_id)
    .bind(primary_batch)
    .bind(&item.unit_name)
    .bind(item.quantity)
    .bind(item.conversion_factor)
    .bind(item.total_base_qty)
    .bind(item.price)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::NewProduct;
    use crate::DbError;
    use chrono::NaiveDate;

    async fn seed_product(db: &Database, name: &str, stock: i64) -> String {
        db.products()
            .create(NewProduct {
                name: name.to_string(),
                generic_name: None,
                barcode: None,
                sku: None,
                drug_type: None,
                base_unit: None,
                sell_price: 5000,
                category_id: None,
                initial_stock: stock,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_batch(
        db: &Database,
        product_id: &str,
        batch_number: &str,
        stock: i64,
        expiry: Option<NaiveDate>,
    ) -> String {
        let batch = ProductBatch {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            batch_number: batch_number.to_string(),
            stock,
            buy_price: 3000,
            expiry_date: expiry,
            created_at: Utc::now(),
        };
        db.products().insert_batch(&batch).await.unwrap();
        batch.id
    }

    fn item(product_id: &str, batch_id: Option<&str>, qty: i64) -> NewTransactionItem {
        NewTransactionItem {
            product_id: product_id.to_string(),
            batch_id: batch_id.map(str::to_string),
            unit_name: "Strip".to_string(),
            quantity: qty,
            conversion_factor: 1,
            total_base_qty: qty,
            price: qty * 5000,
        }
    }

    fn offline(id: &str, items: Vec<NewTransactionItem>) -> OfflineTransaction {
        OfflineTransaction {
            id: id.to_string(),
            total: items.iter().map(|i| i.price).sum(),
            payment_method: PaymentMethod::Cash,
            user_id: Some("kasir-1".to_string()),
            date: Utc::now(),
            items,
        }
    }

    #[tokio::test]
    async fn test_sync_decrements_referenced_batch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = seed_product(&db, "Paracetamol 500mg", 0).await;
        let batch_id = seed_batch(&db, &product_id, "PCT-01", 40, None).await;

        let sale_id = Uuid::new_v4().to_string();
        let outcome = db
            .transactions()
            .sync(offline(&sale_id, vec![item(&product_id, Some(&batch_id), 15)]))
            .await
            .unwrap();

        assert!(matches!(outcome, SyncOutcome::Created(_)));

        let batches = db.products().get_batches(&product_id).await.unwrap();
        assert_eq!(batches[0].stock, 25);

        // Exactly one ledger row and one item row for a single-batch item
        let entries = db.ledger().list_for_product(&product_id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].quantity, -15);
        assert_eq!(entries[0].balance_snapshot, 25);
        assert_eq!(entries[0].batch_id.as_deref(), Some(batch_id.as_str()));

        let listed = db.transactions().list_with_items().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].transaction.id, sale_id);
        assert_eq!(listed[0].items.len(), 1);
        assert_eq!(listed[0].items[0].total_base_qty, 15);
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = seed_product(&db, "Paracetamol 500mg", 0).await;
        let batch_id = seed_batch(&db, &product_id, "PCT-01", 40, None).await;

        let sale_id = Uuid::new_v4().to_string();
        let make = || offline(&sale_id, vec![item(&product_id, Some(&batch_id), 10)]);

        db.transactions().sync(make()).await.unwrap();
        let replay = db.transactions().sync(make()).await.unwrap();

        match replay {
            SyncOutcome::AlreadySynced { id } => assert_eq!(id, sale_id),
            other => panic!("expected AlreadySynced, got {other:?}"),
        }

        // No further writes: stock deducted once, one ledger row
        let batches = db.products().get_batches(&product_id).await.unwrap();
        assert_eq!(batches[0].stock, 30);
        assert_eq!(db.ledger().count_for_product(&product_id).await.unwrap(), 1);
        assert_eq!(db.transactions().list_with_items().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sync_losing_duplicate_race_writes_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = seed_product(&db, "Paracetamol 500mg", 0).await;
        let batch_id = seed_batch(&db, &product_id, "PCT-01", 40, None).await;

        // A header with the client id is already committed, as if a
        // concurrent upload of the same sale won the race
        let sale_id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO transactions (id, total, payment_method, user_id, date) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&sale_id)
        .bind(50000_i64)
        .bind(PaymentMethod::Cash)
        .bind(Option::<String>::None)
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        let outcome = db
            .transactions()
            .sync(offline(&sale_id, vec![item(&product_id, Some(&batch_id), 10)]))
            .await
            .unwrap();

        match outcome {
            SyncOutcome::AlreadySynced { id } => assert_eq!(id, sale_id),
            other => panic!("expected AlreadySynced, got {other:?}"),
        }

        // The losing upload deducted nothing and left no ledger rows
        let batches = db.products().get_batches(&product_id).await.unwrap();
        assert_eq!(batches[0].stock, 40);
        assert_eq!(db.ledger().count_for_product(&product_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sync_unknown_batch_falls_back_to_fefo() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = seed_product(&db, "Amoxicillin 500mg", 0).await;
        let early = seed_batch(
            &db,
            &product_id,
            "AMX-EARLY",
            20,
            NaiveDate::from_ymd_opt(2026, 10, 1),
        )
        .await;
        seed_batch(
            &db,
            &product_id,
            "AMX-LATE",
            20,
            NaiveDate::from_ymd_opt(2027, 10, 1),
        )
        .await;

        // Client batch id that only ever existed in the device's local store
        let outcome = db
            .transactions()
            .sync(offline(
                &Uuid::new_v4().to_string(),
                vec![item(&product_id, Some("local-only-batch"), 5)],
            ))
            .await
            .unwrap();
        assert!(matches!(outcome, SyncOutcome::Created(_)));

        // FEFO: the earliest-expiring batch got drained
        let batches = db.products().get_batches(&product_id).await.unwrap();
        let early_batch = batches.iter().find(|b| b.id == early).unwrap();
        assert_eq!(early_batch.stock, 15);
    }

    #[tokio::test]
    async fn test_sync_insufficient_stock_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = seed_product(&db, "Vitamin C 1000mg", 0).await;
        let batch_id = seed_batch(&db, &product_id, "VTC-01", 3, None).await;

        let err = db
            .transactions()
            .sync(offline(
                &Uuid::new_v4().to_string(),
                vec![item(&product_id, Some(&batch_id), 5)],
            ))
            .await
            .unwrap_err();

        match err {
            DbError::Domain(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Nothing written: stock untouched, no header, no ledger rows
        let batches = db.products().get_batches(&product_id).await.unwrap();
        assert_eq!(batches[0].stock, 3);
        assert!(db.transactions().list_with_items().await.unwrap().is_empty());
        assert_eq!(db.ledger().count_for_product(&product_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sync_multi_item_failure_aborts_whole_sale() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p1 = seed_product(&db, "Paracetamol 500mg", 50).await;
        let p2 = seed_product(&db, "Amoxicillin 500mg", 2).await;

        let err = db
            .transactions()
            .sync(offline(
                &Uuid::new_v4().to_string(),
                vec![item(&p1, None, 10), item(&p2, None, 5)],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock { .. })));

        // The first item's deduction was rolled back too
        let batches = db.products().get_batches(&p1).await.unwrap();
        assert_eq!(batches[0].stock, 50);
        assert!(db.transactions().list_with_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sync_unknown_product_fails() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db
            .transactions()
            .sync(offline(
                &Uuid::new_v4().to_string(),
                vec![item("no-such-product", None, 1)],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_direct_sale_deducts_fefo() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = seed_product(&db, "Paracetamol 500mg", 0).await;
        let early = seed_batch(
            &db,
            &product_id,
            "PCT-EARLY",
            10,
            NaiveDate::from_ymd_opt(2026, 6, 1),
        )
        .await;
        let late = seed_batch(
            &db,
            &product_id,
            "PCT-LATE",
            30,
            NaiveDate::from_ymd_opt(2027, 6, 1),
        )
        .await;

        let created = db
            .transactions()
            .create(NewTransaction {
                total: 75000,
                payment_method: PaymentMethod::Qris,
                user_id: None,
                items: vec![item(&product_id, None, 15)],
            })
            .await
            .unwrap();

        // 10 from the early batch, 5 from the late one
        let batches = db.products().get_batches(&product_id).await.unwrap();
        let early_stock = batches.iter().find(|b| b.id == early).unwrap().stock;
        let late_stock = batches.iter().find(|b| b.id == late).unwrap().stock;
        assert_eq!(early_stock, 0);
        assert_eq!(late_stock, 25);

        // Two ledger rows, one per touched batch
        let entries = db.ledger().list_for_product(&product_id).await.unwrap();
        assert_eq!(entries.len(), 2);
        let snapshots: Vec<i64> = entries.iter().map(|e| e.balance_snapshot).collect();
        assert!(snapshots.contains(&30) && snapshots.contains(&25));

        let fetched = db.transactions().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.total, 75000);
        assert_eq!(fetched.payment_method, PaymentMethod::Qris);
    }

    #[tokio::test]
    async fn test_list_orders_by_date_descending() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product_id = seed_product(&db, "Paracetamol 500mg", 100).await;

        let mut older = offline(
            &Uuid::new_v4().to_string(),
            vec![item(&product_id, None, 1)],
        );
        older.date = Utc::now() - chrono::Duration::hours(2);
        let older_id = older.id.clone();
        db.transactions().sync(older).await.unwrap();

        let newer = offline(
            &Uuid::new_v4().to_string(),
            vec![item(&product_id, None, 1)],
        );
        let newer_id = newer.id.clone();
        db.transactions().sync(newer).await.unwrap();

        let listed = db.transactions().list_with_items().await.unwrap();
        assert_eq!(listed[0].transaction.id, newer_id);
        assert_eq!(listed[1].transaction.id, older_id);
    }
}
