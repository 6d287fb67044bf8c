//! # Stock Ledger Repository
//!
//! Read access to the stock movement audit trail.
//!
//! Ledger rows are *written* by the operations that move stock (product
//! creation with an initial batch, direct sales, synced sales) inside the
//! same database transaction as the movement itself, so the trail can
//! never drift from the batch table. This repository only reads the
//! trail back.

use sqlx::SqlitePool;

use apotek_core::StockLedgerEntry;

use crate::error::DbResult;

/// Writes one ledger row. Crate-internal: callers are expected to pass the
/// executor of the enclosing database transaction.
pub(crate) async fn record_movement<'e, E>(executor: E, entry: &StockLedgerEntry) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO stock_ledger (
            id, entry_type, quantity, balance_snapshot, notes,
            product_id, batch_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&entry.id)
    .bind(entry.entry_type)
    .bind(entry.quantity)
    .bind(entry.balance_snapshot)
    .bind(&entry.notes)
    .bind(&entry.product_id)
    .bind(&entry.batch_id)
    .bind(entry.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Repository for stock ledger queries.
#[derive(Debug, Clone)]
pub struct StockLedgerRepository {
    pool: SqlitePool,
}

impl StockLedgerRepository {
    /// Creates a new StockLedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedgerRepository { pool }
    }

    /// Lists all movements for a product, newest first.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<StockLedgerEntry>> {
        let entries = sqlx::query_as::<_, StockLedgerEntry>(
            r#"
            SELECT id, entry_type, quantity, balance_snapshot, notes,
                   product_id, batch_id, created_at
            FROM stock_ledger
            WHERE product_id = ?1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Counts ledger rows for a product (for diagnostics and tests).
    pub async fn count_for_product(&self, product_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_ledger WHERE product_id = ?1")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
