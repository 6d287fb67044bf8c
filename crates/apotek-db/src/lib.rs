//! # apotek-db: Database Layer for Apotek POS
//!
//! This crate provides database access for the Apotek POS backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Apotek POS Data Flow                           │
//! │                                                                     │
//! │  HTTP Handler (POST /transactions/sync)                             │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                   apotek-db (THIS CRATE)                    │   │
//! │  │                                                             │   │
//! │  │   ┌─────────────┐   ┌───────────────┐   ┌──────────────┐   │   │
//! │  │   │  Database   │   │  Repositories │   │  Migrations  │   │   │
//! │  │   │  (pool.rs)  │   │ (product.rs,  │   │  (embedded)  │   │   │
//! │  │   │             │◄──│  transaction, │   │              │   │   │
//! │  │   │ SqlitePool  │   │  ledger, ...) │   │ 001_init.sql │   │   │
//! │  │   └─────────────┘   └───────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite Database (WAL mode)                                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use apotek_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./apotek.db")).await?;
//! let products = db.products().list_with_stock().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::ledger::StockLedgerRepository;
pub use repository::product::{NewProduct, ProductRepository, ProductWithStock};
pub use repository::transaction::{
    NewTransaction, NewTransactionItem, OfflineTransaction, SyncOutcome, TransactionRepository,
    TransactionWithItems,
};
