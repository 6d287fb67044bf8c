//! # Repository Module
//!
//! Database repository implementations for Apotek POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                               │
//! │                                                                     │
//! │  HTTP Handler                                                       │
//! │       │                                                             │
//! │       │  db.products().list_with_stock()                            │
//! │       ▼                                                             │
//! │  ProductRepository                                                  │
//! │  ├── list_with_stock(&self)                                         │
//! │  ├── create(&self, new_product)                                     │
//! │  └── get_batches(&self, product_id)                                 │
//! │       │                                                             │
//! │       │  SQL Query                                                  │
//! │       ▼                                                             │
//! │  SQLite Database                                                    │
//! │                                                                     │
//! │  Benefits:                                                          │
//! │  • Clean separation of concerns                                     │
//! │  • SQL is isolated in one place                                     │
//! │  • Easy to test against an in-memory database                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Products, batches, stock totals
//! - [`transaction::TransactionRepository`] - Direct sales and offline sync
//! - [`ledger::StockLedgerRepository`] - Stock movement audit trail
//! - [`category::CategoryRepository`] - Product categories

pub mod category;
pub mod ledger;
pub mod product;
pub mod transaction;
