//! # Apotek API
//!
//! REST server for the Apotek POS backend.
//!
//! ## Endpoints
//! ```text
//! GET  /                   Health probe
//! GET  /products           Products with batches and computed totalStock
//! POST /products           Create product (+ optional initial batch)
//! GET  /transactions       Transactions with items, newest first
//! POST /transactions       Direct sale: FEFO stock deduction
//! POST /transactions/sync  Offline sale sync (idempotent on client id)
//! ```
//!
//! The crate is a library so integration tests can drive the router
//! directly through `tower::ServiceExt` without binding a socket;
//! `main.rs` is a thin binary around [`app`].

pub mod config;
pub mod error;
pub mod routes;

use apotek_db::Database;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

/// Builds the application router over the given database.
pub fn app(db: Database) -> axum::Router {
    routes::router(AppState { db })
}
