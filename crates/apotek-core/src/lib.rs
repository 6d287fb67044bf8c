//! # apotek-core: Pure Business Logic for Apotek POS
//!
//! This crate is the heart of the Apotek POS backend. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Apotek POS Architecture                         │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                    REST API (apps/api)                      │   │
//! │  │    GET /products ── POST /transactions ── POST /sync        │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │             ★ apotek-core (THIS CRATE) ★                    │   │
//! │  │                                                             │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐             │   │
//! │  │   │   types   │  │   stock   │  │ validation │             │   │
//! │  │   │  Product  │  │   FEFO    │  │   rules    │             │   │
//! │  │   │   Batch   │  │ total sum │  │   checks   │             │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘             │   │
//! │  │                                                             │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │                 apotek-db (Database Layer)                  │   │
//! │  │           SQLite queries, migrations, repositories          │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, ProductBatch, Transaction, etc.)
//! - [`stock`] - Stock arithmetic: total-stock summation and FEFO allocation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All amounts are integer rupiah (i64), never floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use stock::{allocate, total_stock, BatchAllocation};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum items allowed in a single transaction.
///
/// ## Business Reason
/// Prevents runaway carts and keeps sync payloads bounded.
pub const MAX_TRANSACTION_ITEMS: usize = 100;

/// Maximum base quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g. typing 10000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 9999;
