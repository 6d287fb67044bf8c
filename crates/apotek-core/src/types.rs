//! # Domain Types
//!
//! Core domain types for the Apotek POS backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌───────────────┐   ┌────────────────┐   ┌──────────────────┐     │
//! │  │   Product     │──►│  ProductBatch  │──►│ StockLedgerEntry │     │
//! │  │ ───────────── │   │ ────────────── │   │ ──────────────── │     │
//! │  │ id (UUID)     │   │ id (UUID)      │   │ entry_type       │     │
//! │  │ sku, barcode  │   │ batch_number   │   │ quantity (±)     │     │
//! │  │ sell_price    │   │ stock          │   │ balance_snapshot │     │
//! │  └───────────────┘   │ expiry_date    │   └──────────────────┘     │
//! │                      └────────────────┘                             │
//! │                                                                     │
//! │  ┌───────────────┐   ┌──────────────────┐                          │
//! │  │ Transaction   │──►│ TransactionItem  │                          │
//! │  │ ───────────── │   │ ──────────────── │                          │
//! │  │ id (UUID)     │   │ batch_id         │                          │
//! │  │ total         │   │ total_base_qty   │                          │
//! │  │ payment_method│   │ conversion_factor│                          │
//! │  └───────────────┘   └──────────────────┘                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity carries a UUID v4 string id. Offline devices mint their own
//! ids without coordination; the sync path keeps the client id as the
//! server-side primary key, which is what makes the idempotency check real.
//!
//! ## Wire Format
//! JSON fields are camelCase to match the frontend the original backend
//! serves; database columns stay snake_case.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Debit/credit card on an external terminal.
    Card,
    /// QRIS payment (Indonesian national QR standard).
    Qris,
    /// Bank transfer.
    Transfer,
}

// =============================================================================
// Ledger Entry Type
// =============================================================================

/// Classification of a stock movement in the ledger.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryType {
    /// Stock left the shelf through a sale (quantity is negative).
    Sale,
    /// Stock arrived, e.g. the initial batch of a new product.
    Restock,
    /// Manual correction (stock opname).
    Adjustment,
}

// =============================================================================
// Category
// =============================================================================

/// A product category (e.g. "Obat Bebas", "Vitamin & Suplemen").
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Stock is never stored on the product itself: it is always the sum of the
/// product's batch stock, computed at read time.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, e.g. "Paracetamol 500mg".
    pub name: String,

    /// Generic (INN) name, e.g. "Paracetamol".
    pub generic_name: Option<String>,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Stock Keeping Unit - business identifier.
    pub sku: Option<String>,

    /// Dosage form, e.g. "Tablet", "Sirup", "Kaplet".
    pub drug_type: Option<String>,

    /// Smallest sellable unit, e.g. "Strip", "Pcs".
    pub base_unit: String,

    /// Selling price per base unit, integer rupiah.
    pub sell_price: i64,

    /// Owning category, if any.
    pub category_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product Batch
// =============================================================================

/// A discrete purchase lot of a product.
///
/// Batches are what make FEFO possible: each lot carries its own stock
/// count, buy price and expiry date, and sales drain the lot expiring first.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBatch {
    pub id: String,
    pub product_id: String,
    /// Supplier lot number, or `INITIAL-<millis>` for the batch created
    /// alongside a new product.
    pub batch_number: String,
    /// On-hand quantity in base units. Never negative.
    pub stock: i64,
    /// Purchase price per base unit, integer rupiah.
    pub buy_price: i64,
    /// Expiry date; `None` for non-perishables.
    pub expiry_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Transaction
// =============================================================================

/// Header of a sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// UUID v4, minted by whichever device created the sale. For offline
    /// sales this is the id the client sends up during sync.
    pub id: String,
    /// Grand total, integer rupiah.
    pub total: i64,
    pub payment_method: PaymentMethod,
    /// Cashier who rang the sale, if known.
    pub user_id: Option<String>,
    /// When the sale happened (client clock for synced sales).
    pub date: DateTime<Utc>,
}

// =============================================================================
// Transaction Item
// =============================================================================

/// One sold line of a transaction.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    /// The batch the sale was (primarily) drawn from.
    pub batch_id: String,
    /// Unit the cashier sold in, e.g. "Box", "Strip".
    pub unit_name: String,
    /// Quantity in the sold unit.
    pub quantity: i64,
    /// Base units per sold unit (Box of 10 strips → 10).
    pub conversion_factor: i64,
    /// quantity × conversion_factor, the amount deducted from stock.
    pub total_base_qty: i64,
    /// Line price, integer rupiah.
    pub price: i64,
}

// =============================================================================
// Stock Ledger
// =============================================================================

/// Audit-trail record of a single stock movement.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLedgerEntry {
    pub id: String,
    pub entry_type: LedgerEntryType,
    /// Signed movement in base units: negative for sales.
    pub quantity: i64,
    /// The product's total stock across all batches after this movement.
    pub balance_snapshot: i64,
    pub notes: Option<String>,
    pub product_id: String,
    pub batch_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
