//! # Stock Arithmetic
//!
//! Pure stock computations: total-stock summation and FEFO batch allocation.
//!
//! ## FEFO Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 First-Expired-First-Out Allocation                  │
//! │                                                                     │
//! │  Request: 25 base units of Paracetamol                              │
//! │                                                                     │
//! │  Batches (ordered by expiry):                                       │
//! │  ┌──────────┬─────────┬────────┐                                    │
//! │  │ B-2024-03│ exp 3/24│ qty 10 │ ── take 10 ──┐                     │
//! │  │ B-2024-07│ exp 7/24│ qty 20 │ ── take 15 ──┼── plan: 10+15 = 25  │
//! │  │ B-NOEXP  │ (none)  │ qty 50 │    untouched │                     │
//! │  └──────────┴─────────┴────────┘              │                     │
//! │                                               ▼                     │
//! │  [(B-2024-03, 10), (B-2024-07, 15)]                                 │
//! │                                                                     │
//! │  A preferred batch (the one an offline client sold from) jumps      │
//! │  the queue: it drains first, then FEFO covers the remainder.        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The allocator only produces a *plan*. Applying it (guarded SQL
//! decrements inside a database transaction) is apotek-db's job.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::ProductBatch;

// =============================================================================
// Total Stock
// =============================================================================

/// Computes a product's total stock: the sum of its batches' stock.
///
/// Zero batches means zero stock. O(batches).
///
/// ## Example
/// ```rust,ignore
/// let total = total_stock(&batches);
/// ```
pub fn total_stock(batches: &[ProductBatch]) -> i64 {
    batches.iter().map(|b| b.stock).sum()
}

// =============================================================================
// Allocation
// =============================================================================

/// One slice of an allocation plan: take `quantity` from `batch_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchAllocation {
    pub batch_id: String,
    pub quantity: i64,
}

/// Builds a FEFO allocation plan covering `requested` base units.
///
/// ## Ordering
/// 1. The preferred batch, when given and present in `batches`. This is
///    how offline sync honors the batch the client actually sold from.
/// 2. Remaining batches by expiry date ascending; batches without an
///    expiry date go last.
/// 3. Ties broken by creation time (oldest lot first).
///
/// Empty batches are skipped. Returns `InsufficientStock` when the
/// product-wide total cannot cover the request; the caller then rolls the
/// whole sale back.
///
/// ## Errors
/// - `Validation(MustBePositive)` for `requested <= 0`
/// - `InsufficientStock` when `total_stock(batches) < requested`
pub fn allocate(
    product_id: &str,
    batches: &[ProductBatch],
    requested: i64,
    preferred_batch: Option<&str>,
) -> CoreResult<Vec<BatchAllocation>> {
    if requested <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "totalBaseQty".to_string(),
        }
        .into());
    }

    let available = total_stock(batches);
    if available < requested {
        return Err(CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            available,
            requested,
        });
    }

    let mut ordered: Vec<&ProductBatch> = batches.iter().filter(|b| b.stock > 0).collect();
    ordered.sort_by(|a, b| {
        let a_preferred = preferred_batch == Some(a.id.as_str());
        let b_preferred = preferred_batch == Some(b.id.as_str());
        b_preferred
            .cmp(&a_preferred)
            .then_with(|| match (a.expiry_date, b.expiry_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
            .then_with(|| a.created_at.cmp(&b.created_at))
    });

    let mut plan = Vec::new();
    let mut remaining = requested;

    for batch in ordered {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(batch.stock);
        plan.push(BatchAllocation {
            batch_id: batch.id.clone(),
            quantity: take,
        });
        remaining -= take;
    }

    // available >= requested was checked up front, so the plan is complete
    debug_assert_eq!(remaining, 0);

    Ok(plan)
}

// =============================================================================
// Unit Tests
// =============================================================================
