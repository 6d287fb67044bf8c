//! Transaction endpoints.
//!
//! Two write paths share one stock pipeline:
//!
//! - `POST /transactions` is a direct (online) sale. The server mints the
//!   id and timestamps it.
//! - `POST /transactions/sync` uploads a sale recorded offline. The
//!   client's UUID becomes the primary key, which makes replays free:
//!   a second upload of the same sale answers `200 {"message": "Already
//!   synced"}` without touching stock.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::info;

use apotek_core::{validation, Transaction, MAX_TRANSACTION_ITEMS};
use apotek_db::{
    NewTransaction, NewTransactionItem, OfflineTransaction, SyncOutcome, TransactionWithItems,
};

use crate::error::ApiError;
use crate::AppState;

/// `GET /transactions`
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<TransactionWithItems>>, ApiError> {
    let transactions = state.db.transactions().list_with_items().await?;
    Ok(Json(transactions))
}

/// `POST /transactions`
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    validation::validate_amount("total", req.total)?;
    validate_items(&req.items)?;

    let transaction = state.db.transactions().create(req).await?;

    info!(id = %transaction.id, total = transaction.total, "Sale recorded");

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// `POST /transactions/sync`
pub async fn sync(
    State(state): State<AppState>,
    Json(req): Json<OfflineTransaction>,
) -> Result<Response, ApiError> {
    validation::validate_entity_id("id", &req.id)?;
    validation::validate_amount("total", req.total)?;
    validate_items(&req.items)?;

    match state.db.transactions().sync(req).await? {
        SyncOutcome::AlreadySynced { id } => {
            Ok((
                StatusCode::OK,
                Json(json!({ "message": "Already synced", "id": id })),
            )
                .into_response())
        }
        SyncOutcome::Created(transaction) => {
            info!(id = %transaction.id, total = transaction.total, "Offline sale synced");
            Ok((StatusCode::CREATED, Json(transaction)).into_response())
        }
    }
}

/// Item-level checks shared by both write paths.
fn validate_items(items: &[NewTransactionItem]) -> Result<(), ApiError> {
    if items.is_empty() {
        return Err(ApiError::InvalidRequest(
            "Transaction must contain at least one item".to_string(),
        ));
    }

    if items.len() > MAX_TRANSACTION_ITEMS {
        return Err(ApiError::InvalidRequest(format!(
            "Transaction exceeds the maximum of {MAX_TRANSACTION_ITEMS} items"
        )));
    }

    for item in items {
        validation::validate_quantity("totalBaseQty", item.total_base_qty)?;
        validation::validate_amount("price", item.price)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(qty: i64) -> NewTransactionItem {
        NewTransactionItem {
            product_id: "p-1".to_string(),
            batch_id: None,
            unit_name: "Strip".to_string(),
            quantity: qty,
            conversion_factor: 1,
            total_base_qty: qty,
            price: 5000,
        }
    }

    #[test]
    fn test_empty_items_rejected() {
        assert!(validate_items(&[]).is_err());
    }

    #[test]
    fn test_too_many_items_rejected() {
        let items: Vec<_> = (0..=MAX_TRANSACTION_ITEMS as i64).map(item).collect();
        assert!(validate_items(&items).is_err());
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        assert!(validate_items(&[item(0)]).is_err());
        assert!(validate_items(&[item(-2)]).is_err());
        assert!(validate_items(&[item(3)]).is_ok());
    }
}
