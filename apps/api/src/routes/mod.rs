//! Route table for the Apotek API.

pub mod products;
pub mod transactions;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::AppState;

/// Builds the router. Paths mirror the surface the POS frontend expects.
/// CORS is wide open: the API serves a browser frontend and carries no
/// cookie-based auth.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/products", get(products::list).post(products::create))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/sync", post(transactions::sync))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health probe.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
