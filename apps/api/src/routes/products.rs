//! Product endpoints.
//!
//! `GET /products` returns every product with its category, batches and
//! computed `totalStock`. `POST /products` creates a product; a positive
//! `stock` in the request materializes as one initial batch.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use apotek_core::{validation, Product};
use apotek_db::{NewProduct, ProductWithStock};

use crate::error::ApiError;
use crate::AppState;

/// Wire shape for creating a product. `price` is the selling price per
/// base unit (integer rupiah); `stock` is the optional opening stock.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub stock: i64,
    pub category_id: Option<String>,
    pub generic_name: Option<String>,
    pub barcode: Option<String>,
    pub sku: Option<String>,
    pub drug_type: Option<String>,
    pub base_unit: Option<String>,
}

/// `GET /products`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductWithStock>>, ApiError> {
    let products = state.db.products().list_with_stock().await?;
    Ok(Json(products))
}

/// `POST /products`
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    validation::validate_product_name(&req.name)?;
    validation::validate_amount("price", req.price)?;
    validation::validate_initial_stock(req.stock)?;

    let product = state
        .db
        .products()
        .create(NewProduct {
            name: req.name,
            generic_name: req.generic_name,
            barcode: req.barcode,
            sku: req.sku,
            drug_type: req.drug_type,
            base_unit: req.base_unit,
            sell_price: req.price,
            category_id: req.category_id,
            initial_stock: req.stock,
        })
        .await?;

    info!(id = %product.id, name = %product.name, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}
