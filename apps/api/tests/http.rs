//! End-to-end tests driving the router directly over an in-memory
//! database, no TCP socket involved.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use apotek_db::{Database, DbConfig};

async fn test_app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    apotek_api::app(db)
}

async fn request(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

fn product_body(name: &str, stock: i64) -> Value {
    json!({ "name": name, "price": 5000, "stock": stock })
}

fn sale_item(product_id: &str, qty: i64) -> Value {
    json!({
        "productId": product_id,
        "unitName": "Strip",
        "quantity": qty,
        "conversionFactor": 1,
        "totalBaseQty": qty,
        "price": qty * 5000,
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;
    let (status, body) = request(&app, Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_cross_origin_requests_allowed() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/products")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap()),
        Some("*")
    );
}

#[tokio::test]
async fn test_create_product_then_list_with_stock() {
    let app = test_app().await;

    let (status, created) = request(
        &app,
        Method::POST,
        "/products",
        Some(product_body("Paracetamol 500mg", 50)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Paracetamol 500mg");
    assert_eq!(created["sellPrice"], 5000);

    let (status, listed) = request(&app, Method::GET, "/products", None).await;
    assert_eq!(status, StatusCode::OK);

    let products = listed.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["totalStock"], 50);
    assert_eq!(products[0]["batches"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_product_rejects_empty_name() {
    let app = test_app().await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/products",
        Some(product_body("   ", 0)),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_direct_sale_deducts_stock() {
    let app = test_app().await;

    let (_, product) = request(
        &app,
        Method::POST,
        "/products",
        Some(product_body("Amoxicillin 500mg", 30)),
    )
    .await;
    let product_id = product["id"].as_str().unwrap();

    let (status, sale) = request(
        &app,
        Method::POST,
        "/transactions",
        Some(json!({
            "total": 50000,
            "paymentMethod": "cash",
            "items": [sale_item(product_id, 10)],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sale["total"], 50000);
    assert_eq!(sale["paymentMethod"], "cash");

    let (_, listed) = request(&app, Method::GET, "/products", None).await;
    assert_eq!(listed[0]["totalStock"], 20);

    let (status, transactions) = request(&app, Method::GET, "/transactions", None).await;
    assert_eq!(status, StatusCode::OK);
    let transactions = transactions.as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_sale_exceeding_stock_is_conflict() {
    let app = test_app().await;

    let (_, product) = request(
        &app,
        Method::POST,
        "/products",
        Some(product_body("Vitamin C 1000mg", 3)),
    )
    .await;
    let product_id = product["id"].as_str().unwrap();

    let (status, body) = request(
        &app,
        Method::POST,
        "/transactions",
        Some(json!({
            "total": 25000,
            "paymentMethod": "cash",
            "items": [sale_item(product_id, 5)],
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Insufficient"));

    // Stock untouched
    let (_, listed) = request(&app, Method::GET, "/products", None).await;
    assert_eq!(listed[0]["totalStock"], 3);
}

#[tokio::test]
async fn test_sale_for_unknown_product_is_not_found() {
    let app = test_app().await;

    let (status, _) = request(
        &app,
        Method::POST,
        "/transactions",
        Some(json!({
            "total": 5000,
            "paymentMethod": "cash",
            "items": [sale_item(&Uuid::new_v4().to_string(), 1)],
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sale_with_no_items_is_rejected() {
    let app = test_app().await;

    let (status, _) = request(
        &app,
        Method::POST,
        "/transactions",
        Some(json!({ "total": 0, "paymentMethod": "cash", "items": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_sync_creates_then_replays_idempotently() {
    let app = test_app().await;

    let (_, product) = request(
        &app,
        Method::POST,
        "/products",
        Some(product_body("Paracetamol 500mg", 40)),
    )
    .await;
    let product_id = product["id"].as_str().unwrap();

    let sale_id = Uuid::new_v4().to_string();
    let payload = json!({
        "id": sale_id,
        "total": 50000,
        "paymentMethod": "qris",
        "userId": "kasir-1",
        "date": "2026-08-27T09:30:00Z",
        "items": [sale_item(product_id, 10)],
    });

    let (status, synced) = request(
        &app,
        Method::POST,
        "/transactions/sync",
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(synced["id"], sale_id.as_str());

    // Replay: acknowledged, no second deduction
    let (status, replay) = request(&app, Method::POST, "/transactions/sync", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay["message"], "Already synced");
    assert_eq!(replay["id"], sale_id.as_str());

    let (_, listed) = request(&app, Method::GET, "/products", None).await;
    assert_eq!(listed[0]["totalStock"], 30);

    let (_, transactions) = request(&app, Method::GET, "/transactions", None).await;
    assert_eq!(transactions.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_sync_rejects_non_uuid_id() {
    let app = test_app().await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/transactions/sync",
        Some(json!({
            "id": "not-a-uuid",
            "total": 5000,
            "paymentMethod": "cash",
            "date": "2026-08-27T09:30:00Z",
            "items": [sale_item(&Uuid::new_v4().to_string(), 1)],
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("UUID"));
}
