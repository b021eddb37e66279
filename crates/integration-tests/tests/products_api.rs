//! Product catalog endpoints over in-memory gateways.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use rust_decimal::Decimal;

use order_management_integration_tests::{TestApp, decimal};

#[tokio::test]
async fn test_list_products() {
    let app = TestApp::with_sample_data();

    let resp = app.get("/products").await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    let products = body.as_array().unwrap();
    let names: Vec<&str> = products.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec!["Laptop Dell", "Mouse Logitech", "Keyboard Mechanical", "Monitor Samsung"]
    );
}

#[tokio::test]
async fn test_get_product() {
    let app = TestApp::with_sample_data();

    let resp = app.get("/products/4").await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["productId"], 4);
    assert_eq!(decimal(&body["price"]), Decimal::from(8_000_000));
}

#[tokio::test]
async fn test_product_reads_are_cached() {
    let app = TestApp::with_sample_data();

    app.get("/products/1").await;
    app.get("/products/1").await;
    app.get("/products").await;
    app.get("/products").await;

    assert_eq!(app.store.product_reads(), 2);
}

#[tokio::test]
async fn test_unknown_product() {
    let app = TestApp::with_sample_data();
    assert_eq!(app.get("/products/50").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_products_are_read_only() {
    let app = TestApp::with_sample_data();

    let resp = app
        .post_json("/products", &serde_json::json!({"name": "X", "price": "1"}))
        .await;

    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
}
