//! End-to-end tests against a running server.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`om-cli migrate && om-cli seed`)
//! - The API running (`cargo run -p order-management-api`)
//!
//! Run with: `cargo test -p order-management-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use order_management_integration_tests::decimal;

/// Base URL for the API (configurable via environment).
fn base_url() -> String {
    std::env::var("ORDERS_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// A phone number unlikely to collide with earlier runs.
fn random_phone() -> String {
    format!("09{:08}", rand::random_range(0..100_000_000_u32))
}

async fn create_customer(client: &Client) -> Value {
    let resp = client
        .post(format!("{}/customers", base_url()))
        .json(&json!({
            "fullName": "Live Test",
            "address": "1 Test Street",
            "phoneNumber": random_phone(),
        }))
        .send()
        .await
        .expect("Failed to create customer");

    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.unwrap()
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_live_health() {
    let client = Client::new();

    let resp = client
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("Failed to reach server");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_live_customer_lifecycle() {
    let client = Client::new();
    let customer = create_customer(&client).await;
    let id = customer["customerId"].as_i64().unwrap();
    let url = format!("{}/customers/{id}", base_url());

    let fetched: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(fetched, customer);

    let resp = client.delete(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_live_order_snapshot_prices() {
    let client = Client::new();
    let customer = create_customer(&client).await;

    let resp = client
        .post(format!("{}/orders", base_url()))
        .json(&json!({
            "customerId": customer["customerId"],
            "items": [{"productId": 2, "quantity": 3}],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let order: Value = resp.json().await.unwrap();
    let product: Value = client
        .get(format!("{}/products/2", base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let price = decimal(&product["price"]);
    assert_eq!(decimal(&order["orderItems"][0]["unitPrice"]), price);
    assert_eq!(decimal(&order["totalAmount"]), price * Decimal::from(3));

    // The customer now has an order and cannot be deleted.
    let resp = client
        .delete(format!("{}/customers/{}", base_url(), customer["customerId"]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_live_empty_order_is_rejected() {
    let client = Client::new();

    let resp = client
        .post(format!("{}/orders", base_url()))
        .json(&json!({"customerId": 1, "items": []}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
