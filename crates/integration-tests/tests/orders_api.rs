//! Order endpoints over in-memory gateways.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use order_management_core::Price;
use order_management_integration_tests::{TestApp, decimal};

fn order_ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|o| o["orderId"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_place_order() {
    let app = TestApp::with_sample_data();
    let cable = app
        .store
        .add_product("HDMI Cable", Price::new(Decimal::from(100_000)).unwrap());

    let resp = app
        .post_json(
            "/orders",
            &json!({"customerId": 2, "items": [{"productId": cable.as_i32(), "quantity": 3}]}),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let body = resp.json();
    let id = body["orderId"].as_i64().unwrap();
    assert_eq!(resp.location(), Some(format!("/orders/{id}").as_str()));
    assert_eq!(body["customerName"], "Trần Thị B");
    assert_eq!(body["totalAmount"], json!(300000));

    let item = &body["orderItems"][0];
    assert_eq!(item["productName"], "HDMI Cable");
    assert_eq!(item["quantity"], 3);
    assert_eq!(item["unitPrice"], json!(100000));
    assert_eq!(item["totalPrice"], json!(300000));

    let fetched = app.get(&format!("/orders/{id}")).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json(), body);
}

#[tokio::test]
async fn test_place_order_accepts_order_items_alias() {
    let app = TestApp::with_sample_data();

    let resp = app
        .post_json(
            "/orders",
            &json!({"customerId": 3, "orderItems": [
                {"productId": 2, "quantity": 1},
                {"productId": 3, "quantity": 2}
            ]}),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    // 500000 + 2 * 1200000
    assert_eq!(decimal(&resp.json()["totalAmount"]), Decimal::from(2_900_000));
}

#[tokio::test]
async fn test_empty_order_is_rejected() {
    let app = TestApp::with_sample_data();

    let resp = app
        .post_json("/orders", &json!({"customerId": 1, "items": []}))
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.order_creates(), 0);
    assert_eq!(app.store.order_count(), 3);
}

#[tokio::test]
async fn test_unknown_customer_is_rejected() {
    let app = TestApp::with_sample_data();

    let resp = app
        .post_json(
            "/orders",
            &json!({"customerId": 404, "items": [{"productId": 1, "quantity": 1}]}),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.text(), "customer not found");
    assert_eq!(app.store.product_batch_reads(), 0);
}

#[tokio::test]
async fn test_unknown_product_is_rejected() {
    let app = TestApp::with_sample_data();

    let resp = app
        .post_json(
            "/orders",
            &json!({"customerId": 1, "items": [
                {"productId": 1, "quantity": 1},
                {"productId": 77, "quantity": 1}
            ]}),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.text(), "one or more products not found");
    assert_eq!(app.store.order_count(), 3);
}

#[tokio::test]
async fn test_zero_quantity_is_rejected() {
    let app = TestApp::with_sample_data();

    let resp = app
        .post_json(
            "/orders",
            &json!({"customerId": 1, "items": [{"productId": 1, "quantity": 0}]}),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.order_creates(), 0);
}

#[tokio::test]
async fn test_get_sample_order() {
    let app = TestApp::with_sample_data();

    let resp = app.get("/orders/1").await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["customerName"], "Nguyễn Văn A");
    assert_eq!(body["orderDate"], "2024-12-01T10:30:00Z");
    assert_eq!(decimal(&body["totalAmount"]), Decimal::from(31_000_000));
    assert_eq!(body["orderItems"].as_array().unwrap().len(), 2);
    assert_eq!(body["orderItems"][0]["productName"], "Laptop Dell");
}

#[tokio::test]
async fn test_get_unknown_order() {
    let app = TestApp::with_sample_data();
    assert_eq!(app.get("/orders/31").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_all_orders() {
    let app = TestApp::with_sample_data();

    let resp = app.get("/orders").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(order_ids(&resp.json()), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_list_orders_by_customer() {
    let app = TestApp::with_sample_data();

    let resp = app.get("/orders?customerId=1").await;
    assert_eq!(order_ids(&resp.json()), vec![1, 3]);

    // customerId wins over a date range
    let resp = app
        .get("/orders?customerId=2&fromDate=2024-12-03&toDate=2024-12-31")
        .await;
    assert_eq!(order_ids(&resp.json()), vec![2]);
}

#[tokio::test]
async fn test_list_orders_by_date_range() {
    let app = TestApp::with_sample_data();

    let resp = app
        .get("/orders?fromDate=2024-12-02&toDate=2024-12-03T09:45:00Z")
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(order_ids(&resp.json()), vec![2, 3]);

    let resp = app.get("/orders?fromDate=2024-12-02&toDate=2024-12-03").await;
    assert_eq!(order_ids(&resp.json()), vec![2]);
}

#[tokio::test]
async fn test_single_date_bound_lists_everything() {
    let app = TestApp::with_sample_data();

    let resp = app.get("/orders?fromDate=2024-12-02").await;

    assert_eq!(order_ids(&resp.json()), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_invalid_date_is_rejected() {
    let app = TestApp::with_sample_data();

    let resp = app.get("/orders?fromDate=soon&toDate=2024-12-03").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_customer_with_new_order_cannot_be_deleted() {
    let app = TestApp::with_sample_data();

    app.post_json(
        "/orders",
        &json!({"customerId": 3, "items": [{"productId": 1, "quantity": 1}]}),
    )
    .await;

    assert_eq!(app.delete("/customers/3").await.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_everything_works_with_failing_cache() {
    let app = TestApp::with_failing_cache();

    let created = app
        .post_json(
            "/orders",
            &json!({"customerId": 1, "items": [{"productId": 4, "quantity": 2}]}),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.json()["orderId"].as_i64().unwrap();

    assert_eq!(app.get(&format!("/orders/{id}")).await.json(), created.json());
    assert_eq!(app.get("/customers").await.json().as_array().unwrap().len(), 3);
    assert_eq!(app.get("/products/4").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_store_outage_is_reported() {
    let app = TestApp::with_sample_data();
    app.store.set_unavailable(true);

    let resp = app.get("/orders").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}
