//! Health probes, request IDs and CORS.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};

use order_management_api::middleware::REQUEST_ID_HEADER;
use order_management_integration_tests::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::empty();

    let resp = app.get("/health").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.text(), "ok");
}

#[tokio::test]
async fn test_readiness_without_database() {
    let app = TestApp::empty();
    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = TestApp::empty();

    let resp = app.get("/api-docs/openapi.json").await;

    assert_eq!(resp.status, StatusCode::OK);
    let doc = resp.json();
    assert!(doc["openapi"].as_str().unwrap().starts_with("3."));
    assert_eq!(doc["info"]["title"], "Order Management API");
    assert!(doc["paths"]["/orders"]["post"].is_object());
    assert!(doc["paths"]["/customers/{id}"]["delete"].is_object());

    let order = &doc["components"]["schemas"]["OrderDto"]["properties"];
    assert_eq!(order["totalAmount"]["type"], "number");
}

#[tokio::test]
async fn test_every_response_carries_request_id() {
    let app = TestApp::with_sample_data();

    let ok = app.get("/products").await;
    let missing = app.get("/products/999").await;

    assert!(ok.headers.contains_key(REQUEST_ID_HEADER));
    assert!(missing.headers.contains_key(REQUEST_ID_HEADER));
    assert_ne!(
        ok.headers.get(REQUEST_ID_HEADER),
        missing.headers.get(REQUEST_ID_HEADER)
    );
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = TestApp::with_sample_data();

    let resp = app
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/customers")
                .header(header::ORIGIN, "https://shop.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert!(resp.status.is_success());
    assert_eq!(
        resp.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::empty();
    assert_eq!(app.get("/invoices").await.status, StatusCode::NOT_FOUND);
}
