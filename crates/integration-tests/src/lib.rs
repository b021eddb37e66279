//! Integration tests for the order management API.
//!
//! # Running Tests
//!
//! ```bash
//! # Router-level tests over in-memory gateways
//! cargo test -p order-management-integration-tests
//!
//! # Live-server tests (server running against a migrated, seeded database)
//! ORDERS_BASE_URL=http://localhost:8080 \
//!     cargo test -p order-management-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `customers_api` - Customer CRUD and cache invalidation
//! - `products_api` - Catalog reads
//! - `orders_api` - Order queries and placement
//! - `plumbing` - Health probes, request IDs, CORS
//! - `live_server` - Same flows over HTTP against a real deployment

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use order_management_api::cache::{Cache, CacheStore, MemoryCache};
use order_management_api::state::AppState;
use order_management_api::testing::{FailingCache, MemoryStore};

/// The API router over a [`MemoryStore`].
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    router: Router,
}

/// A buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The `Location` header, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    /// App over the sample customers, products and orders with a working cache.
    #[must_use]
    pub fn with_sample_data() -> Self {
        Self::build(MemoryStore::with_sample_data(), Arc::new(MemoryCache::new(1_000)))
    }

    /// App over an empty store.
    #[must_use]
    pub fn empty() -> Self {
        Self::build(MemoryStore::new(), Arc::new(MemoryCache::new(1_000)))
    }

    /// App over the sample data whose cache fails every call.
    #[must_use]
    pub fn with_failing_cache() -> Self {
        Self::build(MemoryStore::with_sample_data(), Arc::new(FailingCache))
    }

    fn build(store: Arc<MemoryStore>, cache: Arc<dyn CacheStore>) -> Self {
        let state = AppState::from_parts(&store.repositories(), &Cache::new(cache));
        Self {
            store,
            router: order_management_api::app(state),
        }
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body")
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(request(Method::GET, uri, Body::empty())).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(request(Method::DELETE, uri, Body::empty())).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(json_request(Method::POST, uri, body.to_string())).await
    }

    pub async fn put_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(json_request(Method::PUT, uri, body.to_string())).await
    }

    /// POST a raw (possibly malformed) JSON body.
    pub async fn post_raw(&self, uri: &str, body: &str) -> TestResponse {
        self.send(json_request(Method::POST, uri, body.to_owned())).await
    }
}

fn request(method: Method, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(body)
        .expect("valid request")
}

fn json_request(method: Method, uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("valid request")
}

/// Read a money field, which the API sends as an exact JSON number.
///
/// # Panics
///
/// Panics if the value is not a JSON number.
#[must_use]
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("expected a JSON number, got {other}"),
    }
}
