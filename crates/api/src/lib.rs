//! Order management HTTP API.
//!
//! Customers, a read-only product catalog and orders priced from catalog
//! snapshots, served over JSON. The crate is a library so the router can be
//! exercised in tests over in-memory gateways; the binary in `main.rs` wires
//! it to `PostgreSQL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod sample;
pub mod services;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

use axum::{Router, extract::Request};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use state::AppState;

/// The API router with tracing, CORS and request-id middleware applied.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
