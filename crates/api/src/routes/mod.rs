//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health              - Liveness check
//! GET    /health/ready        - Readiness check (database reachable)
//! GET    /api-docs/openapi.json - OpenAPI document
//!
//! # Customers
//! GET    /customers           - List customers
//! POST   /customers           - Create customer
//! GET    /customers/{id}      - Customer detail
//! PUT    /customers/{id}      - Replace customer fields
//! DELETE /customers/{id}      - Delete customer without orders
//!
//! # Products (read-only)
//! GET    /products            - List products
//! GET    /products/{id}       - Product detail
//!
//! # Orders
//! GET    /orders              - List orders (?customerId= | ?fromDate=&toDate=)
//! POST   /orders              - Place order
//! GET    /orders/{id}         - Order detail
//! ```

pub mod customers;
pub mod extract;
pub mod orders;
pub mod products;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use utoipa::OpenApi;

use self::extract::ApiJson;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// All API routes, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/customers", get(customers::index).post(customers::create))
        .route(
            "/customers/{id}",
            get(customers::show)
                .put(customers::update)
                .delete(customers::destroy),
        )
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/orders", get(orders::index).post(orders::create))
        .route("/orders/{id}", get(orders::show))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Process is up", body = String)),
)]
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 503, description = "Database unreachable"),
    ),
)]
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };

    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn openapi_json() -> ApiJson<utoipa::openapi::OpenApi> {
    ApiJson(ApiDoc::openapi())
}
