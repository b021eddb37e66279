//! Product route handlers.

use axum::extract::State;

use order_management_core::ProductId;

use super::extract::{ApiJson, ApiPath};
use crate::error::{AppError, Result};
use crate::models::ProductDto;
use crate::state::AppState;

/// `GET /products`
#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    responses((status = 200, description = "The catalog", body = Vec<ProductDto>)),
)]
pub async fn index(State(state): State<AppState>) -> Result<ApiJson<Vec<ProductDto>>> {
    Ok(ApiJson(state.products().list_products().await?))
}

/// `GET /products/{id}`
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = ProductDto),
        (status = 404, description = "No such product", body = String),
    ),
)]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<ApiJson<ProductDto>> {
    state
        .products()
        .get_product(id)
        .await?
        .map(ApiJson)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
