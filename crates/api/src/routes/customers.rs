//! Customer route handlers.

use axum::extract::State;
use axum::http::{HeaderName, StatusCode, header};

use order_management_core::CustomerId;

use super::extract::{ApiJson, ApiPath};
use crate::error::{AppError, Result};
use crate::models::{CustomerDto, CustomerRequest};
use crate::services::ServiceError;
use crate::state::AppState;

fn not_found(id: CustomerId) -> AppError {
    AppError::NotFound(format!("customer {id}"))
}

fn for_customer(id: CustomerId) -> impl FnOnce(ServiceError) -> AppError {
    move |err| match err {
        ServiceError::NotFound => not_found(id),
        other => other.into(),
    }
}

/// `GET /customers`
#[utoipa::path(
    get,
    path = "/customers",
    tag = "Customers",
    responses((status = 200, description = "All customers", body = Vec<CustomerDto>)),
)]
pub async fn index(State(state): State<AppState>) -> Result<ApiJson<Vec<CustomerDto>>> {
    Ok(ApiJson(state.customers().list_customers().await?))
}

/// `GET /customers/{id}`
#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "Customers",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "The customer", body = CustomerDto),
        (status = 404, description = "No such customer", body = String),
    ),
)]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> Result<ApiJson<CustomerDto>> {
    state
        .customers()
        .get_customer(id)
        .await?
        .map(ApiJson)
        .ok_or_else(|| not_found(id))
}

/// `POST /customers`
#[utoipa::path(
    post,
    path = "/customers",
    tag = "Customers",
    request_body = CustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = CustomerDto,
            headers(("Location" = String, description = "URL of the new customer"))),
        (status = 400, description = "Invalid fields or duplicate phone number", body = String),
    ),
)]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CustomerRequest>,
) -> Result<(StatusCode, [(HeaderName, String); 1], ApiJson<CustomerDto>)> {
    let customer = state.customers().create_customer(body).await?;
    let location = format!("/customers/{}", customer.customer_id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        ApiJson(customer),
    ))
}

/// `PUT /customers/{id}`
#[utoipa::path(
    put,
    path = "/customers/{id}",
    tag = "Customers",
    params(("id" = i32, Path, description = "Customer id")),
    request_body = CustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = CustomerDto),
        (status = 400, description = "Invalid fields or duplicate phone number", body = String),
        (status = 404, description = "No such customer", body = String),
    ),
)]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
    ApiJson(body): ApiJson<CustomerRequest>,
) -> Result<ApiJson<CustomerDto>> {
    let customer = state
        .customers()
        .update_customer(id, body)
        .await
        .map_err(for_customer(id))?;
    Ok(ApiJson(customer))
}

/// `DELETE /customers/{id}`
#[utoipa::path(
    delete,
    path = "/customers/{id}",
    tag = "Customers",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 400, description = "Customer still has orders", body = String),
        (status = 404, description = "No such customer", body = String),
    ),
)]
pub async fn destroy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> Result<StatusCode> {
    state
        .customers()
        .delete_customer(id)
        .await
        .map_err(for_customer(id))?;
    Ok(StatusCode::NO_CONTENT)
}
