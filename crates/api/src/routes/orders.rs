//! Order route handlers.

use axum::extract::State;
use axum::http::{HeaderName, StatusCode, header};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use order_management_core::{CustomerId, OrderId};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::error::{AppError, Result};
use crate::models::{CreateOrderRequest, OrderDto};
use crate::state::AppState;

/// Query string of `GET /orders`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrdersQuery {
    /// Only this customer's orders. Takes precedence over the date range.
    #[param(value_type = Option<i32>)]
    pub customer_id: Option<CustomerId>,
    /// Start of the range, inclusive (RFC 3339 or `YYYY-MM-DD`).
    pub from_date: Option<String>,
    /// End of the range, inclusive. Ignored unless `fromDate` is also set.
    pub to_date: Option<String>,
}

/// Parse an RFC 3339 timestamp, a naive `YYYY-MM-DDTHH:MM:SS` (UTC) or a
/// plain date (midnight UTC). Blank values count as absent.
fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Some(naive.and_utc()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date.and_time(chrono::NaiveTime::MIN).and_utc()));
    }

    Err(AppError::BadRequest(format!("{field}: invalid date '{raw}'")))
}

/// `GET /orders`
///
/// `customerId` takes precedence; otherwise a date range applies only when
/// both bounds are given.
#[utoipa::path(
    get,
    path = "/orders",
    tag = "Orders",
    params(OrdersQuery),
    responses(
        (status = 200, description = "Matching orders", body = Vec<OrderDto>),
        (status = 400, description = "Unparseable query", body = String),
    ),
)]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrdersQuery>,
) -> Result<ApiJson<Vec<OrderDto>>> {
    let from = parse_date("fromDate", query.from_date.as_deref())?;
    let to = parse_date("toDate", query.to_date.as_deref())?;
    let orders = state.orders();

    let found = match (query.customer_id, from, to) {
        (Some(customer_id), _, _) => orders.list_orders_by_customer(customer_id).await?,
        (None, Some(from), Some(to)) => orders.list_orders_by_date_range(from, to).await?,
        _ => orders.list_orders().await?,
    };

    Ok(ApiJson(found))
}

/// `GET /orders/{id}`
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "Orders",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "The order", body = OrderDto),
        (status = 404, description = "No such order", body = String),
    ),
)]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<ApiJson<OrderDto>> {
    state
        .orders()
        .get_order(id)
        .await?
        .map(ApiJson)
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

/// `POST /orders`
#[utoipa::path(
    post,
    path = "/orders",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderDto,
            headers(("Location" = String, description = "URL of the new order"))),
        (status = 400, description = "Invalid items, unknown customer or product", body = String),
    ),
)]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateOrderRequest>,
) -> Result<(StatusCode, [(HeaderName, String); 1], ApiJson<OrderDto>)> {
    let order = state.orders().create_order(&body).await?;
    let location = format!("/orders/{}", order.order_id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        ApiJson(order),
    ))
}
