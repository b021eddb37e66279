//! Order repository for database operations.
//!
//! Reads always return [`OrderWithDetails`]: the order header joined with its
//! customer, then one query for the lines of every returned order joined with
//! their products.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use order_management_core::{CustomerId, OrderId, OrderItemId, Price, ProductId};

use super::customers::CustomerRow;
use super::products::ProductRow;
use super::{OrderStore, RepositoryError};
use crate::models::{Customer, NewOrder, Order, OrderItem, OrderLine, OrderWithDetails, Product};

pub(crate) const MISSING_REFERENCE: &str = "referenced customer or product does not exist";

const HEADER_COLUMNS: &str = r"
    SELECT o.id, o.customer_id, o.order_date, o.total_amount,
           c.full_name, c.address, c.phone_number
    FROM orders o
    JOIN customers c ON c.id = o.customer_id
";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Order header joined with its customer.
#[derive(Debug, sqlx::FromRow)]
struct OrderHeaderRow {
    id: i32,
    customer_id: i32,
    order_date: DateTime<Utc>,
    total_amount: Decimal,
    full_name: String,
    address: String,
    phone_number: String,
}

/// Order item joined with its product.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    unit_price: Decimal,
    product_name: String,
    product_price: Decimal,
}

/// Freshly inserted order header.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_id: i32,
    order_date: DateTime<Utc>,
    total_amount: Decimal,
}

/// Freshly inserted order item.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    unit_price: Decimal,
}

fn unit_price(order_item_id: i32, amount: Decimal) -> Result<Price, RepositoryError> {
    Price::new(amount).map_err(|e| {
        RepositoryError::DataCorruption(format!(
            "invalid unit price for order item {order_item_id}: {e}"
        ))
    })
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            unit_price: unit_price(row.id, row.unit_price)?,
        })
    }
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        let product = Product::try_from(ProductRow {
            id: row.product_id,
            name: row.product_name,
            price: row.product_price,
        })?;

        Ok(Self {
            item: OrderItem {
                id: OrderItemId::new(row.id),
                order_id: OrderId::new(row.order_id),
                product_id: ProductId::new(row.product_id),
                quantity: row.quantity,
                unit_price: unit_price(row.id, row.unit_price)?,
            },
            product,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the lines of `headers` and assemble full read models, preserving
    /// header order.
    async fn with_details(
        &self,
        headers: Vec<OrderHeaderRow>,
    ) -> Result<Vec<OrderWithDetails>, RepositoryError> {
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i32> = headers.iter().map(|h| h.id).collect();

        let rows = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.unit_price,
                   p.name AS product_name, p.price AS product_price
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.id
            ",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut lines_by_order: HashMap<i32, Vec<OrderLine>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id;
            lines_by_order
                .entry(order_id)
                .or_default()
                .push(OrderLine::try_from(row)?);
        }

        headers
            .into_iter()
            .map(|header| {
                let customer = Customer::try_from(CustomerRow {
                    id: header.customer_id,
                    full_name: header.full_name,
                    address: header.address,
                    phone_number: header.phone_number,
                })?;

                Ok(OrderWithDetails {
                    id: OrderId::new(header.id),
                    customer,
                    order_date: header.order_date,
                    total_amount: header.total_amount,
                    lines: lines_by_order.remove(&header.id).unwrap_or_default(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl OrderStore for PgOrderRepository {
    #[instrument(skip(self))]
    async fn list_with_details(&self) -> Result<Vec<OrderWithDetails>, RepositoryError> {
        let headers =
            sqlx::query_as::<_, OrderHeaderRow>(&format!("{HEADER_COLUMNS} ORDER BY o.id"))
                .fetch_all(&self.pool)
                .await?;

        self.with_details(headers).await
    }

    #[instrument(skip(self))]
    async fn list_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<OrderWithDetails>, RepositoryError> {
        let headers = sqlx::query_as::<_, OrderHeaderRow>(&format!(
            "{HEADER_COLUMNS} WHERE o.order_date >= $1 AND o.order_date <= $2 ORDER BY o.id"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        self.with_details(headers).await
    }

    #[instrument(skip(self), fields(customer_id = %customer_id))]
    async fn list_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OrderWithDetails>, RepositoryError> {
        let headers = sqlx::query_as::<_, OrderHeaderRow>(&format!(
            "{HEADER_COLUMNS} WHERE o.customer_id = $1 ORDER BY o.id"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_details(headers).await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_with_details(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderWithDetails>, RepositoryError> {
        let header =
            sqlx::query_as::<_, OrderHeaderRow>(&format!("{HEADER_COLUMNS} WHERE o.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        Ok(self.with_details(vec![header]).await?.pop())
    }

    #[instrument(
        skip(self, order),
        fields(customer_id = %order.customer_id, items = order.items.len())
    )]
    async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let header = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (customer_id, order_date, total_amount)
            VALUES ($1, $2, $3)
            RETURNING id, customer_id, order_date, total_amount
            ",
        )
        .bind(order.customer_id)
        .bind(order.order_date)
        .bind(order.total_amount)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "duplicate order", MISSING_REFERENCE))?;

        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let row = sqlx::query_as::<_, OrderItemRow>(
                r"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                RETURNING id, order_id, product_id, quantity, unit_price
                ",
            )
            .bind(header.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                RepositoryError::from_write(e, "duplicate order item", MISSING_REFERENCE)
            })?;

            items.push(OrderItem::try_from(row)?);
        }

        // Dropping `tx` on any error above rolls back the whole order.
        tx.commit().await?;

        Ok(Order {
            id: OrderId::new(header.id),
            customer_id: CustomerId::new(header.customer_id),
            order_date: header.order_date,
            total_amount: header.total_amount,
            items,
        })
    }
}
