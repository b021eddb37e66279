//! Order and order line item models.
//!
//! An order owns its line items. Each item records the product's price at the
//! moment the order was placed (`unit_price`), so later catalog price changes
//! never alter historical orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use order_management_core::{CustomerId, OrderId, OrderItemId, Price, ProductId};

use super::{Customer, Product, ValidationError};

/// An order with its line items (foreign keys only, nothing resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub order_date: DateTime<Utc>,
    /// Sum of `quantity * unit_price` over all items, fixed at creation.
    pub total_amount: Decimal,
    pub items: Vec<OrderItem>,
}

/// A persisted order line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    /// Price snapshot taken when the order was created.
    pub unit_price: Price,
}

/// An order ready to be persisted. Ids are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub items: Vec<NewOrderItem>,
}

/// A line item of a [`NewOrder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Price,
}

/// An item together with the product it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub item: OrderItem,
    pub product: Product,
}

/// An order with its customer and each item's product resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderWithDetails {
    pub id: OrderId,
    pub customer: Customer,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub lines: Vec<OrderLine>,
}

impl OrderWithDetails {
    /// Attach the customer and products to an order.
    ///
    /// Returns `None` if the customer is not the order's customer or if any
    /// item references a product missing from `products`.
    #[must_use]
    pub fn assemble(order: Order, customer: Customer, products: &[Product]) -> Option<Self> {
        if customer.id != order.customer_id {
            return None;
        }

        let lines = order
            .items
            .into_iter()
            .map(|item| {
                products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .map(|product| OrderLine {
                        item,
                        product: product.clone(),
                    })
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            id: order.id,
            customer,
            order_date: order.order_date,
            total_amount: order.total_amount,
            lines,
        })
    }
}

/// One requested line of `POST /orders`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[schema(value_type = i32)]
    pub product_id: ProductId,
    #[schema(minimum = 1)]
    pub quantity: i32,
}

/// JSON body for `POST /orders`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[schema(value_type = i32)]
    pub customer_id: CustomerId,
    /// Also accepted as `orderItems`.
    #[serde(alias = "orderItems")]
    pub items: Vec<OrderItemRequest>,
}

impl CreateOrderRequest {
    /// Shape checks that do not need the store: at least one item, and every
    /// quantity at least 1.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` describing the first violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.items.is_empty() {
            return Err(ValidationError(
                "order must contain at least one item".to_owned(),
            ));
        }
        if let Some(item) = self.items.iter().find(|item| item.quantity < 1) {
            return Err(ValidationError(format!(
                "quantity must be at least 1 (product {})",
                item.product_id
            )));
        }
        Ok(())
    }
}

/// Order as returned by the API (and stored in the cache).
///
/// Money fields are exact JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    #[schema(value_type = i32)]
    pub order_id: OrderId,
    #[schema(value_type = i32)]
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub order_date: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount: Decimal,
    pub order_items: Vec<OrderItemDto>,
}

/// Order line as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    #[schema(value_type = i32)]
    pub order_item_id: OrderItemId,
    #[schema(value_type = i32)]
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_price: Decimal,
}

impl From<&OrderLine> for OrderItemDto {
    fn from(line: &OrderLine) -> Self {
        let unit_price = line.item.unit_price.amount();
        Self {
            order_item_id: line.item.id,
            product_id: line.item.product_id,
            product_name: line.product.name.clone(),
            quantity: line.item.quantity,
            unit_price,
            total_price: Decimal::from(line.item.quantity) * unit_price,
        }
    }
}

impl From<&OrderWithDetails> for OrderDto {
    fn from(order: &OrderWithDetails) -> Self {
        Self {
            order_id: order.id,
            customer_id: order.customer.id,
            customer_name: order.customer.full_name.clone(),
            order_date: order.order_date,
            total_amount: order.total_amount,
            order_items: order.lines.iter().map(OrderItemDto::from).collect(),
        }
    }
}
