//! Domain models, request bodies and response DTOs.
//!
//! Entities reference each other through explicit foreign-key ids. Read models
//! that need related rows (an order with its customer and products) are
//! assembled by the persistence gateway, see [`OrderWithDetails`].

pub mod customer;
pub mod order;
pub mod product;

pub use customer::{Customer, CustomerDto, CustomerInput, CustomerRequest};
pub use order::{
    CreateOrderRequest, NewOrder, NewOrderItem, Order, OrderDto, OrderItem, OrderItemDto,
    OrderItemRequest, OrderLine, OrderWithDetails,
};
pub use product::{Product, ProductDto};

use thiserror::Error;

/// A request body failed validation at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Trim a required text field and enforce its maximum length (in characters).
pub(crate) fn required_text(
    field: &str,
    value: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(ValidationError(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_owned())
}
