//! Cache key layout and expiry for every cached read.

use std::time::Duration;

use order_management_core::{CustomerId, OrderId, ProductId};

/// Full customer list.
pub const CUSTOMERS_ALL: &str = "customers:all";
/// Full product list.
pub const PRODUCTS_ALL: &str = "products:all";

pub const CUSTOMERS_ALL_TTL: Duration = Duration::from_secs(5 * 60);
pub const CUSTOMER_TTL: Duration = Duration::from_secs(10 * 60);
pub const PRODUCTS_ALL_TTL: Duration = Duration::from_secs(10 * 60);
pub const PRODUCT_TTL: Duration = Duration::from_secs(15 * 60);
pub const ORDER_TTL: Duration = Duration::from_secs(5 * 60);

#[must_use]
pub fn customer(id: CustomerId) -> String {
    format!("customer:{id}")
}

#[must_use]
pub fn product(id: ProductId) -> String {
    format!("product:{id}")
}

#[must_use]
pub fn order(id: OrderId) -> String {
    format!("order:{id}")
}
