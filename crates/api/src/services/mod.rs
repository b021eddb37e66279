//! Business workflows.
//!
//! # Services
//!
//! - `customers` - Customer CRUD with cache-aside reads and write invalidation
//! - `products` - Read-only catalog with cache-aside reads
//! - `orders` - Order queries and the order-pricing workflow
//!
//! Workflows depend only on the store traits in [`crate::db`] and the
//! [`Cache`](crate::cache::Cache) façade.

pub mod customers;
pub mod orders;
pub mod products;

pub use customers::CustomerService;
pub use orders::OrderService;
pub use products::ProductService;

use thiserror::Error;

use crate::cache::Cache;
use crate::db::{Repositories, RepositoryError};
use crate::models::ValidationError;

/// Errors returned by the workflows.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The addressed entity does not exist.
    #[error("not found")]
    NotFound,

    /// The input was rejected.
    #[error("{0}")]
    Validation(String),

    /// The operation conflicts with existing data (e.g. deleting a customer
    /// that still has orders).
    #[error("{0}")]
    Conflict(String),

    /// The store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.0)
    }
}

/// All workflows, wired to the same gateways.
#[derive(Clone)]
pub struct Services {
    pub customers: CustomerService,
    pub products: ProductService,
    pub orders: OrderService,
}

impl Services {
    #[must_use]
    pub fn new(repos: &Repositories, cache: &Cache) -> Self {
        Self {
            customers: CustomerService::new(repos.customers.clone(), cache.clone()),
            products: ProductService::new(repos.products.clone(), cache.clone()),
            orders: OrderService::new(repos, cache.clone()),
        }
    }
}
