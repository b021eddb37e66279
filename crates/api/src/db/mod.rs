//! Persistence gateway for the order management `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `customers` - Unique phone number per customer
//! - `products` - Seeded catalog
//! - `orders` - `customer_id` restricts customer deletion
//! - `order_items` - Cascade-deleted with their order, restrict product deletion
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p order-management-cli -- migrate
//! ```
//!
//! Workflows only see the [`CustomerStore`], [`ProductStore`] and
//! [`OrderStore`] traits, so tests can swap in in-memory fakes.

pub mod customers;
pub mod orders;
pub mod products;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use order_management_core::{CustomerId, OrderId, ProductId};

pub use customers::PgCustomerRepository;
pub use orders::PgOrderRepository;
pub use products::PgProductRepository;

use crate::models::{Customer, CustomerInput, NewOrder, Order, OrderWithDetails, Product};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique phone number).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Foreign key violation (row is still referenced).
    #[error("restricted: {0}")]
    Restricted(String),
}

impl RepositoryError {
    /// Classify a write error, mapping unique and foreign-key violations.
    pub(crate) fn from_write(err: sqlx::Error, unique: &str, restricted: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(unique.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::Restricted(restricted.to_owned());
            }
        }
        Self::Database(err)
    }
}

/// Customer persistence.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// All customers ordered by id.
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError>;

    /// A customer by id, `None` if absent.
    async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    /// Whether a customer with this id exists.
    async fn exists(&self, id: CustomerId) -> Result<bool, RepositoryError>;

    /// Insert a customer; the store assigns the id.
    ///
    /// Fails with `Conflict` on a duplicate phone number.
    async fn create(&self, input: &CustomerInput) -> Result<Customer, RepositoryError>;

    /// Overwrite all mutable fields of an existing customer.
    ///
    /// Fails with `NotFound` if the row is gone and `Conflict` on a duplicate
    /// phone number.
    async fn update(&self, customer: &Customer) -> Result<Customer, RepositoryError>;

    /// Delete a customer, returning `false` if it did not exist.
    ///
    /// Fails with `Restricted` while orders reference the customer.
    async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError>;
}

/// Product catalog persistence (read-only).
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products ordered by id.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    /// A product by id, `None` if absent.
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Every product whose id is in `ids`. Unknown ids are simply missing from
    /// the result.
    async fn get_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;

    /// Whether a product with this id exists.
    async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError>;
}

/// Order persistence. Orders are immutable once created.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// All orders with customer and products resolved.
    async fn list_with_details(&self) -> Result<Vec<OrderWithDetails>, RepositoryError>;

    /// Orders with `from <= order_date <= to`.
    async fn list_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<OrderWithDetails>, RepositoryError>;

    /// Orders placed by one customer.
    async fn list_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OrderWithDetails>, RepositoryError>;

    /// One order with related data, `None` if absent.
    async fn get_with_details(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderWithDetails>, RepositoryError>;

    /// Persist an order and all of its items atomically.
    ///
    /// The returned order carries the store-assigned ids of the order and of
    /// every item, in input order.
    async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError>;
}

/// The three entity gateways, shared by the workflows.
#[derive(Clone)]
pub struct Repositories {
    pub customers: Arc<dyn CustomerStore>,
    pub products: Arc<dyn ProductStore>,
    pub orders: Arc<dyn OrderStore>,
}

impl Repositories {
    /// `PostgreSQL`-backed gateways sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            customers: Arc::new(PgCustomerRepository::new(pool.clone())),
            products: Arc::new(PgProductRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool.clone())),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
