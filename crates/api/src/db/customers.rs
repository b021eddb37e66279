//! Customer repository for database operations.
//!
//! Uses runtime queries to avoid SQLx offline mode cache requirements.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use order_management_core::{CustomerId, PhoneNumber};

use super::{CustomerStore, RepositoryError};
use crate::models::{Customer, CustomerInput};

pub(crate) const DUPLICATE_PHONE: &str = "phone number already exists";
pub(crate) const HAS_ORDERS: &str = "customer has existing orders";

/// Internal row type for customer queries.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CustomerRow {
    pub(crate) id: i32,
    pub(crate) full_name: String,
    pub(crate) address: String,
    pub(crate) phone_number: String,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let phone_number = PhoneNumber::parse(&row.phone_number).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone number in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            full_name: row.full_name,
            address: row.address,
            phone_number,
        })
    }
}

/// Repository for customer database operations.
#[derive(Clone)]
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, full_name, address, phone_number
            FROM customers
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Customer::try_from).collect()
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, full_name, address, phone_number
            FROM customers
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Customer::try_from).transpose()
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    async fn exists(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
                .bind(id.as_i32())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    #[instrument(skip(self, input))]
    async fn create(&self, input: &CustomerInput) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            INSERT INTO customers (full_name, address, phone_number)
            VALUES ($1, $2, $3)
            RETURNING id, full_name, address, phone_number
            ",
        )
        .bind(&input.full_name)
        .bind(&input.address)
        .bind(&input.phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, DUPLICATE_PHONE, HAS_ORDERS))?;

        Customer::try_from(row)
    }

    #[instrument(skip(self, customer), fields(customer_id = %customer.id))]
    async fn update(&self, customer: &Customer) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            UPDATE customers
            SET full_name = $2, address = $3, phone_number = $4
            WHERE id = $1
            RETURNING id, full_name, address, phone_number
            ",
        )
        .bind(customer.id)
        .bind(&customer.full_name)
        .bind(&customer.address)
        .bind(&customer.phone_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, DUPLICATE_PHONE, HAS_ORDERS))?;

        row.ok_or(RepositoryError::NotFound)
            .and_then(Customer::try_from)
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, DUPLICATE_PHONE, HAS_ORDERS))?;

        Ok(result.rows_affected() > 0)
    }
}
