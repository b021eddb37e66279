//! Customer workflow.

use std::sync::Arc;

use tracing::{info, instrument};

use order_management_core::CustomerId;

use super::ServiceError;
use crate::cache::{Cache, keys};
use crate::db::{CustomerStore, RepositoryError};
use crate::models::{Customer, CustomerDto, CustomerRequest};

/// Customer CRUD with cache-aside reads.
#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<dyn CustomerStore>,
    cache: Cache,
}

/// Unique violations become validation errors, restrict violations conflicts.
fn write_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::Conflict(msg) => ServiceError::Validation(msg),
        RepositoryError::Restricted(msg) => ServiceError::Conflict(msg),
        RepositoryError::NotFound => ServiceError::NotFound,
        other => ServiceError::Repository(other),
    }
}

impl CustomerService {
    #[must_use]
    pub fn new(customers: Arc<dyn CustomerStore>, cache: Cache) -> Self {
        Self { customers, cache }
    }

    /// All customers, cached under `customers:all`.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<CustomerDto>, ServiceError> {
        if let Some(cached) = self.cache.get(keys::CUSTOMERS_ALL).await {
            return Ok(cached);
        }

        let customers: Vec<CustomerDto> = self
            .customers
            .list()
            .await?
            .iter()
            .map(CustomerDto::from)
            .collect();

        self.cache
            .set(keys::CUSTOMERS_ALL, &customers, Some(keys::CUSTOMERS_ALL_TTL))
            .await;
        Ok(customers)
    }

    /// One customer, cached under `customer:{id}`. Absence is not cached.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn get_customer(&self, id: CustomerId) -> Result<Option<CustomerDto>, ServiceError> {
        let key = keys::customer(id);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(Some(cached));
        }

        let Some(customer) = self.customers.get_by_id(id).await? else {
            return Ok(None);
        };

        let dto = CustomerDto::from(&customer);
        self.cache.set(&key, &dto, Some(keys::CUSTOMER_TTL)).await;
        Ok(Some(dto))
    }

    #[instrument(skip(self, request))]
    pub async fn create_customer(
        &self,
        request: CustomerRequest,
    ) -> Result<CustomerDto, ServiceError> {
        let input = request.validate()?;
        let customer = self.customers.create(&input).await.map_err(write_error)?;

        self.cache.remove(keys::CUSTOMERS_ALL).await;

        info!(customer_id = %customer.id, "Customer created");
        Ok(CustomerDto::from(&customer))
    }

    /// Overwrite all fields of an existing customer.
    ///
    /// # Errors
    ///
    /// `NotFound` if the customer does not exist, `Validation` for invalid
    /// fields or a phone number used by another customer.
    #[instrument(skip(self, request), fields(customer_id = %id))]
    pub async fn update_customer(
        &self,
        id: CustomerId,
        request: CustomerRequest,
    ) -> Result<CustomerDto, ServiceError> {
        let input = request.validate()?;

        let existing = self
            .customers
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let updated = Customer {
            full_name: input.full_name,
            address: input.address,
            phone_number: input.phone_number,
            ..existing
        };
        let saved = self.customers.update(&updated).await.map_err(write_error)?;

        self.cache.remove(&keys::customer(id)).await;
        self.cache.remove(keys::CUSTOMERS_ALL).await;

        Ok(CustomerDto::from(&saved))
    }

    /// Delete a customer with no orders.
    ///
    /// # Errors
    ///
    /// `NotFound` if the customer does not exist, `Conflict` while orders
    /// reference it (the customer is kept).
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn delete_customer(&self, id: CustomerId) -> Result<(), ServiceError> {
        if !self.customers.exists(id).await? {
            return Err(ServiceError::NotFound);
        }

        if !self.customers.delete(id).await.map_err(write_error)? {
            return Err(ServiceError::NotFound);
        }

        self.cache.remove(&keys::customer(id)).await;
        self.cache.remove(keys::CUSTOMERS_ALL).await;

        info!("Customer deleted");
        Ok(())
    }
}
