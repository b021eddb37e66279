//! Order workflow: queries and order creation with price snapshots.
//!
//! Creating an order validates the request, resolves the customer and every
//! distinct product, snapshots each product's current price onto its line,
//! and persists the order and its lines in one store call. The total is the
//! exact decimal sum of `quantity * unit_price`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use order_management_core::{CustomerId, OrderId, ProductId};

use super::ServiceError;
use crate::cache::{Cache, keys};
use crate::db::{CustomerStore, OrderStore, ProductStore, Repositories, RepositoryError};
use crate::models::{CreateOrderRequest, NewOrder, NewOrderItem, OrderDto, OrderWithDetails};

const CUSTOMER_NOT_FOUND: &str = "customer not found";
const PRODUCTS_NOT_FOUND: &str = "one or more products not found";
const TOTAL_OVERFLOW: &str = "order total is out of range";

#[derive(Clone)]
pub struct OrderService {
    customers: Arc<dyn CustomerStore>,
    products: Arc<dyn ProductStore>,
    orders: Arc<dyn OrderStore>,
    cache: Cache,
}

fn to_dtos(orders: &[OrderWithDetails]) -> Vec<OrderDto> {
    orders.iter().map(OrderDto::from).collect()
}

impl OrderService {
    #[must_use]
    pub fn new(repos: &Repositories, cache: Cache) -> Self {
        Self {
            customers: repos.customers.clone(),
            products: repos.products.clone(),
            orders: repos.orders.clone(),
            cache,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderDto>, ServiceError> {
        Ok(to_dtos(&self.orders.list_with_details().await?))
    }

    /// Orders placed between `from` and `to`, both inclusive.
    #[instrument(skip(self))]
    pub async fn list_orders_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<OrderDto>, ServiceError> {
        Ok(to_dtos(&self.orders.list_by_date_range(from, to).await?))
    }

    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn list_orders_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OrderDto>, ServiceError> {
        Ok(to_dtos(&self.orders.list_by_customer(customer_id).await?))
    }

    /// One order, cached under `order:{id}`.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Option<OrderDto>, ServiceError> {
        let key = keys::order(id);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(Some(cached));
        }

        let Some(order) = self.orders.get_with_details(id).await? else {
            return Ok(None);
        };

        let dto = OrderDto::from(&order);
        self.cache.set(&key, &dto, Some(keys::ORDER_TTL)).await;
        Ok(Some(dto))
    }

    /// Price and persist a new order.
    ///
    /// # Errors
    ///
    /// `Validation` if the request has no items or a non-positive quantity,
    /// the customer or any product does not exist, or the total overflows.
    /// Nothing is written in those cases.
    #[instrument(
        skip(self, request),
        fields(customer_id = %request.customer_id, items = request.items.len())
    )]
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<OrderDto, ServiceError> {
        request.validate()?;

        if !self.customers.exists(request.customer_id).await? {
            return Err(ServiceError::Validation(CUSTOMER_NOT_FOUND.to_owned()));
        }

        let mut product_ids: Vec<ProductId> =
            request.items.iter().map(|item| item.product_id).collect();
        product_ids.sort_unstable();
        product_ids.dedup();

        let products = self.products.get_by_ids(&product_ids).await?;
        if products.len() != product_ids.len() {
            return Err(ServiceError::Validation(PRODUCTS_NOT_FOUND.to_owned()));
        }

        let mut total_amount = Decimal::ZERO;
        let mut items = Vec::with_capacity(request.items.len());
        for requested in &request.items {
            let product = products
                .iter()
                .find(|p| p.id == requested.product_id)
                .ok_or_else(|| ServiceError::Validation(PRODUCTS_NOT_FOUND.to_owned()))?;

            total_amount = Decimal::from(requested.quantity)
                .checked_mul(product.price.amount())
                .and_then(|line| total_amount.checked_add(line))
                .ok_or_else(|| ServiceError::Validation(TOTAL_OVERFLOW.to_owned()))?;

            items.push(NewOrderItem {
                product_id: product.id,
                quantity: requested.quantity,
                unit_price: product.price,
            });
        }

        let new_order = NewOrder {
            customer_id: request.customer_id,
            order_date: Utc::now(),
            total_amount,
            items,
        };

        let order = self.orders.create(&new_order).await.map_err(|e| match e {
            // Customer or product removed after the checks above.
            RepositoryError::Restricted(msg) => ServiceError::Validation(msg),
            other => ServiceError::Repository(other),
        })?;

        let order_id = order.id;
        let customer = self
            .customers
            .get_by_id(order.customer_id)
            .await?
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!("customer of order {order_id} vanished"))
            })?;

        let details = OrderWithDetails::assemble(order, customer, &products).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("order {order_id} could not be resolved"))
        })?;

        info!(order_id = %order_id, total_amount = %details.total_amount, "Order created");
        Ok(OrderDto::from(&details))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use order_management_core::Price;

    use super::*;
    use crate::cache::MemoryCache;
    use crate::models::OrderItemRequest;
    use crate::testing::{FailingCache, MemoryStore};

    fn service(store: &Arc<MemoryStore>) -> OrderService {
        OrderService::new(
            &store.repositories(),
            Cache::new(Arc::new(MemoryCache::new(100))),
        )
    }

    fn price(amount: i64) -> Price {
        Price::new(Decimal::from(amount)).unwrap()
    }

    fn request(customer_id: i32, items: &[(ProductId, i32)]) -> CreateOrderRequest {
        CreateOrderRequest {
            customer_id: CustomerId::new(customer_id),
            items: items
                .iter()
                .map(|&(product_id, quantity)| OrderItemRequest {
                    product_id,
                    quantity,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_order_prices_items() {
        let store = MemoryStore::with_sample_data();
        let product = store.add_product("Cable", price(100_000));
        let service = service(&store);

        let order = service
            .create_order(&request(1, &[(product, 3)]))
            .await
            .unwrap();

        assert_eq!(order.total_amount, Decimal::from(300_000));
        assert_eq!(order.customer_name, "Nguyễn Văn A");
        assert_eq!(order.order_items.len(), 1);
        assert_eq!(order.order_items[0].unit_price, Decimal::from(100_000));
        assert_eq!(order.order_items[0].total_price, Decimal::from(300_000));
        assert_eq!(order.order_items[0].product_name, "Cable");
        assert_eq!(store.order_creates(), 1);
    }

    #[tokio::test]
    async fn test_total_is_exact_sum_of_lines() {
        let store = MemoryStore::new();
        let cents = store.add_product("Sticker", Price::new(Decimal::new(1999, 2)).unwrap());
        let other = store.add_product("Pen", Price::new(Decimal::new(1, 1)).unwrap());
        let service = service(&store);
        let customer = service
            .customers
            .create(&crate::models::CustomerRequest {
                full_name: "A".to_owned(),
                address: "X".to_owned(),
                phone_number: "0900000001".to_owned(),
            }
            .validate()
            .unwrap())
            .await
            .unwrap();

        let order = service
            .create_order(&request(customer.id.as_i32(), &[(cents, 3), (other, 7), (cents, 1)]))
            .await
            .unwrap();

        // 3 * 19.99 + 7 * 0.1 + 1 * 19.99
        assert_eq!(order.total_amount, Decimal::new(8066, 2));
        let sum: Decimal = order.order_items.iter().map(|i| i.total_price).sum();
        assert_eq!(sum, order.total_amount);
        assert_eq!(store.product_batch_reads(), 1);
    }

    #[tokio::test]
    async fn test_unit_price_survives_catalog_change() {
        let store = MemoryStore::with_sample_data();
        let product = store.add_product("Cable", price(100_000));
        let service = service(&store);

        let created = service
            .create_order(&request(2, &[(product, 2)]))
            .await
            .unwrap();
        store.set_product_price(product, price(250_000));

        let fetched = service.get_order(created.order_id).await.unwrap().unwrap();
        assert_eq!(fetched.order_items[0].unit_price, Decimal::from(100_000));
        assert_eq!(fetched.total_amount, Decimal::from(200_000));
    }

    #[tokio::test]
    async fn test_empty_items_are_rejected_without_store_calls() {
        let store = MemoryStore::with_sample_data();
        let service = service(&store);

        let err = service.create_order(&request(1, &[])).await.unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(store.customer_exists_checks(), 0);
        assert_eq!(store.order_creates(), 0);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let store = MemoryStore::with_sample_data();
        let service = service(&store);

        let err = service
            .create_order(&request(1, &[(ProductId::new(1), 0)]))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(store.order_creates(), 0);
    }

    #[tokio::test]
    async fn test_unknown_customer_stops_before_product_lookup() {
        let store = MemoryStore::with_sample_data();
        let service = service(&store);

        let err = service
            .create_order(&request(99, &[(ProductId::new(1), 1)]))
            .await
            .unwrap_err();

        match err {
            ServiceError::Validation(msg) => assert_eq!(msg, "customer not found"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.product_batch_reads(), 0);
        assert_eq!(store.order_creates(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_is_rejected() {
        let store = MemoryStore::with_sample_data();
        let service = service(&store);
        let before = store.order_count();

        let err = service
            .create_order(&request(1, &[(ProductId::new(1), 1), (ProductId::new(42), 1)]))
            .await
            .unwrap_err();

        match err {
            ServiceError::Validation(msg) => assert_eq!(msg, "one or more products not found"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.order_count(), before);
    }

    #[tokio::test]
    async fn test_store_failure_aborts_creation() {
        let store = MemoryStore::with_sample_data();
        let service = service(&store);
        store.set_unavailable(true);

        let err = service
            .create_order(&request(1, &[(ProductId::new(1), 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Repository(_)));
        store.set_unavailable(false);
        assert_eq!(store.order_count(), 3);
    }

    #[tokio::test]
    async fn test_get_order_is_cached() {
        let store = MemoryStore::with_sample_data();
        let service = service(&store);

        let order = service.get_order(OrderId::new(1)).await.unwrap().unwrap();
        service.get_order(OrderId::new(1)).await.unwrap();

        assert_eq!(order.total_amount, Decimal::from(31_000_000));
        assert_eq!(order.order_items.len(), 2);
        assert_eq!(store.order_reads(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_order() {
        let store = MemoryStore::with_sample_data();
        let service = service(&store);

        assert_eq!(service.get_order(OrderId::new(404)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let store = MemoryStore::with_sample_data();
        let service = service(&store);

        assert_eq!(service.list_orders().await.unwrap().len(), 3);

        let by_customer = service
            .list_orders_by_customer(CustomerId::new(1))
            .await
            .unwrap();
        let ids: Vec<i32> = by_customer.iter().map(|o| o.order_id.as_i32()).collect();
        assert_eq!(ids, vec![1, 3]);

        // Both bounds are inclusive.
        let from = DateTime::parse_from_rfc3339("2024-12-02T14:15:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let to = DateTime::parse_from_rfc3339("2024-12-03T09:45:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let in_range = service.list_orders_by_date_range(from, to).await.unwrap();
        let ids: Vec<i32> = in_range.iter().map(|o| o.order_id.as_i32()).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_create_with_failing_cache() {
        let store = MemoryStore::with_sample_data();
        let service = OrderService::new(&store.repositories(), Cache::new(Arc::new(FailingCache)));

        let created = service
            .create_order(&request(3, &[(ProductId::new(4), 1)]))
            .await
            .unwrap();
        let fetched = service.get_order(created.order_id).await.unwrap();

        assert_eq!(fetched, Some(created));
    }
}
