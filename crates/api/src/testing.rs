//! In-memory gateways for tests.
//!
//! [`MemoryStore`] implements all three store traits over one shared state and
//! mirrors the database constraints: unique phone numbers, restrict-delete of
//! referenced customers and atomic order creation. Call counters let tests
//! assert which gateway calls a workflow made. [`FailingCache`] errors on
//! every call.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use order_management_core::{CustomerId, OrderId, OrderItemId, PhoneNumber, Price, ProductId};

use crate::cache::{CacheError, CacheStore};
use crate::db::customers::{DUPLICATE_PHONE, HAS_ORDERS};
use crate::db::orders::MISSING_REFERENCE;
use crate::db::{CustomerStore, OrderStore, ProductStore, Repositories, RepositoryError};
use crate::models::{Customer, CustomerInput, Product};
use crate::models::{NewOrder, Order, OrderItem, OrderWithDetails};
use crate::sample;

#[derive(Default)]
struct State {
    customers: BTreeMap<CustomerId, Customer>,
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    next_customer_id: i32,
    next_product_id: i32,
    next_order_id: i32,
    next_order_item_id: i32,
}

impl State {
    fn details(&self, order: &Order) -> Result<OrderWithDetails, RepositoryError> {
        let customer = self
            .customers
            .get(&order.customer_id)
            .cloned()
            .ok_or_else(|| corrupt(order.id))?;
        let products: Vec<Product> = self.products.values().cloned().collect();

        OrderWithDetails::assemble(order.clone(), customer, &products)
            .ok_or_else(|| corrupt(order.id))
    }

    fn details_where(
        &self,
        keep: impl Fn(&Order) -> bool,
    ) -> Result<Vec<OrderWithDetails>, RepositoryError> {
        self.orders
            .values()
            .filter(|order| keep(order))
            .map(|order| self.details(order))
            .collect()
    }

    fn phone_taken(&self, phone: &PhoneNumber, except: Option<CustomerId>) -> bool {
        self.customers
            .values()
            .any(|c| &c.phone_number == phone && Some(c.id) != except)
    }
}

fn corrupt(id: OrderId) -> RepositoryError {
    RepositoryError::DataCorruption(format!("order {id} references a missing row"))
}

fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

/// Counts of gateway calls made against a [`MemoryStore`].
#[derive(Default)]
struct Calls {
    customer_reads: AtomicUsize,
    customer_exists: AtomicUsize,
    customer_writes: AtomicUsize,
    product_reads: AtomicUsize,
    product_batch_reads: AtomicUsize,
    order_reads: AtomicUsize,
    order_creates: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

/// Shared in-memory implementation of every store trait.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    calls: Calls,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A store holding the sample customers, products and orders.
    ///
    /// # Panics
    ///
    /// Panics if the sample data is malformed.
    #[must_use]
    pub fn with_sample_data() -> Arc<Self> {
        let store = Self::default();
        {
            let mut state = store.lock();

            for c in sample::CUSTOMERS {
                let customer = Customer {
                    id: CustomerId::new(c.id),
                    full_name: c.full_name.to_owned(),
                    address: c.address.to_owned(),
                    phone_number: PhoneNumber::parse(c.phone_number).expect("sample phone"),
                };
                state.customers.insert(customer.id, customer);
                state.next_customer_id = state.next_customer_id.max(c.id);
            }

            for p in sample::PRODUCTS {
                let product = Product {
                    id: ProductId::new(p.id),
                    name: p.name.to_owned(),
                    price: Price::new(Decimal::from(p.price)).expect("sample price"),
                };
                state.products.insert(product.id, product);
                state.next_product_id = state.next_product_id.max(p.id);
            }

            for o in sample::ORDERS {
                let order = Order {
                    id: OrderId::new(o.id),
                    customer_id: CustomerId::new(o.customer_id),
                    order_date: DateTime::parse_from_rfc3339(o.placed_at)
                        .expect("sample date")
                        .with_timezone(&Utc),
                    total_amount: Decimal::from(o.total()),
                    items: o
                        .items
                        .iter()
                        .map(|i| OrderItem {
                            id: OrderItemId::new(i.id),
                            order_id: OrderId::new(o.id),
                            product_id: ProductId::new(i.product_id),
                            quantity: i.quantity,
                            unit_price: Price::new(Decimal::from(i.unit_price))
                                .expect("sample unit price"),
                        })
                        .collect(),
                };
                let last_item = o.items.iter().map(|i| i.id).max().unwrap_or_default();
                state.next_order_item_id = state.next_order_item_id.max(last_item);
                state.next_order_id = state.next_order_id.max(o.id);
                state.orders.insert(order.id, order);
            }
        }
        Arc::new(store)
    }

    /// Gateways backed by this store.
    #[must_use]
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            customers: self.clone(),
            products: self.clone(),
            orders: self.clone(),
        }
    }

    /// Add a catalog product and return its id.
    pub fn add_product(&self, name: &str, price: Price) -> ProductId {
        let mut state = self.lock();
        let id = ProductId::new(next(&mut state.next_product_id));
        state.products.insert(
            id,
            Product {
                id,
                name: name.to_owned(),
                price,
            },
        );
        id
    }

    /// Change a product's catalog price.
    pub fn set_product_price(&self, id: ProductId, price: Price) {
        if let Some(product) = self.lock().products.get_mut(&id) {
            product.price = price;
        }
    }

    /// Make every subsequent call fail with a database error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of orders currently stored.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    /// `CustomerStore::get_by_id` and `list` calls.
    #[must_use]
    pub fn customer_reads(&self) -> usize {
        self.calls.customer_reads.load(Ordering::SeqCst)
    }

    /// `CustomerStore::exists` calls.
    #[must_use]
    pub fn customer_exists_checks(&self) -> usize {
        self.calls.customer_exists.load(Ordering::SeqCst)
    }

    /// `CustomerStore` create, update and delete calls.
    #[must_use]
    pub fn customer_writes(&self) -> usize {
        self.calls.customer_writes.load(Ordering::SeqCst)
    }

    /// `ProductStore::get_by_id` and `list` calls.
    #[must_use]
    pub fn product_reads(&self) -> usize {
        self.calls.product_reads.load(Ordering::SeqCst)
    }

    /// `ProductStore::get_by_ids` calls.
    #[must_use]
    pub fn product_batch_reads(&self) -> usize {
        self.calls.product_batch_reads.load(Ordering::SeqCst)
    }

    /// `OrderStore` read calls.
    #[must_use]
    pub fn order_reads(&self) -> usize {
        self.calls.order_reads.load(Ordering::SeqCst)
    }

    /// `OrderStore::create` calls.
    #[must_use]
    pub fn order_creates(&self) -> usize {
        self.calls.order_creates.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        bump(&self.calls.customer_reads);
        self.check_available()?;
        Ok(self.lock().customers.values().cloned().collect())
    }

    async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        bump(&self.calls.customer_reads);
        self.check_available()?;
        Ok(self.lock().customers.get(&id).cloned())
    }

    async fn exists(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        bump(&self.calls.customer_exists);
        self.check_available()?;
        Ok(self.lock().customers.contains_key(&id))
    }

    async fn create(&self, input: &CustomerInput) -> Result<Customer, RepositoryError> {
        bump(&self.calls.customer_writes);
        self.check_available()?;
        let mut state = self.lock();
        if state.phone_taken(&input.phone_number, None) {
            return Err(RepositoryError::Conflict(DUPLICATE_PHONE.to_owned()));
        }

        let customer = Customer {
            id: CustomerId::new(next(&mut state.next_customer_id)),
            full_name: input.full_name.clone(),
            address: input.address.clone(),
            phone_number: input.phone_number.clone(),
        };
        state.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn update(&self, customer: &Customer) -> Result<Customer, RepositoryError> {
        bump(&self.calls.customer_writes);
        self.check_available()?;
        let mut state = self.lock();
        if !state.customers.contains_key(&customer.id) {
            return Err(RepositoryError::NotFound);
        }
        if state.phone_taken(&customer.phone_number, Some(customer.id)) {
            return Err(RepositoryError::Conflict(DUPLICATE_PHONE.to_owned()));
        }

        state.customers.insert(customer.id, customer.clone());
        Ok(customer.clone())
    }

    async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        bump(&self.calls.customer_writes);
        self.check_available()?;
        let mut state = self.lock();
        if state.orders.values().any(|o| o.customer_id == id) {
            return Err(RepositoryError::Restricted(HAS_ORDERS.to_owned()));
        }
        Ok(state.customers.remove(&id).is_some())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        bump(&self.calls.product_reads);
        self.check_available()?;
        Ok(self.lock().products.values().cloned().collect())
    }

    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        bump(&self.calls.product_reads);
        self.check_available()?;
        Ok(self.lock().products.get(&id).cloned())
    }

    async fn get_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        bump(&self.calls.product_batch_reads);
        self.check_available()?;
        Ok(self
            .lock()
            .products
            .values()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        bump(&self.calls.product_reads);
        self.check_available()?;
        Ok(self.lock().products.contains_key(&id))
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn list_with_details(&self) -> Result<Vec<OrderWithDetails>, RepositoryError> {
        bump(&self.calls.order_reads);
        self.check_available()?;
        self.lock().details_where(|_| true)
    }

    async fn list_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<OrderWithDetails>, RepositoryError> {
        bump(&self.calls.order_reads);
        self.check_available()?;
        self.lock()
            .details_where(|o| o.order_date >= from && o.order_date <= to)
    }

    async fn list_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OrderWithDetails>, RepositoryError> {
        bump(&self.calls.order_reads);
        self.check_available()?;
        self.lock().details_where(|o| o.customer_id == customer_id)
    }

    async fn get_with_details(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderWithDetails>, RepositoryError> {
        bump(&self.calls.order_reads);
        self.check_available()?;
        let state = self.lock();
        state.orders.get(&id).map(|o| state.details(o)).transpose()
    }

    async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        bump(&self.calls.order_creates);
        self.check_available()?;
        let mut state = self.lock();

        let references_ok = state.customers.contains_key(&order.customer_id)
            && order
                .items
                .iter()
                .all(|item| state.products.contains_key(&item.product_id));
        if !references_ok {
            return Err(RepositoryError::Restricted(MISSING_REFERENCE.to_owned()));
        }

        let id = OrderId::new(next(&mut state.next_order_id));
        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            items.push(OrderItem {
                id: OrderItemId::new(next(&mut state.next_order_item_id)),
                order_id: id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
            });
        }

        let created = Order {
            id,
            customer_id: order.customer_id,
            order_date: order.order_date,
            total_amount: order.total_amount,
            items,
        };
        state.orders.insert(id, created.clone());
        Ok(created)
    }
}

/// A cache backend that fails every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCache;

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("failing cache".to_owned()))
    }

    async fn set(
        &self,
        _key: &str,
        _value: String,
        _ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("failing cache".to_owned()))
    }

    async fn remove(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("failing cache".to_owned()))
    }
}
