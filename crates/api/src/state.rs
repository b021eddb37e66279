//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::Cache;
use crate::db::Repositories;
use crate::services::{CustomerService, OrderService, ProductService, Services};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the workflows and, when backed by
/// `PostgreSQL`, the pool used by the readiness probe.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    services: Services,
    pool: Option<PgPool>,
}

impl AppState {
    /// State backed by `PostgreSQL` and the configured cache.
    #[must_use]
    pub fn new(pool: PgPool, cache: &Cache) -> Self {
        let repos = Repositories::postgres(&pool);

        Self {
            inner: Arc::new(AppStateInner {
                services: Services::new(&repos, cache),
                pool: Some(pool),
            }),
        }
    }

    /// State over arbitrary gateways, with no database pool.
    #[must_use]
    pub fn from_parts(repos: &Repositories, cache: &Cache) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                services: Services::new(repos, cache),
                pool: None,
            }),
        }
    }

    #[must_use]
    pub fn customers(&self) -> &CustomerService {
        &self.inner.services.customers
    }

    #[must_use]
    pub fn products(&self) -> &ProductService {
        &self.inner.services.products
    }

    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.services.orders
    }

    /// The database pool, `None` when running over in-memory gateways.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
