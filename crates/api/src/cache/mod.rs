//! Cache gateway.
//!
//! Workflows use the typed [`Cache`] façade. It stores values as JSON text in
//! any [`CacheStore`] backend and never lets a cache failure reach the caller:
//! a failed or undecodable read is a miss, a failed write or removal is logged
//! and dropped.
//!
//! Two backends exist: [`RedisCache`], shared by all API instances, and the
//! process-local [`MemoryCache`].

pub mod keys;
mod memory;
mod redis_cache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Errors raised by a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not be reached or rejected the operation.
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Raw key/value store with optional per-entry expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// The value stored under `key`, `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Typed side-cache over a [`CacheStore`].
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
}

impl Cache {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Open the backend selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Unavailable` if Redis is selected and cannot be
    /// reached.
    pub async fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        match config {
            CacheConfig::Redis { url } => {
                let store = RedisCache::connect(url.expose_secret()).await?;
                info!("Using Redis cache");
                Ok(Self::new(Arc::new(store)))
            }
            CacheConfig::Memory { capacity } => {
                info!(capacity, "Using in-process cache");
                Ok(Self::new(Arc::new(MemoryCache::new(*capacity))))
            }
        }
    }

    /// Fetch and decode a cached value.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Encode and store a value.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode cache entry");
                return;
            }
        };

        if let Err(e) = self.store.set(key, raw, ttl).await {
            warn!(key, error = %e, "Cache write failed");
        }
    }

    pub async fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(key).await {
            warn!(key, error = %e, "Cache removal failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: i32,
        name: String,
    }

    struct Broken;

    #[async_trait]
    impl CacheStore for Broken {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("down".to_owned()))
        }

        async fn set(&self, _: &str, _: String, _: Option<Duration>) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".to_owned()))
        }

        async fn remove(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("down".to_owned()))
        }
    }

    fn memory() -> (Cache, Arc<MemoryCache>) {
        let store = Arc::new(MemoryCache::new(100));
        (Cache::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let (cache, _) = memory();
        let value = Sample {
            id: 1,
            name: "Laptop Dell".to_owned(),
        };

        cache.set("sample:1", &value, None).await;
        assert_eq!(cache.get::<Sample>("sample:1").await, Some(value));
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let (cache, store) = memory();
        store
            .set("sample:1", "{not json".to_owned(), None)
            .await
            .unwrap();

        assert_eq!(cache.get::<Sample>("sample:1").await, None);
    }

    #[tokio::test]
    async fn test_backend_failures_are_absorbed() {
        let cache = Cache::new(Arc::new(Broken));

        cache.set("k", &1, None).await;
        cache.remove("k").await;
        assert_eq!(cache.get::<i32>("k").await, None);
    }

    #[tokio::test]
    async fn test_from_config_memory() {
        let cache = Cache::from_config(&CacheConfig::Memory { capacity: 10 })
            .await
            .unwrap();
        cache.set("k", &7, None).await;
        assert_eq!(cache.get::<i32>("k").await, Some(7));
    }

    #[tokio::test]
    async fn test_remove_evicts() {
        let (cache, _) = memory();
        cache.set("k", &vec![1, 2, 3], None).await;
        cache.remove("k").await;
        assert_eq!(cache.get::<Vec<i32>>("k").await, None);
    }
}
