//! Cache backend on Redis, shared by every API instance.
//!
//! Writes use `SET key value PX <ttl>` and removals `DEL key`, so an
//! invalidation on one instance is seen by all of them.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use super::{CacheError, CacheStore};

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Redis-backed [`CacheStore`].
///
/// The connection manager reconnects on its own after a dropped connection;
/// calls made while Redis is down fail with [`CacheError::Unavailable`].
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connect to the Redis server at `url` (`redis://host:port/db`).
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Unavailable` if the URL is malformed or the
    /// server cannot be reached.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

/// TTL in whole milliseconds for `PX`, which rejects zero.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value = redis::cmd("GET")
            .arg(key)
            .query_async::<Option<String>>(&mut conn)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(ttl_millis(ttl));
        }
        cmd.query_async::<()>(&mut conn).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_millis() {
        assert_eq!(ttl_millis(Duration::from_secs(300)), 300_000);
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
        assert_eq!(ttl_millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_malformed_url_is_unavailable() {
        let result = RedisCache::connect("not a redis url").await;
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }

    fn redis_url() -> String {
        std::env::var("ORDERS_REDIS_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_owned())
    }

    #[tokio::test]
    #[ignore = "Requires a running Redis server"]
    async fn test_entries_expire() {
        let cache = RedisCache::connect(&redis_url()).await.unwrap();

        cache
            .set("test:expiring", "1".to_owned(), Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert_eq!(cache.get("test:expiring").await.unwrap().as_deref(), Some("1"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(cache.get("test:expiring").await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore = "Requires a running Redis server"]
    async fn test_removal_is_seen_by_other_connections() {
        let first = RedisCache::connect(&redis_url()).await.unwrap();
        let second = RedisCache::connect(&redis_url()).await.unwrap();

        first
            .set("test:shared", "{\"id\":1}".to_owned(), None)
            .await
            .unwrap();
        assert!(second.get("test:shared").await.unwrap().is_some());

        second.remove("test:shared").await.unwrap();
        assert_eq!(first.get("test:shared").await.unwrap(), None);
    }
}
