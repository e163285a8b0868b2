//! Redis-backed cache store.

use super::CacheInterface;
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Pool, PoolConfig, Runtime};
use larder_config::CacheConfig;
use larder_core::{LarderError, LarderResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Keys fetched per `SCAN` round trip during pattern deletes.
const SCAN_BATCH: u32 = 500;

/// Redis cache store on a `deadpool-redis` connection pool.
#[derive(Clone)]
pub struct RedisCacheService {
    pool: Option<Arc<Pool>>,
}

impl RedisCacheService {
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Builds the connection pool described by `config`.
    ///
    /// Connections are established lazily, so an unreachable server surfaces
    /// on first use (and through [`CacheInterface::health_check`]).
    pub fn connect(config: &CacheConfig) -> LarderResult<Self> {
        let mut redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
        redis_cfg.pool = Some(PoolConfig::new(config.pool_size as usize));

        let pool = redis_cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| LarderError::Cache(format!("Failed to create Redis pool: {e}")))?;

        Ok(Self::new(Arc::new(pool)))
    }

    /// A store that holds nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    async fn get_conn(&self) -> LarderResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool
                .get()
                .await
                .map_err(|e| LarderError::Cache(format!("Failed to get Redis connection: {e}"))),
            None => Err(LarderError::Cache("Cache is disabled".to_string())),
        }
    }
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("enabled", &self.pool.is_some())
            .finish()
    }
}

/// Escapes Redis glob metacharacters other than `*`.
fn to_redis_glob(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_raw(&self, key: &str) -> LarderResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| LarderError::Cache(format!("Failed to get key '{key}': {e}")))?;

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> LarderResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        match ttl {
            Some(ttl) => conn.pset_ex::<_, _, ()>(key, value, ttl_millis(ttl)).await,
            None => conn.set::<_, _, ()>(key, value).await,
        }
        .map_err(|e| LarderError::Cache(format!("Failed to set key '{key}': {e}")))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> LarderResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let mut conn = self.get_conn().await?;
        let deleted: i64 = conn
            .del(key)
            .await
            .map_err(|e| LarderError::Cache(format!("Failed to delete key '{key}': {e}")))?;

        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> LarderResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let mut conn = self.get_conn().await?;
        conn.exists(key)
            .await
            .map_err(|e| LarderError::Cache(format!("Failed to check key '{key}': {e}")))
    }

    async fn delete_pattern(&self, pattern: &str) -> LarderResult<u64> {
        if !self.is_enabled() {
            return Ok(0);
        }

        let mut conn = self.get_conn().await?;
        let glob = to_redis_glob(pattern);
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = deadpool_redis::redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&glob)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| LarderError::Cache(format!("Failed to scan keys: {e}")))?;

            if !keys.is_empty() {
                let removed: u64 = conn
                    .del(&keys)
                    .await
                    .map_err(|e| LarderError::Cache(format!("Failed to delete keys: {e}")))?;
                deleted += removed;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(pattern, deleted, "deleted keys by pattern");
        Ok(deleted)
    }

    async fn health_check(&self) -> LarderResult<()> {
        let mut conn = self.get_conn().await?;
        let _: String = deadpool_redis::redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| LarderError::Cache(format!("Redis ping failed: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_cache_is_a_no_op() {
        let cache = RedisCacheService::disabled();
        assert!(!cache.is_enabled());
        assert_eq!(cache.get_raw("k").await.unwrap(), None);
        cache.set_raw("k", "1", None).await.unwrap();
        assert!(!cache.delete("k").await.unwrap());
        assert_eq!(cache.delete_pattern("k*").await.unwrap(), 0);
        assert!(cache.health_check().await.is_err());
    }

    #[test]
    fn test_glob_escaping_keeps_wildcard() {
        assert_eq!(to_redis_glob("foods:list*"), "foods:list*");
        assert_eq!(to_redis_glob("food:*:id:a?[b]"), "food:*:id:a\\?\\[b\\]");
    }

    #[test]
    fn test_ttl_millis() {
        assert_eq!(ttl_millis(Duration::from_secs(300)), 300_000);
        assert_eq!(ttl_millis(Duration::ZERO), 1);
    }

    #[test]
    fn test_connect_builds_lazy_pool() {
        let config = CacheConfig {
            redis_url: "redis://127.0.0.1:6399".to_string(),
            ..CacheConfig::default()
        };
        let cache = RedisCacheService::connect(&config).unwrap();
        assert!(cache.is_enabled());
    }
}
