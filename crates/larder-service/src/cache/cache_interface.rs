//! Cache store abstraction shared by services and the HTTP response cache.

use async_trait::async_trait;
use larder_core::{Interface, LarderResult};
use std::time::Duration;

/// Key/value store holding JSON strings.
///
/// Values are stored as serialized JSON so the trait stays dyn-compatible;
/// typed access lives in [`CacheExt`]. A `ttl` of `None` means the entry
/// never expires on its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheInterface: Interface + Send + Sync {
    /// Returns the stored JSON for `key`, or `None` when absent or expired.
    async fn get_raw(&self, key: &str) -> LarderResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous entry.
    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> LarderResult<()>;

    /// Returns `true` if the key existed and was deleted.
    async fn delete(&self, key: &str) -> LarderResult<bool>;

    async fn exists(&self, key: &str) -> LarderResult<bool>;

    /// Deletes every key matching a glob where `*` matches any run of characters.
    ///
    /// Returns the number of keys deleted.
    async fn delete_pattern(&self, pattern: &str) -> LarderResult<u64>;

    /// Verifies the backing store is reachable.
    async fn health_check(&self) -> LarderResult<()>;

    fn is_enabled(&self) -> bool;
}

/// Typed helpers over the raw string API.
#[async_trait]
pub trait CacheExt: CacheInterface {
    async fn get<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> LarderResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> LarderResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json, ttl).await
    }

    /// Returns the cached value, or computes and caches it.
    ///
    /// Cache read and write failures degrade to calling `factory`; only the
    /// factory's own error is returned.
    async fn get_or_set<T, F, Fut>(&self, key: &str, ttl: Option<Duration>, factory: F) -> LarderResult<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: std::future::Future<Output = LarderResult<T>> + Send,
    {
        match self.get::<T>(key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => tracing::error!(cache_key = key, error = %e, "cache read failed"),
        }

        let value = factory().await?;

        if let Err(e) = self.set(key, &value, ttl).await {
            tracing::error!(cache_key = key, error = %e, "cache write failed");
        }

        Ok(value)
    }
}

impl<T: CacheInterface + ?Sized> CacheExt for T {}
