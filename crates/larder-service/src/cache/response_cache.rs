//! Read-through caching of GET handler results.

use super::cache_keys::build_cache_key;
use super::{CacheInterface, RequestContext};
use http::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Per-route cache declaration: base key plus optional TTL in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeySpec {
    pub base_key: String,
    pub ttl_seconds: Option<u64>,
}

impl CacheKeySpec {
    #[must_use]
    pub fn new(base_key: impl Into<String>, ttl_seconds: Option<u64>) -> Self {
        Self {
            base_key: base_key.into(),
            ttl_seconds,
        }
    }

    /// Entry lifetime, or `None` for entries that never expire.
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_seconds
            .map(|secs| Duration::from_millis(secs.saturating_mul(1000)))
    }
}

/// Result of reading the store for a request.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(Value),
    Miss,
    /// The store failed; the request must run without caching.
    Unavailable,
}

/// True when a result carries a non-null `error` field.
fn carries_error(value: &Value) -> bool {
    value.get("error").is_some_and(|e| !e.is_null())
}

/// Response cache over a shared [`CacheInterface`].
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheInterface>,
    enabled: bool,
}

impl ResponseCache {
    #[must_use]
    pub fn new(store: Arc<dyn CacheInterface>) -> Self {
        Self { store, enabled: true }
    }

    /// Turns the cache off without removing route declarations.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.store.is_enabled()
    }

    /// Key for this request, or `None` when the request bypasses the cache.
    #[must_use]
    pub fn key_for(&self, spec: Option<&CacheKeySpec>, ctx: &RequestContext) -> Option<String> {
        let spec = spec?;
        if ctx.method != Method::GET || !self.is_enabled() {
            return None;
        }
        Some(build_cache_key(
            &spec.base_key,
            Some(ctx.user_identity()),
            &ctx.route_params,
            &ctx.query,
        ))
    }

    pub async fn lookup(&self, key: &str) -> CacheLookup {
        match self.store.get_raw(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(cache_key = key, "cache hit");
                    CacheLookup::Hit(value)
                }
                Err(e) => {
                    error!(cache_key = key, error = %e, "cached value is not valid JSON");
                    CacheLookup::Unavailable
                }
            },
            Ok(None) => CacheLookup::Miss,
            Err(e) => {
                error!(cache_key = key, error = %e, "cache read failed");
                CacheLookup::Unavailable
            }
        }
    }

    /// Writes a fresh handler value. Returns whether it was stored.
    ///
    /// Values carrying an `error` field are skipped and write failures are
    /// logged, never returned.
    pub async fn store(&self, key: &str, spec: &CacheKeySpec, value: &Value) -> bool {
        if carries_error(value) {
            debug!(cache_key = key, "result carries an error, not caching");
            return false;
        }

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                error!(cache_key = key, error = %e, "failed to serialize result");
                return false;
            }
        };

        let ttl = spec.ttl();
        match self.store.set_raw(key, &raw, ttl).await {
            Ok(()) => {
                debug!(
                    cache_key = key,
                    ttl_ms = ?spec.ttl_seconds.map(|secs| secs.saturating_mul(1000)),
                    "cached result"
                );
                true
            }
            Err(e) => {
                error!(cache_key = key, error = %e, "cache write failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
