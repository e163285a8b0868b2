//! Caching for the service and HTTP layers.
//!
//! A single [`CacheInterface`] store (Redis or in-process) backs both the
//! typed service-level caching of [`CacheExt`] and the per-route response
//! cache: [`ResponseCache`] for reads and [`CacheInvalidator`] for writes.

mod cache_interface;
pub mod cache_keys;
mod context;
mod invalidator;
mod memory_cache;
mod redis_cache;
mod response_cache;

pub use cache_interface::{CacheExt, CacheInterface};
#[cfg(test)]
pub use cache_interface::MockCacheInterface;
pub use context::RequestContext;
pub use invalidator::{CacheInvalidator, EvictionSpec};
pub use memory_cache::MemoryCacheStore;
pub use redis_cache::RedisCacheService;
pub use response_cache::{CacheKeySpec, CacheLookup, ResponseCache};

use std::time::Duration;

/// Lifetime of cached identity lookups.
pub const IDENTITY_TTL: Duration = Duration::from_secs(300);
