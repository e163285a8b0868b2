//! In-process cache store used when Redis is not configured.

use super::CacheInterface;
use async_trait::async_trait;
use larder_core::LarderResult;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Capacity used by [`MemoryCacheStore::new`].
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    deadline: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.deadline.map_or(true, |deadline| now < deadline)
    }
}

/// Bounded LRU store with per-entry deadlines.
///
/// Once `max_entries` keys are held, each insert evicts the least recently
/// used one. Expired entries are invisible to reads and are dropped when
/// touched, when they reach the LRU tail on insert, or on a pattern sweep.
#[derive(Debug)]
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<String, Entry>>,
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// Store holding at most `max_entries` keys (at least one).
    #[must_use]
    pub fn with_capacity(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.lock().iter().filter(|(_, e)| e.is_live(now)).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys held, live or not.
    #[must_use]
    pub fn held(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}

/// Matches `key` against a glob where `*` matches any run of characters.
pub(crate) fn glob_matches(pattern: &str, key: &str) -> bool {
    let pattern = pattern.as_bytes();
    let key = key.as_bytes();
    let (mut p, mut k) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            backtrack = Some((p, k));
            p += 1;
        } else if p < pattern.len() && pattern[p] == key[k] {
            p += 1;
            k += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            k = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&b| b == b'*')
}

#[async_trait]
impl CacheInterface for MemoryCacheStore {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get_raw(&self, key: &str) -> LarderResult<Option<String>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.pop(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> LarderResult<()> {
        let now = Instant::now();
        let entry = Entry {
            value: value.to_string(),
            deadline: ttl.map(|ttl| now + ttl),
        };

        let mut entries = self.entries.lock();
        while entries.peek_lru().is_some_and(|(_, e)| !e.is_live(now)) {
            entries.pop_lru();
        }
        entries.put(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> LarderResult<bool> {
        let now = Instant::now();
        Ok(self.entries.lock().pop(key).is_some_and(|e| e.is_live(now)))
    }

    async fn exists(&self, key: &str) -> LarderResult<bool> {
        let now = Instant::now();
        Ok(self.entries.lock().peek(key).is_some_and(|e| e.is_live(now)))
    }

    async fn delete_pattern(&self, pattern: &str) -> LarderResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let doomed: Vec<(String, bool)> = entries
            .iter()
            .filter_map(|(key, entry)| {
                let live = entry.is_live(now);
                let matched = live && glob_matches(pattern, key);
                (!live || matched).then(|| (key.clone(), matched))
            })
            .collect();

        let mut deleted = 0;
        for (key, matched) in doomed {
            entries.pop(&key);
            if matched {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn health_check(&self) -> LarderResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_matching() {
        assert!(glob_matches("foods:list*", "foods:list:anonymous"));
        assert!(glob_matches("foods:list*", "foods:list"));
        assert!(glob_matches("food:*:id:42*", "food:u1:id:42"));
        assert!(glob_matches("food:*:id:42*", "food:u1:id:42:aW5j"));
        assert!(glob_matches("*", ""));
        assert!(!glob_matches("food:*:id:42*", "food:u1:id:43"));
        assert!(!glob_matches("foods:list*", "foods:count:u1"));
        assert!(!glob_matches("user_me:u1", "user_me:u12"));
        assert!(glob_matches("a*b*c", "axxbyyc"));
        assert!(!glob_matches("a*b*c", "axxbyy"));
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryCacheStore::new();
        store.set_raw("k", "\"v\"", None).await.unwrap();

        assert_eq!(store.get_raw("k").await.unwrap().as_deref(), Some("\"v\""));
        assert!(store.exists("k").await.unwrap());
        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert_eq!(store.get_raw("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = MemoryCacheStore::new();
        store
            .set_raw("short", "1", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        store.set_raw("long", "2", Some(Duration::from_secs(60))).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(store.get_raw("short").await.unwrap(), None);
        assert_eq!(store.get_raw("long").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_pattern() {
        let store = MemoryCacheStore::new();
        for key in ["foods:list:u1", "foods:list:u2:cGFnZT0x", "foods:count:u1", "food:u1:id:1"] {
            store.set_raw(key, "{}", None).await.unwrap();
        }

        assert_eq!(store.delete_pattern("foods:list*").await.unwrap(), 2);
        assert!(store.exists("foods:count:u1").await.unwrap());
        assert!(store.exists("food:u1:id:1").await.unwrap());
        assert_eq!(store.delete_pattern("nothing*").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_is_bounded_by_capacity() {
        let store = MemoryCacheStore::with_capacity(100);
        for i in 0..5_000 {
            store
                .set_raw(&format!("foods:list:u{i}"), "{}", Some(Duration::from_millis(1)))
                .await
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(store.held() <= 100);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_least_recently_used_key_is_evicted() {
        let store = MemoryCacheStore::with_capacity(2);
        store.set_raw("a", "1", None).await.unwrap();
        store.set_raw("b", "2", None).await.unwrap();
        // touch "a" so "b" becomes the eviction candidate
        assert!(store.get_raw("a").await.unwrap().is_some());
        store.set_raw("c", "3", None).await.unwrap();

        assert!(store.exists("a").await.unwrap());
        assert!(!store.exists("b").await.unwrap());
        assert!(store.exists("c").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_tail_is_dropped_on_insert() {
        let store = MemoryCacheStore::with_capacity(10);
        store.set_raw("old", "1", Some(Duration::from_millis(1))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.set_raw("new", "2", None).await.unwrap();

        assert_eq!(store.held(), 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(MemoryCacheStore::with_capacity(0).capacity(), 1);
    }
}
