//! Request-scoped memo table.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Mutex;

use metrics::counter;
use tracing::debug;

use super::lock::mutex_lock;

pub(crate) const METRIC_MEMORY_CACHE_HIT: &str = "storefront_memory_cache_hit_total";
pub(crate) const METRIC_MEMORY_CACHE_MISS: &str = "storefront_memory_cache_miss_total";

const COMPONENT: &str = "cache::memory";

/// Lazily filled key/value table living as long as its owning service.
///
/// The first lookup of a key runs the computation and stores its result,
/// `None` included; later lookups return a clone of the stored value. There is
/// no expiry and no eviction: the owning service is built per request and
/// dropped with it.
#[derive(Debug)]
pub struct MemoryCache<K, V> {
    name: &'static str,
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Debug,
    V: Clone,
{
    /// Create an empty table; `name` labels its hit/miss metrics.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, key: &K) -> Option<V> {
        mutex_lock(&self.entries, COMPONENT, "get").get(key).cloned()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        mutex_lock(&self.entries, COMPONENT, "contains_key").contains_key(key)
    }

    pub fn insert(&self, key: K, value: V) {
        mutex_lock(&self.entries, COMPONENT, "insert").insert(key, value);
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, COMPONENT, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the stored value for `key`, computing and storing it on first use.
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.lookup(&key) {
            return value;
        }

        let value = compute();
        self.insert(key, value.clone());
        value
    }

    /// Async variant of [`MemoryCache::get_or_insert_with`] for fallible lookups.
    ///
    /// Errors are returned as-is and leave the key absent, so a later call
    /// retries the computation.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.lookup(&key) {
            return Ok(value);
        }

        let value = compute().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    fn lookup(&self, key: &K) -> Option<V> {
        let cached = self.get(key);
        if cached.is_some() {
            counter!(METRIC_MEMORY_CACHE_HIT, "cache" => self.name).increment(1);
        } else {
            counter!(METRIC_MEMORY_CACHE_MISS, "cache" => self.name).increment(1);
            debug!(cache = self.name, key = ?key, "memory cache miss");
        }
        cached
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn computes_once_per_key() {
        let cache: MemoryCache<&str, u32> = MemoryCache::new("test");
        let calls = Cell::new(0);

        for _ in 0..5 {
            let value = cache.get_or_insert_with("answer", || {
                calls.set(calls.get() + 1);
                42
            });
            assert_eq!(value, 42);
        }

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn none_is_a_cached_value() {
        let cache: MemoryCache<u32, Option<String>> = MemoryCache::new("test");
        let calls = Cell::new(0);

        let first = cache.get_or_insert_with(7, || {
            calls.set(calls.get() + 1);
            None
        });
        let second = cache.get_or_insert_with(7, || {
            calls.set(calls.get() + 1);
            Some("late".to_string())
        });

        assert_eq!(first, None);
        assert_eq!(second, None);
        assert_eq!(calls.get(), 1);
        assert!(cache.contains_key(&7));
    }

    #[test]
    fn distinct_keys_compute_separately() {
        let cache: MemoryCache<(u32, &str), String> = MemoryCache::new("test");

        let german = cache.get_or_insert_with((1, "de"), || "moebel".to_string());
        let english = cache.get_or_insert_with((1, "en"), || "furniture".to_string());

        assert_eq!(german, "moebel");
        assert_eq!(english, "furniture");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn colliding_key_returns_the_first_value() {
        let cache: MemoryCache<u32, &str> = MemoryCache::new("test");

        cache.get_or_insert_with(1, || "german");
        // The caller forgot the language in the key: the stale value comes back.
        let value = cache.get_or_insert_with(1, || "english");

        assert_eq!(value, "german");
    }

    #[tokio::test]
    async fn failed_computation_is_not_stored() {
        let cache: MemoryCache<u32, u32> = MemoryCache::new("test");

        let failed: Result<u32, &str> = cache
            .get_or_try_insert_with(1, || async { Err("repository offline") })
            .await;
        assert_eq!(failed, Err("repository offline"));
        assert!(cache.is_empty());

        let recovered: Result<u32, &str> =
            cache.get_or_try_insert_with(1, || async { Ok(9) }).await;
        assert_eq!(recovered, Ok(9));

        let cached: Result<u32, &str> = cache
            .get_or_try_insert_with(1, || async { Err("not called") })
            .await;
        assert_eq!(cached, Ok(9));
    }
}
