//! Shared Cache Handle
//!
//! Cloneable async front for [`CacheStore`]. Every operation takes the lock
//! only for the synchronous store call; `with_cache` drops it before
//! awaiting the fetch so a slow upstream never blocks other readers.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore};
use crate::clock::SharedClock;

// == Shared Cache ==
#[derive(Debug)]
pub struct SharedCache<V> {
    inner: Arc<RwLock<CacheStore<V>>>,
}

impl<V> Clone for SharedCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone> SharedCache<V> {
    /// Wraps an existing store.
    pub fn new(store: CacheStore<V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Builds a fresh store on `clock`.
    pub fn with_clock(default_ttl: u64, clock: SharedClock) -> Self {
        Self::new(CacheStore::with_clock(default_ttl, clock))
    }

    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<u64>) {
        self.inner.write().await.set(key, value, ttl);
    }

    /// Write lock: a read may evict a stale entry and updates counters.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.write().await.get(key)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.inner.write().await.delete(key)
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn cleanup_expired(&self) -> usize {
        self.inner.write().await.cleanup_expired()
    }

    // == With Cache ==
    /// Returns the cached value for `key`, or runs `fetch` and caches its
    /// success for `ttl` seconds (store default when `None` or zero).
    ///
    /// Errors from `fetch` are returned untouched and nothing is stored.
    /// Whatever `fetch` returns on success is cached as-is, including
    /// null-like values such as `serde_json::Value::Null`.
    ///
    /// Two callers that miss on the same key concurrently both run their
    /// fetch; the later write wins.
    pub async fn with_cache<F, Fut, E>(&self, key: &str, ttl: Option<u64>, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            debug!(key, "cache hit");
            return Ok(value);
        }

        debug!(key, "cache miss, fetching");
        let value = fetch().await?;
        self.set(key, value.clone(), ttl).await;
        Ok(value)
    }
}
