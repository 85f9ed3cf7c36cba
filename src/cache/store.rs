//! Cache Store Module
//!
//! Synchronous cache engine: a HashMap of [`CacheEntry`] values with lazy
//! expiry on read and a bulk sweep for the background cleanup task.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, DEFAULT_TTL_SECS};
use crate::clock::{SharedClock, SystemClock};

// == Cache Store ==
/// Process-local key/value store with per-entry TTL.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL in seconds used when a caller gives none (or zero)
    default_ttl: u64,
    clock: SharedClock,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a store on the system clock.
    ///
    /// A `default_ttl` of zero is replaced by [`DEFAULT_TTL_SECS`].
    pub fn new(default_ttl: u64) -> Self {
        Self::with_clock(default_ttl, std::sync::Arc::new(SystemClock))
    }

    /// Creates a store reading time from `clock`.
    pub fn with_clock(default_ttl: u64, clock: SharedClock) -> Self {
        let default_ttl = if default_ttl == 0 {
            DEFAULT_TTL_SECS
        } else {
            default_ttl
        };

        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
            clock,
        }
    }

    /// The TTL applied when none is given.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    // == Effective TTL ==
    /// Resolves a caller-supplied TTL, substituting the default for
    /// missing or non-positive values.
    pub fn effective_ttl(&self, ttl: Option<u64>) -> u64 {
        match ttl {
            Some(secs) if secs > 0 => secs,
            _ => self.default_ttl,
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry and its TTL.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<u64>) {
        let ttl = self.effective_ttl(ttl);
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl);
        self.entries.insert(key.into(), entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the value for `key` if present and still fresh.
    ///
    /// A stale entry is removed on the spot and counted as a miss.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                self.stats.record_expirations(1);
                self.stats.record_miss();
                self.stats.set_total_entries(self.entries.len());
                debug!(key, "cache entry expired on read");
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Looks at the raw entry without touching stats or evicting.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    // == Delete ==
    /// Removes `key`. Returns whether an entry was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Clear ==
    /// Drops every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();

        self.entries.retain(|_, entry| !entry.is_expired_at(now));

        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;
    use std::time::Duration;

    fn store_with_clock() -> (CacheStore<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        (CacheStore::with_clock(300, clock.clone()), clock)
    }

    #[test]
    fn test_store_new() {
        let store: CacheStore<String> = CacheStore::new(300);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.default_ttl(), 300);
    }

    #[test]
    fn test_store_zero_default_falls_back() {
        let store: CacheStore<String> = CacheStore::new(0);
        assert_eq!(store.default_ttl(), DEFAULT_TTL_SECS);
    }

    #[test]
    fn test_store_set_and_get() {
        let (mut store, _) = store_with_clock();

        store.set("test-key", "test".to_string(), None);

        assert_eq!(store.get("test-key"), Some("test".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let (mut store, _) = store_with_clock();
        assert_eq!(store.get("never-set"), None);
    }

    #[test]
    fn test_store_short_ttl_expires() {
        let (mut store, clock) = store_with_clock();

        store.set("x", "y".to_string(), Some(1));
        assert_eq!(store.get("x"), Some("y".to_string()));

        clock.advance(Duration::from_secs(2));
        assert_eq!(store.get("x"), None);
        assert!(store.is_empty(), "expired read should evict the entry");
    }

    #[test]
    fn test_store_expiry_boundary() {
        let (mut store, clock) = store_with_clock();

        store.set("k", "v".to_string(), Some(10));

        clock.advance(Duration::from_millis(9_999));
        assert!(store.get("k").is_some());

        clock.advance(Duration::from_millis(1));
        assert!(store.get("k").is_none());
    }

    #[test]
    fn test_store_default_ttl_matches_explicit() {
        let (mut store, _) = store_with_clock();

        store.set("implicit", "v".to_string(), None);
        store.set("explicit", "v".to_string(), Some(300));
        store.set("zero", "v".to_string(), Some(0));

        let implicit = store.peek("implicit").unwrap().expires_at;
        assert_eq!(implicit, store.peek("explicit").unwrap().expires_at);
        assert_eq!(implicit, store.peek("zero").unwrap().expires_at);
    }

    #[test]
    fn test_store_overwrite_resets_ttl() {
        let (mut store, clock) = store_with_clock();

        store.set("key1", "value1".to_string(), Some(5));
        clock.advance(Duration::from_secs(4));
        store.set("key1", "value2".to_string(), Some(5));
        clock.advance(Duration::from_secs(4));

        assert_eq!(store.get("key1"), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_delete() {
        let (mut store, _) = store_with_clock();

        store.set("key1", "value1".to_string(), None);
        assert!(store.delete("key1"));
        assert!(!store.delete("key1"), "second delete is a no-op");
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_clear() {
        let (mut store, _) = store_with_clock();

        store.set("a", "1".to_string(), None);
        store.set("b", "2".to_string(), None);
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), None);
    }

    #[test]
    fn test_store_stats() {
        let (mut store, clock) = store_with_clock();

        store.set("key1", "value1".to_string(), Some(1));
        store.get("key1"); // hit
        store.get("nonexistent"); // miss
        clock.advance(Duration::from_secs(1));
        store.get("key1"); // miss + expiration

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let (mut store, clock) = store_with_clock();

        store.set("key1", "value1".to_string(), Some(1));
        store.set("key2", "value2".to_string(), Some(10));

        clock.advance(Duration::from_secs(2));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("key2"), Some("value2".to_string()));
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_structured_values() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = CacheStore::with_clock(300, clock);

        let value = serde_json::json!({ "message": "test" });
        store.set("test-key", value.clone(), None);

        assert_eq!(store.get("test-key"), Some(value));
    }
}
