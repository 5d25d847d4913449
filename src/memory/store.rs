//! Memory Store
//!
//! HashMap storage combined with LRU tracking and TTL expiration, behind a
//! single lock so that add and counter updates are atomic.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::contracts::{AtomicStore, Store};
use crate::error::{CacheError, Result};
use crate::memory::{CacheEntry, CacheStats, LruTracker};

// == Memory Store ==
/// In-process store with a capacity limit.
///
/// Expired entries are dropped lazily on access and in bulk by
/// [`cleanup_expired`](MemoryStore::cleanup_expired). When a new key would
/// exceed `max_entries`, the least recently used entry is evicted.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    /// Prepended to every key before it reaches the map
    prefix: String,
}

#[derive(Debug)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    max_entries: usize,
}

impl Inner {
    /// Returns the live entry for `key`, dropping it first if it has expired.
    fn live(&mut self, key: &str) -> Option<&mut CacheEntry> {
        if self.entries.get(key).is_some_and(CacheEntry::is_expired) {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expirations(1);
        }
        self.entries.get_mut(key)
    }

    fn read(&mut self, key: &str) -> Option<Value> {
        let value = self.live(key).map(|entry| entry.value.clone());
        self.stats.record_read(value.is_some());
        if value.is_some() {
            self.lru.touch(key);
        }
        value
    }

    fn write(&mut self, key: &str, value: Value, ttl: Option<u64>) -> bool {
        let is_overwrite = self.live(key).is_some();

        if !is_overwrite && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                    debug!(key = %evicted, "evicted least recently used entry");
                }
                None => return false,
            }
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        self.lru.touch(key);
        true
    }

    fn remove(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }

    fn adjust(&mut self, key: &str, by: i64) -> Result<i64> {
        let Some(entry) = self.live(key) else {
            return if self.write(key, Value::from(by), None) {
                Ok(by)
            } else {
                Err(CacheError::Internal(format!("No room to store {key}")))
            };
        };

        let current = entry
            .value
            .as_i64()
            .ok_or_else(|| CacheError::NotNumeric(key.to_string()))?;
        let next = current
            .checked_add(by)
            .ok_or_else(|| CacheError::Overflow(key.to_string()))?;

        entry.value = Value::from(next);
        self.lru.touch(key);
        Ok(next)
    }
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                lru: LruTracker::new(),
                stats: CacheStats::default(),
                max_entries,
            }),
            prefix: String::new(),
        }
    }

    /// Namespaces every key of this store under `prefix`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    // == Stats ==
    /// Returns a snapshot of the statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            total_entries: inner.entries.len(),
            ..inner.stats
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries and returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let mut inner = self.inner.lock();
        let now = Utc::now();

        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.remove(key);
        }
        inner.stats.record_expirations(expired.len());

        expired.len()
    }

    /// Returns the number of stored entries, expired ones included until cleanup.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns true if nothing is stored, expired entries included.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(usize::MAX)
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.inner.lock().read(&self.key(key))
    }

    fn many(&self, keys: &[String]) -> HashMap<String, Option<Value>> {
        let mut inner = self.inner.lock();
        keys.iter()
            .map(|key| (key.clone(), inner.read(&self.key(key))))
            .collect()
    }

    fn put(&self, key: &str, value: Value, seconds: u64) -> bool {
        self.inner.lock().write(&self.key(key), value, Some(seconds))
    }

    fn put_many(&self, values: HashMap<String, Value>, seconds: u64) -> bool {
        let mut inner = self.inner.lock();
        values.into_iter().fold(true, |ok, (key, value)| {
            inner.write(&self.key(&key), value, Some(seconds)) && ok
        })
    }

    fn increment(&self, key: &str, by: i64) -> Result<i64> {
        self.inner.lock().adjust(&self.key(key), by)
    }

    fn decrement(&self, key: &str, by: i64) -> Result<i64> {
        let by = by
            .checked_neg()
            .ok_or_else(|| CacheError::Overflow(key.to_string()))?;
        self.increment(key, by)
    }

    fn forever(&self, key: &str, value: Value) -> bool {
        self.inner.lock().write(&self.key(key), value, None)
    }

    fn forget(&self, key: &str) -> bool {
        self.inner.lock().remove(&self.key(key))
    }

    fn flush(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.lru.clear();
        true
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn as_atomic(&self) -> Option<&dyn AtomicStore> {
        Some(self)
    }
}

impl AtomicStore for MemoryStore {
    fn add(&self, key: &str, value: Value, seconds: Option<u64>) -> bool {
        let key = self.key(key);
        let mut inner = self.inner.lock();
        if inner.live(&key).is_some() {
            return false;
        }
        inner.write(&key, value, seconds)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread::{self, sleep};
    use std::time::Duration;

    #[test]
    fn test_store_put_and_get() {
        let store = MemoryStore::new(100);

        assert!(store.put("key1", json!("value1"), 60));
        assert_eq!(store.get("key1"), Some(json!("value1")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_falsy_values_are_present() {
        let store = MemoryStore::default();
        store.forever("f", json!(false));
        store.forever("z", json!(0));
        store.forever("n", Value::Null);

        assert_eq!(store.get("f"), Some(json!(false)));
        assert_eq!(store.get("z"), Some(json!(0)));
        assert_eq!(store.get("n"), Some(Value::Null));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_store_forget() {
        let store = MemoryStore::default();
        store.forever("key1", json!(1));

        assert!(store.forget("key1"));
        assert!(!store.forget("key1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_ttl_expiration() {
        let store = MemoryStore::default();
        store.put("key1", json!("value1"), 1);

        assert!(store.get("key1").is_some());
        sleep(Duration::from_millis(1100));

        assert_eq!(store.get("key1"), None);
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_lru_eviction() {
        let store = MemoryStore::new(3);
        store.forever("key1", json!(1));
        store.forever("key2", json!(2));
        store.forever("key3", json!(3));

        // key1 becomes most recent, key2 is now the oldest
        store.get("key1");
        store.forever("key4", json!(4));

        assert_eq!(store.len(), 3);
        assert!(store.get("key1").is_some());
        assert_eq!(store.get("key2"), None);
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_overwrite_does_not_evict() {
        let store = MemoryStore::new(1);
        store.forever("key1", json!(1));
        store.forever("key1", json!(2));

        assert_eq!(store.get("key1"), Some(json!(2)));
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_zero_capacity_rejects_writes() {
        let store = MemoryStore::new(0);
        assert!(!store.forever("key1", json!(1)));
        assert!(!store.add("key1", json!(1), None));
    }

    #[test]
    fn test_store_many_and_put_many() {
        let store = MemoryStore::default();
        let values = HashMap::from([("a".to_string(), json!(1)), ("b".to_string(), json!(2))]);
        assert!(store.put_many(values, 60));

        let keys = vec!["a".to_string(), "c".to_string()];
        let found = store.many(&keys);
        assert_eq!(found.len(), 2);
        assert_eq!(found["a"], Some(json!(1)));
        assert_eq!(found["c"], None);
    }

    #[test]
    fn test_store_increment_and_decrement() {
        let store = MemoryStore::default();

        assert_eq!(store.increment("n", 1), Ok(1));
        assert_eq!(store.increment("n", 5), Ok(6));
        assert_eq!(store.decrement("n", 2), Ok(4));
        assert_eq!(store.get("n"), Some(json!(4)));
    }

    #[test]
    fn test_store_increment_errors() {
        let store = MemoryStore::default();
        store.forever("text", json!("abc"));
        store.forever("max", json!(i64::MAX));

        assert_eq!(
            store.increment("text", 1),
            Err(CacheError::NotNumeric("text".to_string()))
        );
        assert_eq!(
            store.increment("max", 1),
            Err(CacheError::Overflow("max".to_string()))
        );
        assert!(matches!(
            store.decrement("max", i64::MIN),
            Err(CacheError::Overflow(_))
        ));
    }

    #[test]
    fn test_store_increment_keeps_expiry() {
        let store = MemoryStore::default();
        store.put("n", json!(1), 1);
        store.increment("n", 1).unwrap();

        sleep(Duration::from_millis(1100));
        assert_eq!(store.get("n"), None);
    }

    #[test]
    fn test_store_add_only_when_absent() {
        let store = MemoryStore::default();

        assert!(store.add("k", json!(1), None));
        assert!(!store.add("k", json!(2), Some(60)));
        assert_eq!(store.get("k"), Some(json!(1)));
        assert!(store.as_atomic().is_some());
    }

    #[test]
    fn test_store_add_is_atomic_across_threads() {
        let store = Arc::new(MemoryStore::default());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.add("lock", json!(i), None))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|added| *added)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_store_prefix() {
        let store = MemoryStore::default().with_prefix("app:");
        store.forever("k", json!(1));

        assert_eq!(store.prefix(), "app:");
        assert_eq!(store.get("k"), Some(json!(1)));
        assert!(store.forget("k"));
    }

    #[test]
    fn test_store_flush() {
        let store = MemoryStore::default();
        store.forever("a", json!(1));
        store.forever("b", json!(2));

        assert!(store.flush());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_stats() {
        let store = MemoryStore::default();
        store.forever("key1", json!(1));
        store.get("key1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let store = MemoryStore::default();
        store.put("key1", json!(1), 1);
        store.put("key2", json!(2), 10);

        sleep(Duration::from_millis(1100));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").is_some());
    }
}
