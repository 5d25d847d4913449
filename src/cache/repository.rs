//! Cache Repository
//!
//! Backend-agnostic caching policy in front of a single [`Store`].

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::cache::{Lazy, Ttl};
use crate::contracts::Store;
use crate::error::Result;

/// Default number of seconds for [`Repository::default_cache_time`].
pub const DEFAULT_CACHE_TIME: i64 = 3600;

// == Repository ==
/// The caching API application code talks to.
///
/// Every call is translated into one or more calls on the wrapped store:
/// TTLs are resolved into whole seconds (a TTL that has already run out turns
/// a write into a delete), defaults are filled in for missing keys, and
/// insert-if-absent is delegated to the store when it supports it atomically.
///
/// The repository keeps no per-key state and does no locking of its own. It
/// is as thread-safe as its store.
#[derive(Debug)]
pub struct Repository<S: Store> {
    store: S,
    default_cache_time: i64,
}

impl<S: Store> Repository<S> {
    // == Constructor ==
    /// Creates a repository owning `store`, with a default cache time of one hour.
    pub fn new(store: S) -> Self {
        Self::with_default_cache_time(store, DEFAULT_CACHE_TIME)
    }

    /// Creates a repository with an explicit default cache time in seconds.
    pub fn with_default_cache_time(store: S, seconds: i64) -> Self {
        Self {
            store,
            default_cache_time: seconds,
        }
    }

    // == Reads ==
    /// Determines if an item exists in the cache.
    ///
    /// Only suitable for warming-type checks: another caller may remove the
    /// item between this returning `true` and a following read or write.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Determines if an item doesn't exist in the cache.
    pub fn missing(&self, key: &str) -> bool {
        !self.has(key)
    }

    /// Retrieves an item from the cache by key.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.get(self.item_key(key))
    }

    /// Retrieves an item, falling back to `default` when it is missing.
    ///
    /// A deferred default is only evaluated on a miss.
    pub fn get_or<'a>(&self, key: &str, default: impl Into<Lazy<'a, Value>>) -> Value {
        match self.get(key) {
            Some(value) => value,
            None => default.into().resolve(),
        }
    }

    /// Retrieves multiple items. Missing items map to `None`.
    pub fn many<K: AsRef<str>>(&self, keys: &[K]) -> HashMap<String, Option<Value>> {
        let keys: Vec<String> = keys
            .iter()
            .map(|key| self.item_key(key.as_ref()).to_string())
            .collect();
        self.store.many(&keys)
    }

    /// Retrieves the keys of `defaults`, using each key's default when it is missing.
    pub fn many_or(&self, defaults: HashMap<String, Value>) -> HashMap<String, Value> {
        let mut found = {
            let keys: Vec<&String> = defaults.keys().collect();
            self.many(&keys)
        };

        defaults
            .into_iter()
            .map(|(key, default)| {
                let value = found.remove(&key).flatten().unwrap_or(default);
                (key, value)
            })
            .collect()
    }

    /// Obtains multiple items, using the same `default` for every missing one.
    pub fn get_multiple<K: AsRef<str>>(
        &self,
        keys: &[K],
        default: Option<Value>,
    ) -> HashMap<String, Option<Value>> {
        self.many(keys)
            .into_iter()
            .map(|(key, value)| (key, value.or_else(|| default.clone())))
            .collect()
    }

    /// Retrieves an item and deletes it.
    pub fn pull(&self, key: &str) -> Option<Value> {
        let value = self.get(key);
        self.forget(key);
        value
    }

    /// Retrieves an item or `default`, then deletes the key either way.
    pub fn pull_or<'a>(&self, key: &str, default: impl Into<Lazy<'a, Value>>) -> Value {
        let value = self.get_or(key, default);
        self.forget(key);
        value
    }

    // == Writes ==
    /// Stores an item in the cache.
    ///
    /// [`Ttl::Forever`] stores without expiry. A TTL resolving to zero or
    /// fewer seconds deletes the key instead and returns the delete's result.
    pub fn put(&self, key: &str, value: Value, ttl: impl Into<Ttl>) -> bool {
        match ttl.into().resolve() {
            None => self.forever(key, value),
            Some(seconds) => match positive_seconds(seconds) {
                Some(seconds) => self.store.put(self.item_key(key), value, seconds),
                None => {
                    debug!(key, seconds, "ttl already elapsed, forgetting key");
                    self.forget(key)
                }
            },
        }
    }

    /// Alias of [`put`](Repository::put).
    pub fn set(&self, key: &str, value: Value, ttl: impl Into<Ttl>) -> bool {
        self.put(key, value, ttl)
    }

    /// Stores multiple items under one TTL.
    ///
    /// Returns `true` only if every write succeeded. A TTL resolving to zero
    /// or fewer seconds deletes every key of the batch instead.
    pub fn put_many(&self, values: HashMap<String, Value>, ttl: impl Into<Ttl>) -> bool {
        match ttl.into().resolve() {
            None => self.put_many_forever(values),
            Some(seconds) => match positive_seconds(seconds) {
                Some(seconds) => {
                    let values = values
                        .into_iter()
                        .map(|(key, value)| (self.item_key(&key).to_string(), value))
                        .collect();
                    self.store.put_many(values, seconds)
                }
                None => {
                    let keys: Vec<String> = values.into_keys().collect();
                    debug!(count = keys.len(), "ttl already elapsed, forgetting batch");
                    self.delete_multiple(&keys)
                }
            },
        }
    }

    /// Alias of [`put_many`](Repository::put_many).
    pub fn set_multiple(&self, values: HashMap<String, Value>, ttl: impl Into<Ttl>) -> bool {
        self.put_many(values, ttl)
    }

    fn put_many_forever(&self, values: HashMap<String, Value>) -> bool {
        let mut result = true;
        for (key, value) in values {
            if !self.forever(&key, value) {
                result = false;
            }
        }
        result
    }

    /// Stores an item only if the key does not exist yet.
    ///
    /// A TTL that has already elapsed fails without touching the store. If
    /// the store implements [`AtomicStore`](crate::contracts::AtomicStore) the
    /// check and the write happen as one operation; otherwise this falls back
    /// to a read followed by a write, which concurrent writers can race.
    pub fn add(&self, key: &str, value: Value, ttl: impl Into<Ttl>) -> bool {
        let seconds = match ttl.into().resolve() {
            None => None,
            Some(seconds) => match positive_seconds(seconds) {
                Some(seconds) => Some(seconds),
                None => return false,
            },
        };

        if let Some(store) = self.store.as_atomic() {
            return store.add(self.item_key(key), value, seconds);
        }

        debug!(key, "store has no atomic add, checking before writing");
        if self.get(key).is_some() {
            return false;
        }

        match seconds {
            Some(seconds) => self.store.put(self.item_key(key), value, seconds),
            None => self.forever(key, value),
        }
    }

    /// Increments the value of an item by one.
    pub fn increment(&self, key: &str) -> Result<i64> {
        self.increment_by(key, 1)
    }

    /// Increments the value of an item by `by`.
    pub fn increment_by(&self, key: &str, by: i64) -> Result<i64> {
        self.store.increment(self.item_key(key), by)
    }

    /// Decrements the value of an item by one.
    pub fn decrement(&self, key: &str) -> Result<i64> {
        self.decrement_by(key, 1)
    }

    /// Decrements the value of an item by `by`.
    pub fn decrement_by(&self, key: &str, by: i64) -> Result<i64> {
        self.store.decrement(self.item_key(key), by)
    }

    /// Stores an item in the cache indefinitely.
    pub fn forever(&self, key: &str, value: Value) -> bool {
        self.store.forever(self.item_key(key), value)
    }

    // == Memoization ==
    /// Gets an item, or computes it, stores it for `ttl` and returns it.
    ///
    /// `compute` runs only on a miss. Its error is returned as-is and nothing
    /// is stored. Two callers missing at once may both compute; the last
    /// write wins.
    pub fn remember<F, E>(
        &self,
        key: &str,
        ttl: impl Into<Ttl>,
        compute: F,
    ) -> std::result::Result<Value, E>
    where
        F: FnOnce() -> std::result::Result<Value, E>,
    {
        let ttl = ttl.into();
        self.remember_by(key, move |_| ttl, compute)
    }

    /// Like [`remember`](Repository::remember), with the TTL derived from the
    /// computed value.
    pub fn remember_by<T, F, E>(
        &self,
        key: &str,
        ttl_for: T,
        compute: F,
    ) -> std::result::Result<Value, E>
    where
        T: FnOnce(&Value) -> Ttl,
        F: FnOnce() -> std::result::Result<Value, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = compute()?;
        let ttl = ttl_for(&value);
        self.put(key, value.clone(), ttl);
        Ok(value)
    }

    /// Gets an item, or computes it and stores it forever.
    pub fn remember_forever<F, E>(&self, key: &str, compute: F) -> std::result::Result<Value, E>
    where
        F: FnOnce() -> std::result::Result<Value, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = compute()?;
        self.forever(key, value.clone());
        Ok(value)
    }

    /// Alias of [`remember_forever`](Repository::remember_forever).
    pub fn sear<F, E>(&self, key: &str, compute: F) -> std::result::Result<Value, E>
    where
        F: FnOnce() -> std::result::Result<Value, E>,
    {
        self.remember_forever(key, compute)
    }

    // == Deletes ==
    /// Removes an item from the cache.
    pub fn forget(&self, key: &str) -> bool {
        self.store.forget(self.item_key(key))
    }

    /// Alias of [`forget`](Repository::forget).
    pub fn delete(&self, key: &str) -> bool {
        self.forget(key)
    }

    /// Deletes every key, returning `true` only if every delete succeeded.
    ///
    /// A failing key does not stop the remaining deletes.
    pub fn delete_multiple<K: AsRef<str>>(&self, keys: &[K]) -> bool {
        let mut result = true;
        for key in keys {
            if !self.forget(key.as_ref()) {
                result = false;
            }
        }
        result
    }

    /// Flushes the whole store, including keys not written through this repository.
    pub fn clear(&self) -> bool {
        self.store.flush()
    }

    // == Configuration ==
    /// Returns the default cache time in seconds.
    pub fn default_cache_time(&self) -> i64 {
        self.default_cache_time
    }

    /// Sets the default cache time in seconds.
    pub fn set_default_cache_time(&mut self, seconds: i64) -> &mut Self {
        self.default_cache_time = seconds;
        self
    }

    /// Returns the wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // Keys reach the store unchanged; namespacing is the store's concern.
    fn item_key<'k>(&self, key: &'k str) -> &'k str {
        key
    }
}

fn positive_seconds(seconds: i64) -> Option<u64> {
    u64::try_from(seconds).ok().filter(|seconds| *seconds > 0)
}
