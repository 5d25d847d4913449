//! Store Contract
//!
//! The minimal key/value backend a repository drives.

use std::collections::HashMap;

use serde_json::Value;

use super::{AtomicStore, TaggableStore};
use crate::error::Result;

// == Store ==
/// Raw key/value operations with expiry.
///
/// Implementations own expiry enforcement, eviction and the atomicity of
/// their counters. Writes report success as a `bool`; a missing key is
/// `None`, never an error, so a stored `false`, `0` or `null` stays
/// distinguishable from absence.
pub trait Store: Send + Sync {
    /// Retrieves an item from the store by key.
    fn get(&self, key: &str) -> Option<Value>;

    /// Retrieves multiple items from the store by key.
    ///
    /// The result holds exactly the requested keys; missing items map to `None`.
    fn many(&self, keys: &[String]) -> HashMap<String, Option<Value>> {
        keys.iter()
            .map(|key| (key.clone(), self.get(key)))
            .collect()
    }

    /// Stores an item for a given number of seconds. `seconds` is never zero.
    fn put(&self, key: &str, value: Value, seconds: u64) -> bool;

    /// Stores multiple items for a given number of seconds.
    fn put_many(&self, values: HashMap<String, Value>, seconds: u64) -> bool {
        values
            .into_iter()
            .fold(true, |ok, (key, value)| self.put(&key, value, seconds) && ok)
    }

    /// Increments the integer stored under `key` and returns the new value.
    ///
    /// A missing key counts from zero.
    fn increment(&self, key: &str, by: i64) -> Result<i64>;

    /// Decrements the integer stored under `key` and returns the new value.
    fn decrement(&self, key: &str, by: i64) -> Result<i64>;

    /// Stores an item with no expiry.
    fn forever(&self, key: &str, value: Value) -> bool;

    /// Removes an item from the store.
    fn forget(&self, key: &str) -> bool;

    /// Removes all items from the store.
    fn flush(&self) -> bool;

    /// Returns the key prefix the store namespaces its entries with.
    fn prefix(&self) -> &str;

    /// Returns the atomic add capability, if the store has one.
    fn as_atomic(&self) -> Option<&dyn AtomicStore> {
        None
    }

    /// Returns the tagging capability, if the store has one.
    fn as_taggable(&self) -> Option<&dyn TaggableStore> {
        None
    }
}
