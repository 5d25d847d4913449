//! Atomic Store Contract
//!
//! Optional capability for stores that can insert-if-absent in one step.

use serde_json::Value;

use super::Store;

// == Atomic Store ==
/// A [`Store`] that can add a key only when it is absent, atomically.
///
/// Exposed to the repository through [`Store::as_atomic`].
pub trait AtomicStore: Store {
    /// Stores an item if the key does not exist.
    ///
    /// `seconds` of `None` stores the item without expiry. Returns `true`
    /// only when this call wrote the value.
    fn add(&self, key: &str, value: Value, seconds: Option<u64>) -> bool;
}
