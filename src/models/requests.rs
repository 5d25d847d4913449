//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies. A `ttl` is signed
//! seconds: absent stores forever, zero or less deletes.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::cache::Ttl;

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Validates a single key.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

fn validate_keys<'a>(keys: impl IntoIterator<Item = &'a String>) -> Option<String> {
    keys.into_iter().find_map(|key| validate_key(key))
}

/// Request body for PUT /cache/:key and POST /cache/:key/add
#[derive(Debug, Clone, Deserialize)]
pub struct PutRequest {
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<i64>,
}

impl PutRequest {
    pub fn ttl(&self) -> Ttl {
        Ttl::from(self.ttl)
    }
}

/// Request body for POST /cache/:key/increment and /decrement
#[derive(Debug, Clone, Deserialize)]
pub struct CounterRequest {
    /// Amount to add or subtract
    #[serde(default = "default_step")]
    pub by: i64,
}

fn default_step() -> i64 {
    1
}

impl Default for CounterRequest {
    fn default() -> Self {
        Self { by: default_step() }
    }
}

/// Request body for POST /batch/get
#[derive(Debug, Clone, Deserialize)]
pub struct ManyRequest {
    /// Keys to read
    pub keys: Vec<String>,
    /// Value reported for missing keys
    #[serde(default)]
    pub default: Option<Value>,
}

impl ManyRequest {
    pub fn validate(&self) -> Option<String> {
        validate_keys(&self.keys)
    }
}

/// Request body for PUT /batch
#[derive(Debug, Clone, Deserialize)]
pub struct PutManyRequest {
    /// Key/value pairs to store
    pub values: HashMap<String, Value>,
    /// Optional TTL in seconds for the whole batch
    #[serde(default)]
    pub ttl: Option<i64>,
}

impl PutManyRequest {
    pub fn validate(&self) -> Option<String> {
        validate_keys(self.values.keys())
    }

    pub fn ttl(&self) -> Ttl {
        Ttl::from(self.ttl)
    }
}

/// Request body for POST /batch/forget
#[derive(Debug, Clone, Deserialize)]
pub struct ForgetManyRequest {
    /// Keys to delete
    pub keys: Vec<String>,
}

impl ForgetManyRequest {
    pub fn validate(&self) -> Option<String> {
        validate_keys(&self.keys)
    }
}
