//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::memory::CacheStats;

/// Response body for reads of a single key (GET /cache/:key, POST /cache/:key/pull)
#[derive(Debug, Clone, Serialize)]
pub struct ValueResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl ValueResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for single-key writes and deletes
#[derive(Debug, Clone, Serialize)]
pub struct WriteResponse {
    /// The key that was written or deleted
    pub key: String,
    /// Whether the store reported success
    pub success: bool,
}

impl WriteResponse {
    pub fn new(key: impl Into<String>, success: bool) -> Self {
        Self {
            key: key.into(),
            success,
        }
    }
}

/// Response body for counter operations
#[derive(Debug, Clone, Serialize)]
pub struct CounterResponse {
    pub key: String,
    /// The counter value after the operation
    pub value: i64,
}

impl CounterResponse {
    pub fn new(key: impl Into<String>, value: i64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for POST /batch/get; missing keys without a default are null
#[derive(Debug, Clone, Serialize)]
pub struct ManyResponse {
    pub values: HashMap<String, Option<Value>>,
}

/// Response body for batch writes and deletes, and for clearing the cache
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    /// True only if every key succeeded
    pub success: bool,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Number of entries dropped after their TTL elapsed
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Repository default cache time in seconds
    pub default_cache_time: i64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from store statistics
    pub fn new(stats: CacheStats, default_cache_time: i64) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            default_cache_time,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
