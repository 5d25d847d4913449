//! Memory Store Module
//!
//! In-process [`Store`](crate::contracts::Store) with TTL expiration, LRU
//! eviction and atomic add.

mod entry;
mod lru;
mod stats;
mod store;

pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::MemoryStore;
