//! Cache Repository - a caching facade over pluggable stores
//!
//! [`Repository`] applies TTL, default-value and atomic-add policy on top of
//! any [`Store`]. [`MemoryStore`] is the bundled in-process backend, and the
//! `api` module serves a repository over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod contracts;
pub mod error;
pub mod memory;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Lazy, Repository, Ttl};
pub use config::Config;
pub use contracts::{AtomicStore, Store, TaggableStore};
pub use error::{CacheError, Result};
pub use memory::MemoryStore;
pub use tasks::spawn_cleanup_task;
