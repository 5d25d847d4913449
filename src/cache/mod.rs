//! Cache Module
//!
//! The repository facade and the argument types it resolves: TTLs and
//! lazily computed defaults.

mod lazy;
mod repository;
mod ttl;

#[cfg(test)]
mod property_tests;

pub use lazy::Lazy;
pub use repository::{Repository, DEFAULT_CACHE_TIME};
pub use ttl::Ttl;
