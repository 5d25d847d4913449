//! Contracts Module
//!
//! Traits a storage backend implements to be driven by a [`Repository`].
//!
//! [`Repository`]: crate::cache::Repository

mod atomic_store;
mod store;
mod taggable_store;

pub use atomic_store::AtomicStore;
pub use store::Store;
pub use taggable_store::TaggableStore;
