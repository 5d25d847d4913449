//! Taggable Store Contract
//!
//! Extension point for stores that can partition entries by tag.
//! No store in this crate implements it.

use super::Store;

/// A [`Store`] able to hand out views scoped to a set of tags.
pub trait TaggableStore: Store {
    /// Begins a tagged operation over the given tag names.
    fn tags(&self, names: &[String]) -> Box<dyn Store>;
}
