//! Lazy Module
//!
//! A value that is either given up front or computed when first needed.

use std::fmt;

/// A literal value or a deferred computation producing one.
///
/// Used for defaults: a deferred default only runs when the key is missing.
pub enum Lazy<'a, T> {
    Literal(T),
    Deferred(Box<dyn FnOnce() -> T + 'a>),
}

impl<'a, T> Lazy<'a, T> {
    /// Wraps a closure to be evaluated on [`resolve`](Lazy::resolve).
    pub fn deferred<F>(f: F) -> Self
    where
        F: FnOnce() -> T + 'a,
    {
        Lazy::Deferred(Box::new(f))
    }

    /// Produces the value, running the closure if there is one.
    pub fn resolve(self) -> T {
        match self {
            Lazy::Literal(value) => value,
            Lazy::Deferred(f) => f(),
        }
    }
}

impl<'a, T> From<T> for Lazy<'a, T> {
    fn from(value: T) -> Self {
        Lazy::Literal(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Lazy<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lazy::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Lazy::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}
