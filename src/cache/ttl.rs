//! TTL Module
//!
//! Time-to-live arguments and their resolution into seconds remaining.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

// == TTL ==
/// Expiry requested by a caller for a write.
///
/// Resolution yields `None` for [`Ttl::Forever`] and otherwise a signed
/// number of seconds; zero or less means the entry must not survive the call.
#[derive(Default)]
pub enum Ttl {
    /// No expiry. This is what an omitted TTL means.
    #[default]
    Forever,
    /// Seconds from now.
    Seconds(i64),
    /// Duration from now, truncated to whole seconds.
    Duration(TimeDelta),
    /// Absolute instant, measured against the clock at resolution time.
    At(DateTime<Utc>),
    /// Computed on demand, only when the write actually happens.
    Deferred(Box<dyn FnOnce() -> Ttl + Send>),
}

impl Ttl {
    /// Builds a TTL of `seconds` from now.
    pub fn seconds(seconds: i64) -> Self {
        Ttl::Seconds(seconds)
    }

    /// Builds a TTL computed lazily by `f`.
    pub fn deferred<F>(f: F) -> Self
    where
        F: FnOnce() -> Ttl + Send + 'static,
    {
        Ttl::Deferred(Box::new(f))
    }

    /// Returns true if this is [`Ttl::Forever`]. Deferred TTLs are not evaluated.
    pub fn is_forever(&self) -> bool {
        matches!(self, Ttl::Forever)
    }

    // == Resolve ==
    /// Resolves to seconds remaining relative to the current time.
    pub fn resolve(self) -> Option<i64> {
        self.resolve_at(Utc::now())
    }

    /// Resolves to seconds remaining relative to `now`.
    ///
    /// Each deferred closure is invoked at most once.
    pub fn resolve_at(self, now: DateTime<Utc>) -> Option<i64> {
        match self {
            Ttl::Forever => None,
            Ttl::Seconds(seconds) => Some(seconds),
            Ttl::Duration(duration) => Some(duration.num_seconds()),
            Ttl::At(instant) => Some((instant - now).num_seconds()),
            Ttl::Deferred(f) => f().resolve_at(now),
        }
    }
}

impl fmt::Debug for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::Forever => f.write_str("Forever"),
            Ttl::Seconds(seconds) => f.debug_tuple("Seconds").field(seconds).finish(),
            Ttl::Duration(duration) => f.debug_tuple("Duration").field(duration).finish(),
            Ttl::At(instant) => f.debug_tuple("At").field(instant).finish(),
            Ttl::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

// == Conversions ==
impl From<i64> for Ttl {
    fn from(seconds: i64) -> Self {
        Ttl::Seconds(seconds)
    }
}

impl From<i32> for Ttl {
    fn from(seconds: i32) -> Self {
        Ttl::Seconds(i64::from(seconds))
    }
}

impl From<u64> for Ttl {
    fn from(seconds: u64) -> Self {
        Ttl::Seconds(i64::try_from(seconds).unwrap_or(i64::MAX))
    }
}

impl From<TimeDelta> for Ttl {
    fn from(duration: TimeDelta) -> Self {
        Ttl::Duration(duration)
    }
}

impl From<std::time::Duration> for Ttl {
    fn from(duration: std::time::Duration) -> Self {
        Ttl::Duration(TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX))
    }
}

impl From<DateTime<Utc>> for Ttl {
    fn from(instant: DateTime<Utc>) -> Self {
        Ttl::At(instant)
    }
}

impl<T: Into<Ttl>> From<Option<T>> for Ttl {
    fn from(ttl: Option<T>) -> Self {
        ttl.map_or(Ttl::Forever, Into::into)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_forever_resolves_to_none() {
        assert_eq!(Ttl::Forever.resolve(), None);
        assert!(Ttl::default().is_forever());
    }

    #[test]
    fn test_seconds_and_durations() {
        assert_eq!(Ttl::from(60).resolve(), Some(60));
        assert_eq!(Ttl::from(-5i64).resolve(), Some(-5));
        assert_eq!(Ttl::from(TimeDelta::minutes(2)).resolve(), Some(120));
        assert_eq!(
            Ttl::from(std::time::Duration::from_millis(2500)).resolve(),
            Some(2)
        );
    }

    #[test]
    fn test_instant_is_relative_to_now() {
        let now = Utc::now();
        assert_eq!(Ttl::At(now + TimeDelta::seconds(30)).resolve_at(now), Some(30));
        assert_eq!(Ttl::At(now - TimeDelta::seconds(30)).resolve_at(now), Some(-30));
    }

    #[test]
    fn test_option_conversion() {
        assert!(Ttl::from(None::<i64>).is_forever());
        assert_eq!(Ttl::from(Some(10i64)).resolve(), Some(10));
    }

    #[test]
    fn test_deferred_invoked_once_on_resolve() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let ttl = Ttl::deferred(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ttl::Seconds(15)
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(ttl.resolve(), Some(15));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_deferred_ttl_moves_across_threads() {
        let ttl = Ttl::deferred(|| Ttl::Seconds(45));

        let resolved = std::thread::spawn(move || ttl.resolve())
            .join()
            .unwrap();
        assert_eq!(resolved, Some(45));
    }

    #[test]
    fn test_deferred_can_yield_forever() {
        assert_eq!(Ttl::deferred(|| Ttl::Forever).resolve(), None);
    }
}
