//! Injected time source.
//!
//! Verification never reads the system clock directly; it asks a [`Clock`].

use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Freeze at `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Freeze at a Unix timestamp; out-of-range values fall back to the epoch.
    #[must_use]
    pub fn at_timestamp(secs: i64) -> Self {
        Self::new(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }

    /// Move to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(std::sync::PoisonError::into_inner) = now;
    }

    /// Move forward (or backward, for negative values).
    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::at_timestamp(1_700_000_000);
        assert_eq!(clock.now().timestamp(), 1_700_000_000);

        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now().timestamp(), 1_700_000_090);
    }

    #[test]
    fn test_system_clock_is_recent() {
        assert!(SystemClock.now().timestamp() > 1_700_000_000);
    }
}
