//! Time source used for cache expiry
//!
//! The catalog client and the cache backends never call `Utc::now()` directly.
//! They ask a `Clock`, so tests can pin and advance time deterministically.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// A source of the current time
pub trait Clock: Send + Sync {
    /// Returns the current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock frozen at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_is_frozen() {
        let start = Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(start);

        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_fixed_clock_advance() {
        let start = Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::new(start);

        clock.advance(Duration::seconds(3600));

        assert_eq!(clock.now(), start + Duration::hours(1));
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
