//! Wall-clock abstraction for row timestamps and expiry checks.
//!
//! The engine stamps every written row with the current time and computes
//! expiry from it at read time, so the clock is injected rather than read
//! directly. [`SystemClock`] is the production implementation;
//! [`ManualClock`] makes expiry boundaries deterministic in tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Abstraction over the system clock for dependency injection.
///
/// Allows deterministic testing by replacing the real clock with a manual
/// one. The default implementation ([`SystemClock`]) delegates to
/// `std::time::SystemTime`.
pub trait ClockSource: Send + Sync {
    /// Returns the current time as milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Default clock source that reads the real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    /// Millisecond timestamps fit comfortably in i64 until the year 292 million.
    #[allow(clippy::cast_possible_truncation)]
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

/// Settable clock for deterministic tests.
///
/// Starts at the given instant and only moves when told to via
/// [`set`](ManualClock::set) or [`advance`](ManualClock::advance).
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Creates a manual clock pinned at `millis` since the Unix epoch.
    #[must_use]
    pub fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    /// Pins the clock to an absolute instant.
    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    /// Moves the clock forward by `delta_millis`.
    pub fn advance(&self, delta_millis: i64) {
        self.millis.fetch_add(delta_millis, Ordering::SeqCst);
    }
}

impl ClockSource for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic_enough_for_timestamps() {
        let clock = SystemClock;
        let first = clock.now_millis();
        let second = clock.now_millis();
        assert!(second >= first);
        assert!(first > 0);
    }

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_millis(), 1_000);
        assert_eq!(clock.now_millis(), 1_000);

        clock.advance(500);
        assert_eq!(clock.now_millis(), 1_500);

        clock.set(0);
        assert_eq!(clock.now_millis(), 0);
    }
}
