//! Testing utilities for Seatline reducers and stores.
//!
//! Provides the [`ReducerTest`] Given/When/Then harness and a manually
//! advanced [`FixedClock`] so deadline logic can be tested without sleeping.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod reducer_test;

pub use reducer_test::ReducerTest;
// Re-exported so test crates can call `clock.now()` without a direct
// dependency on the core crate.
pub use seatline_core::Clock;

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

/// A clock that only moves when the test says so.
///
/// Starts at a fixed instant and advances via [`advance`](Self::advance),
/// which makes expiry deadlines deterministic: create a transfer, advance
/// past its TTL, and sweep; no sleeping, no flakiness.
#[derive(Debug)]
pub struct FixedClock {
    start: DateTime<Utc>,
    offset_micros: AtomicI64,
}

impl FixedClock {
    /// Creates a clock pinned at `start`.
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            offset_micros: AtomicI64::new(0),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.offset_micros
            .fetch_add(delta.num_microseconds().unwrap_or(i64::MAX), Ordering::SeqCst);
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        // An arbitrary but stable instant; tests that care pass their own.
        Self::new(DateTime::UNIX_EPOCH + Duration::days(20_000))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.start + Duration::microseconds(self.offset_micros.load(Ordering::SeqCst))
    }
}

/// A shared [`FixedClock`] at the default instant.
#[must_use]
pub fn test_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances_only_on_demand() {
        let clock = FixedClock::default();
        let before = clock.now();
        assert_eq!(clock.now(), before);

        clock.advance(Duration::hours(2));
        assert_eq!(clock.now(), before + Duration::hours(2));
    }
}
