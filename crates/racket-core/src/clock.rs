//! Injected time sources.
//!
//! The simulation engines take `now` as an argument, and the session gets
//! that instant from a [`Clock`] it was constructed with. Production uses
//! [`SystemClock`]; tests use [`ManualClock`] and advance it explicitly,
//! so "wait three hours" is a method call instead of a sleep.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// A source of the current instant.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a system clock.
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A hand-driven clock for deterministic tests.
///
/// Stores whole epoch seconds behind an `Arc`, so clones share one
/// timeline and `advance` works through a shared reference even while
/// the session owns another clone.
#[derive(Debug, Clone)]
pub struct ManualClock {
    epoch_secs: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a manual clock starting at the given instant.
    ///
    /// Sub-second precision is truncated; the simulation deals in whole
    /// seconds everywhere.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            epoch_secs: Arc::new(AtomicI64::new(start.timestamp())),
        }
    }

    /// Move the clock forward by whole seconds.
    pub fn advance_secs(&self, secs: i64) {
        self.epoch_secs.fetch_add(secs, Ordering::SeqCst);
    }

    /// Jump the clock to an absolute instant (may move backwards).
    pub fn set(&self, to: DateTime<Utc>) {
        self.epoch_secs.store(to.timestamp(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let secs = self.epoch_secs.load(Ordering::SeqCst);
        DateTime::from_timestamp(secs, 0).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_on_demand() {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance_secs(90);
        assert_eq!(clock.now(), start + chrono::Duration::seconds(90));
    }

    #[test]
    fn clones_share_the_timeline() {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default();
        let clock = ManualClock::new(start);
        let observer = clock.clone();

        clock.advance_secs(3_600);
        assert_eq!(observer.now(), clock.now());
    }

    #[test]
    fn set_can_move_backwards() {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default();
        let clock = ManualClock::new(start);
        let earlier = start - chrono::Duration::hours(1);
        clock.set(earlier);
        assert_eq!(clock.now(), earlier);
    }
}
