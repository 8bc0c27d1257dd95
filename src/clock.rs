//! Clock abstraction for testable time-dependent guards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Trait for providing the current Unix timestamp.
///
/// The engine's timing guards (auction expiry, premature settlement) read the
/// clock through this trait so tests can drive time deterministically.
pub trait Clock {
    /// Returns the current Unix timestamp in seconds.
    fn now_unix(&self) -> u64;
}

/// Production implementation that uses the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Manually-advanced clock for tests and simulations.
///
/// Cloning yields another handle onto the same instant, so a test can advance
/// time while the engine owns its own handle.
///
/// # Example
///
/// ```
/// use auction_house::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(1000);
/// let handle = clock.clone();
///
/// handle.advance(3600);
/// assert_eq!(clock.now_unix(), 4600);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock frozen at `now`
    pub fn new(now: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(now)),
        }
    }

    /// Move the clock forward by `secs`
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Set the clock to an absolute instant
    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_reasonable_value() {
        let clock = SystemClock::new();
        let now = clock.now_unix();

        // Should be after 2020 (1577836800) and before 2100 (4102444800)
        assert!(now > 1577836800, "Timestamp should be after 2020");
        assert!(now < 4102444800, "Timestamp should be before 2100");
    }

    #[test]
    fn test_manual_clock_advance_and_set() {
        let clock = ManualClock::new(1000);
        assert_eq!(clock.now_unix(), 1000);

        clock.advance(3600);
        assert_eq!(clock.now_unix(), 4600);

        clock.set(42);
        assert_eq!(clock.now_unix(), 42);
    }

    #[test]
    fn test_manual_clock_shared_handles() {
        let clock = ManualClock::new(0);
        let handle = clock.clone();

        handle.advance(10);
        assert_eq!(clock.now_unix(), 10);
    }
}
