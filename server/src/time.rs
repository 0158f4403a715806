//! Time source abstraction.
//!
//! Token expiry and note timestamps read the clock through `TimeSource`, so
//! tests can move time forward explicitly instead of sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Abstraction over the wall clock.
pub trait TimeSource: Send + Sync {
    /// Get the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;

    /// Get the current time in whole seconds since Unix epoch.
    fn now_secs(&self) -> u64 {
        self.now_ms() / 1000
    }
}

/// Real time source using the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    // Milliseconds won't overflow u64 for billions of years.
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> u64 {
        // A clock set before 1970 reads as the epoch rather than panicking.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_millis() as u64)
    }
}

/// A manually driven time source.
///
/// Time only moves when `advance` or `set` is called. Backed by an atomic so
/// it can be shared with a service that requires `Send + Sync`.
///
/// # Example
///
/// ```
/// use notes_server::time::{ManualTimeSource, TimeSource};
///
/// let time = ManualTimeSource::new(1000);
/// time.advance(500);
/// assert_eq!(time.now_ms(), 1500);
/// ```
#[derive(Debug)]
pub struct ManualTimeSource {
    current_time_ms: AtomicU64,
}

impl ManualTimeSource {
    #[must_use]
    pub const fn new(initial_time_ms: u64) -> Self {
        Self {
            current_time_ms: AtomicU64::new(initial_time_ms),
        }
    }

    /// Starts at `1_700_000_000_000` (approximately November 2023).
    #[must_use]
    pub const fn default_start() -> Self {
        Self::new(1_700_000_000_000)
    }

    /// Advance time by the given number of milliseconds, saturating at `u64::MAX`.
    pub fn advance(&self, ms: u64) {
        let current = self.current_time_ms.load(Ordering::SeqCst);
        self.current_time_ms
            .store(current.saturating_add(ms), Ordering::SeqCst);
    }

    pub fn set(&self, time_ms: u64) {
        self.current_time_ms.store(time_ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> u64 {
        self.current_time_ms.load(Ordering::SeqCst)
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::default_start()
    }
}
