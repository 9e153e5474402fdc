//! Clock sources.
//!
//! The accounting core never reads a clock; every operation takes `ts`
//! explicitly. These are the usual ways of producing it.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

use crate::Nanos;

/// Source of timestamps in nanoseconds.
pub trait Clock {
    /// Current timestamp.
    fn now(&self) -> Nanos;
}

/// Wall clock: nanoseconds since the Unix epoch.
///
/// Can jump backwards when the system time is adjusted; buckets tolerate
/// that (an older `ts` just sees less credit).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Nanos {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => Nanos::try_from(since.as_nanos()).unwrap_or(Nanos::MAX),
            Err(before) => Nanos::try_from(before.duration().as_nanos())
                .map(|n| -n)
                .unwrap_or(Nanos::MIN),
        }
    }
}

/// Monotonic clock: nanoseconds since construction.
///
/// Built on tokio's `Instant`, so it follows paused time in tests.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Starts counting from zero now.
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Nanos {
        Nanos::try_from(self.origin.elapsed().as_nanos()).unwrap_or(Nanos::MAX)
    }
}

/// Hand-driven clock for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Starts at `ts`.
    pub fn new(ts: Nanos) -> Self {
        ManualClock {
            now: AtomicI64::new(ts),
        }
    }

    /// Moves the clock forward by `by` and returns the new time.
    pub fn advance(&self, by: Nanos) -> Nanos {
        let prev = self
            .now
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |ts| {
                Some(ts.saturating_add(by))
            })
            .unwrap_or_else(|ts| ts);
        prev.saturating_add(by)
    }

    /// Jumps to `ts`.
    pub fn set(&self, ts: Nanos) {
        self.now.store(ts, Ordering::Release);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Nanos {
        self.now.load(Ordering::Acquire)
    }
}
