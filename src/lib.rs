//! adaptive_throttle library: token-bucket admission control
//!
//! This library provides time-based token buckets that decide whether an
//! operation may proceed now, how long it must wait, and how the cost of an
//! operation should adapt to congestion:
//!
//! - [`Bucket`] / [`ConcurrentBucket`]: credit accounting, single-owner or lock-free
//! - [`Throttle`] / [`AtomicThrottle`]: the same bucket counted in items
//! - [`Backoff`]: a bucket whose price rises on failure and falls on success
//!
//! Nothing here reads a clock. Every operation takes the current timestamp
//! `ts` in nanoseconds, so behaviour is deterministic and easy to test; see
//! [`clock`] for ready-made sources.
//!
//! # Example
//!
//! ```
//! use adaptive_throttle::{RateSpec, Throttle};
//!
//! // 10 per second, bursts of 5, starting full
//! let throttle = Throttle::from_rate(0, &RateSpec::per_second(10).with_burst(5)).unwrap();
//! assert!(throttle.take(0, 5));
//! assert!(!throttle.take(0, 1));
//! // 100ms later one more item is available
//! assert!(throttle.take(100_000_000, 1));
//! ```
//!
//! # Requirements
//!
//! Only `wait` and the simulator need a Tokio runtime; everything else is
//! plain synchronous code.

#![warn(missing_docs)]

pub mod backoff;
pub mod bucket;
pub mod clock;
pub mod config;
mod error_handling;
pub mod initialization;
pub mod rate;
mod run;
mod throttle;

/// Timestamps and durations, in nanoseconds.
pub type Nanos = i64;

// Re-export public API
pub use backoff::{
    Adjustment, AdjustmentPolicy, Backoff, BackoffConfig, BurstCoupling, Fract, Outcome,
};
pub use bucket::{Bucket, ConcurrentBucket, CreditBucket};
pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock};
pub use config::{Config, LogFormat, LogLevel, PolicyKind};
pub use error_handling::{InitializationError, RateSpecError, WaitError};
pub use rate::{price_for, RateParams, RateSpec};
pub use run::{run_simulation, SimulationReport};
pub use throttle::{AtomicThrottle, Throttle};
