//! Configuration constants.
//!
//! This module defines the default tuning of the adaptive controller and the
//! simulator, plus the fixed constants of the jitter and decay math.

use crate::backoff::Fract;
use crate::Nanos;

/// One millisecond in the crate's time unit.
pub const NANOS_PER_MILLI: Nanos = 1_000_000;
/// One second in the crate's time unit.
pub const NANOS_PER_SEC: Nanos = 1_000_000_000;

// Back-off step
/// Multiplier applied on every back-off step (1.7x)
pub const DEFAULT_BACKOFF_FACTOR: Fract = Fract::new(17, 10);
/// Jitter magnitude on back-off, as a fraction of the resulting price (10%)
pub const DEFAULT_BACKOFF_JITTER: Fract = Fract::new(1, 10);

// Cool-off step
/// Multiplier applied on every cool-off step (0.4x)
pub const DEFAULT_COOL_FACTOR: Fract = Fract::new(4, 10);
/// Jitter magnitude on cool-off, as a fraction of the resulting price (10%)
pub const DEFAULT_COOL_JITTER: Fract = Fract::new(1, 10);
/// Fixed decrease on cool-off is `min_price / DEFAULT_DECREASE_DIVISOR`
pub const DEFAULT_DECREASE_DIVISOR: Nanos = 6;

// Time decay
/// Bisection stops once the time bracket is narrower than this (1ms)
pub const DECAY_RESOLUTION: Nanos = NANOS_PER_MILLI;
/// Where the midpoint value sits between the later and earlier endpoint.
/// 1/2 gives a straight line; smaller values front-load the decay.
pub const DEFAULT_DECAY_BIAS: Fract = Fract::new(4, 10);

// Jitter hash
/// Multiplier of the timestamp hash (`(ts * JITTER_MULTIPLIER) >> JITTER_SHIFT`)
pub const JITTER_MULTIPLIER: u64 = 0x1e35_a7bd;
/// Shift of the timestamp hash
pub const JITTER_SHIFT: u32 = 32;

// Auto adjust
/// Credit at or below `price * AUTO_BACKOFF_PRICE_MULTIPLE` triggers a back-off
pub const AUTO_BACKOFF_PRICE_MULTIPLE: Nanos = 2;

// Simulator defaults
/// Target events per second
pub const DEFAULT_SIM_RATE: u64 = 100;
/// Burst capacity in events
pub const DEFAULT_SIM_BURST: u32 = 10;
/// Number of simulated requests
pub const DEFAULT_SIM_REQUESTS: u64 = 1_000;
/// Spacing between simulated arrivals in milliseconds
pub const DEFAULT_SIM_INTERVAL_MS: u64 = 5;
/// Probability that a granted request reports failure
pub const DEFAULT_SIM_FAILURE_RATE: f64 = 0.05;
/// Seed of the failure injection generator
pub const DEFAULT_SIM_SEED: u64 = 42;
/// Ceiling of the adaptive price, as a multiple of the base price
pub const DEFAULT_SIM_MAX_PRICE_MULTIPLE: i64 = 10;
/// Recovery window of the time-decay policy in milliseconds
pub const DEFAULT_SIM_RECOVERY_WINDOW_MS: u64 = 2_000;
/// Progress is logged every this many requests
pub const SIM_LOGGING_INTERVAL: u64 = 100;
