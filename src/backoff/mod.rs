//! Adaptive backoff.
//!
//! A [`Backoff`] is a token bucket whose per-operation price moves with the
//! observed congestion: failures raise it multiplicatively, successes lower
//! it, and under [`AdjustmentPolicy::TimeDecay`] it also decays back to the
//! floor on its own after a recovery window.
//!
//! All arithmetic is integer: factors are [`Fract`]s and jitter is a hash of
//! the timestamp, so a given sequence of timestamps always produces the same
//! prices.

mod controller;
mod decay;
mod fract;
mod jitter;
mod policy;

// Re-export public API
pub use controller::Backoff;
pub use decay::decayed_price;
pub use fract::Fract;
pub use jitter::jitter;
pub use policy::{Adjustment, AdjustmentPolicy, BackoffConfig, BurstCoupling, Outcome};
