//! Timestamp-derived jitter.
//!
//! A multiplicative hash of the timestamp, not a random number generator: the
//! same `(ts, magnitude)` always gives the same offset, which keeps
//! single-timestamp tests reproducible. Not suitable where real randomness
//! matters.

use crate::config::{JITTER_MULTIPLIER, JITTER_SHIFT};
use crate::Nanos;

/// Pseudo-random offset in `[-magnitude, magnitude)` derived from `ts`.
///
/// A zero or negative magnitude yields zero.
pub fn jitter(ts: Nanos, magnitude: Nanos) -> Nanos {
    if magnitude <= 0 {
        return 0;
    }

    // Reinterpreting the sign bit is fine for a hash
    #[allow(clippy::cast_sign_loss)]
    let r = (ts as u64).wrapping_mul(JITTER_MULTIPLIER) >> JITTER_SHIFT;
    #[allow(clippy::cast_sign_loss)]
    let span = magnitude.saturating_mul(2) as u64;

    // r < 2^32 after the shift, so the remainder fits
    #[allow(clippy::cast_possible_wrap)]
    let offset = (r % span) as Nanos;
    offset - magnitude
}
