//! Time decay of the adaptive price.
//!
//! After an adjustment the price slides from its peak back to the floor over a
//! recovery window. The curve is never evaluated as a formula: the time axis is
//! bisected between the two endpoints, and each midpoint gets a value `bias` of
//! the way from the later (lower) endpoint toward the earlier (higher) one.
//! With `bias = 1/2` this is linear interpolation; smaller biases front-load the
//! drop, which feels roughly exponential. Cost is `O(log(window / resolution))`
//! integer steps per query.

use super::Fract;
use crate::config::DECAY_RESOLUTION;
use crate::Nanos;

/// One end of the bisection bracket.
#[derive(Debug, Clone, Copy)]
struct Point {
    ts: Nanos,
    price: Nanos,
}

/// Decayed price at `ts`.
///
/// The decay starts at `(start, peak)` and reaches `(start + window, floor)`.
/// Exactly `peak` at or before `start`, exactly `floor` once `window` has
/// elapsed; in between the value is non-increasing in `ts` and never leaves
/// `[floor, peak]`, whatever the bias.
pub fn decayed_price(
    ts: Nanos,
    start: Nanos,
    peak: Nanos,
    floor: Nanos,
    window: Nanos,
    bias: Fract,
) -> Nanos {
    if ts <= start {
        return peak;
    }
    if window <= 0 || ts.saturating_sub(start) >= window || peak <= floor {
        return floor;
    }

    let mut early = Point { ts: start, price: peak };
    let mut late = Point {
        ts: start.saturating_add(window),
        price: floor,
    };

    while late.ts - early.ts >= DECAY_RESOLUTION {
        let mid = Point {
            ts: early.ts + (late.ts - early.ts) / 2,
            price: late.price + bias.mul(early.price - late.price),
        };
        if ts < mid.ts {
            late = mid;
        } else {
            early = mid;
        }
    }

    let nearest = if ts - early.ts <= late.ts - ts {
        early.price
    } else {
        late.price
    };
    // A bias above 1 overshoots the bracket
    nearest.clamp(floor, peak)
}
