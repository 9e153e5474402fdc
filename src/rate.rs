//! Rate specifications.
//!
//! Converts a human-friendly "N events per window" description into the
//! `(baseline, price, limit)` triple the accounting core is built from. All
//! validation happens here; the core assumes a positive price and a
//! non-negative limit.

use std::time::Duration;

use crate::error_handling::RateSpecError;
use crate::Nanos;

/// Duration of one token when `tokens` should fit into `per`.
///
/// Returns `None` when `tokens` is zero or the result does not fit into
/// [`Nanos`]. A result of zero is possible for rates finer than 1ns/event.
pub fn price_for(tokens: u64, per: Duration) -> Option<Nanos> {
    if tokens == 0 {
        return None;
    }
    Nanos::try_from(per.as_nanos() / u128::from(tokens)).ok()
}

/// Target rate: `events` per `per`, with `burst` events of headroom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSpec {
    /// Events allowed per window
    pub events: u64,
    /// Window length
    pub per: Duration,
    /// Burst capacity in events
    pub burst: u32,
    /// Fraction of the burst available at construction (0.0-1.0)
    pub initial_fill: f64,
}

/// Parameters derived from a [`RateSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateParams {
    /// Baseline giving the requested initial credit at `now`
    pub baseline: Nanos,
    /// Cost of one event
    pub price: Nanos,
    /// Burst limit (`price * burst`)
    pub limit: Nanos,
}

impl RateSpec {
    /// `events` per second, burst of one, starting full.
    pub fn per_second(events: u64) -> Self {
        Self::new(events, Duration::from_secs(1))
    }

    /// `events` per `per`, burst of one, starting full.
    pub fn new(events: u64, per: Duration) -> Self {
        RateSpec {
            events,
            per,
            burst: 1,
            initial_fill: 1.0,
        }
    }

    /// Sets the burst capacity in events.
    pub fn with_burst(mut self, burst: u32) -> Self {
        self.burst = burst;
        self
    }

    /// Sets the initial fill level (0.0 empty, 1.0 full).
    pub fn with_initial_fill(mut self, initial_fill: f64) -> Self {
        self.initial_fill = initial_fill;
        self
    }

    /// Validates the rate and derives bucket parameters at `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`RateSpecError`] when the spec cannot produce a positive
    /// price and limit, or when the fill level is not in `[0, 1]`.
    pub fn params(&self, now: Nanos) -> Result<RateParams, RateSpecError> {
        if self.events == 0 {
            return Err(RateSpecError::ZeroEvents);
        }
        if self.per.is_zero() {
            return Err(RateSpecError::ZeroWindow);
        }
        if self.burst == 0 {
            return Err(RateSpecError::ZeroBurst);
        }
        if !(0.0..=1.0).contains(&self.initial_fill) {
            return Err(RateSpecError::FillOutOfRange(self.initial_fill));
        }

        let price = price_for(self.events, self.per).ok_or(RateSpecError::Overflow)?;
        if price == 0 {
            return Err(RateSpecError::PriceUnderflow {
                events: self.events,
                per: self.per,
            });
        }

        let limit = price
            .checked_mul(Nanos::from(self.burst))
            .ok_or(RateSpecError::Overflow)?;

        // Safe cast: fill is in [0, 1], so the product is within [0, limit]
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let credit = (limit as f64 * self.initial_fill).round() as Nanos;

        Ok(RateParams {
            baseline: now.saturating_sub(credit.min(limit)),
            price,
            limit,
        })
    }
}
