//! Tuning of the adaptive controller.

use super::Fract;
use crate::config::{
    DEFAULT_BACKOFF_FACTOR, DEFAULT_BACKOFF_JITTER, DEFAULT_COOL_FACTOR, DEFAULT_COOL_JITTER,
    DEFAULT_DECAY_BIAS, DEFAULT_DECREASE_DIVISOR,
};
use crate::Nanos;

/// How the price evolves between explicit adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentPolicy {
    /// The price only moves on back-off / cool-off steps.
    MultiplicativeStep,
    /// After each adjustment the price decays back to the floor over
    /// `recovery_window`, shaped by `bias` (see [`decayed_price`](super::decayed_price)).
    TimeDecay {
        /// Time for a fully backed-off price to return to the floor
        recovery_window: Nanos,
        /// Midpoint weight of the bisection curve
        bias: Fract,
    },
}

impl AdjustmentPolicy {
    /// Time decay over `recovery_window` with the default curve.
    pub fn time_decay(recovery_window: Nanos) -> Self {
        AdjustmentPolicy::TimeDecay {
            recovery_window,
            bias: DEFAULT_DECAY_BIAS,
        }
    }
}

/// Whether adjustments also resize the burst limit of the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstCoupling {
    /// The limit stays whatever the bucket was built with.
    Fixed,
    /// After each adjustment the limit becomes `bursts` operations at the new price.
    TrackPrice {
        /// Operations of headroom at the current price
        bursts: u32,
    },
}

/// Result signal fed to [`Backoff::record`](super::Backoff::record).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The guarded operation succeeded.
    Success,
    /// The guarded operation failed or hit congestion.
    Failure,
}

/// Direction of an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Adjustment {
    /// Price went up.
    BackedOff,
    /// Price left alone.
    Held,
    /// Price went down.
    CooledOff,
}

/// Parameters of a [`Backoff`](super::Backoff).
///
/// ```text
/// back off: p = clamp((max(p, min) + increase) * factor + jitter(factor_jitter * p))
/// cool off: p = clamp((p - decrease) * cool_factor + jitter(cool_jitter * p))
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Floor of the price
    pub min_price: Nanos,
    /// Ceiling of the price
    pub max_price: Nanos,
    /// Added before multiplying on back-off
    pub increase: Nanos,
    /// Back-off multiplier
    pub factor: Fract,
    /// Back-off jitter magnitude, relative to the new price
    pub jitter: Fract,
    /// Subtracted before multiplying on cool-off
    pub decrease: Nanos,
    /// Cool-off multiplier
    pub cool_factor: Fract,
    /// Cool-off jitter magnitude, relative to the new price
    pub cool_jitter: Fract,
    /// Step-only or time-decay behaviour
    pub policy: AdjustmentPolicy,
    /// Burst limit coupling
    pub burst: BurstCoupling,
}

impl BackoffConfig {
    /// Defaults for a price range of `[price, max_price]`.
    ///
    /// Back-off adds `price` and multiplies by 1.7; cool-off subtracts
    /// `price / 6` and multiplies by 0.4; both jitter by 10%.
    pub fn new(price: Nanos, max_price: Nanos) -> Self {
        BackoffConfig {
            min_price: price,
            max_price,
            increase: price,
            factor: DEFAULT_BACKOFF_FACTOR,
            jitter: DEFAULT_BACKOFF_JITTER,
            decrease: price / DEFAULT_DECREASE_DIVISOR,
            cool_factor: DEFAULT_COOL_FACTOR,
            cool_jitter: DEFAULT_COOL_JITTER,
            policy: AdjustmentPolicy::MultiplicativeStep,
            burst: BurstCoupling::Fixed,
        }
    }

    /// Sets the adjustment policy.
    pub fn with_policy(mut self, policy: AdjustmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the burst coupling.
    pub fn with_burst_coupling(mut self, burst: BurstCoupling) -> Self {
        self.burst = burst;
        self
    }

    /// Sets the back-off step.
    pub fn with_back_off(mut self, increase: Nanos, factor: Fract, jitter: Fract) -> Self {
        self.increase = increase;
        self.factor = factor;
        self.jitter = jitter;
        self
    }

    /// Sets the cool-off step.
    pub fn with_cool_off(mut self, decrease: Nanos, cool_factor: Fract, cool_jitter: Fract) -> Self {
        self.decrease = decrease;
        self.cool_factor = cool_factor;
        self.cool_jitter = cool_jitter;
        self
    }

    /// Disables jitter in both directions.
    pub fn without_jitter(mut self) -> Self {
        self.jitter = Fract::ZERO;
        self.cool_jitter = Fract::ZERO;
        self
    }

    /// Clamps `price` into `[min_price, max_price]`; the floor wins if the
    /// range is inverted.
    pub fn clamp(&self, price: Nanos) -> Nanos {
        price.min(self.max_price).max(self.min_price)
    }
}
