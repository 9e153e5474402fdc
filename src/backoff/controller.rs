//! Adaptive backoff controller.

use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio_util::sync::CancellationToken;

use super::{decayed_price, jitter, Adjustment, AdjustmentPolicy, BackoffConfig, BurstCoupling, Outcome};
use crate::bucket::{finish_wait, start_wait, Bucket, ConcurrentBucket, CreditBucket};
use crate::config::AUTO_BACKOFF_PRICE_MULTIPLE;
use crate::error_handling::{RateSpecError, WaitError};
use crate::rate::RateSpec;
use crate::Nanos;

/// Token bucket whose cost per operation adapts to congestion.
///
/// Every operation costs the current `price`. [`back_off`](Self::back_off)
/// raises it on failure or congestion, [`cool_off`](Self::cool_off) lowers it
/// on success, and under [`AdjustmentPolicy::TimeDecay`] it also slides back
/// to the floor on its own. The price always stays within
/// `[min_price, max_price]`.
///
/// # Concurrency
///
/// Spending is as safe as the underlying bucket: over a [`ConcurrentBucket`]
/// any number of threads may `take`/`borrow`. Adjustments are meant for a
/// single owner. The price is published through an atomic so readers can run
/// alongside an adjuster and see either the old or the new price, but two
/// concurrent adjusters may overwrite each other's step.
#[derive(Debug)]
pub struct Backoff<B = Bucket> {
    bucket: B,
    /// Last committed price; the decay peak under `TimeDecay`
    price: AtomicI64,
    last_adjust: AtomicI64,
    config: BackoffConfig,
}

impl Backoff<Bucket> {
    /// Creates an empty controller at `ts` with the default tuning.
    ///
    /// `price` is both the starting price and the floor; `limit` is both the
    /// burst limit and the price ceiling.
    pub fn new(ts: Nanos, price: Nanos, limit: Nanos) -> Self {
        Self::with_config(ts, limit, BackoffConfig::new(price, limit))
    }

    /// Creates an empty controller at `ts` with explicit tuning. The price
    /// starts at `config.min_price`.
    pub fn with_config(ts: Nanos, limit: Nanos, config: BackoffConfig) -> Self {
        Self::with_bucket(Bucket::new(ts, limit), ts, config)
    }

    /// Creates a controller from a rate specification with default tuning;
    /// the price ceiling equals the burst limit.
    ///
    /// # Errors
    ///
    /// Returns the validation error of [`RateSpec::params`].
    pub fn from_rate(now: Nanos, spec: &RateSpec) -> Result<Self, RateSpecError> {
        let params = spec.params(now)?;
        let config = BackoffConfig::new(params.price, params.limit);
        Ok(Self::with_bucket(
            Bucket::new(params.baseline, params.limit),
            now,
            config,
        ))
    }
}

impl Backoff<ConcurrentBucket> {
    /// Lock-free counterpart of [`Backoff::new`].
    pub fn new_atomic(ts: Nanos, price: Nanos, limit: Nanos) -> Self {
        Self::with_bucket(
            ConcurrentBucket::new(ts, limit),
            ts,
            BackoffConfig::new(price, limit),
        )
    }

    /// Lock-free counterpart of [`Backoff::with_config`].
    pub fn with_config_atomic(ts: Nanos, limit: Nanos, config: BackoffConfig) -> Self {
        Self::with_bucket(ConcurrentBucket::new(ts, limit), ts, config)
    }

    /// Lock-free counterpart of [`Backoff::from_rate`].
    ///
    /// # Errors
    ///
    /// Returns the validation error of [`RateSpec::params`].
    pub fn from_rate_atomic(now: Nanos, spec: &RateSpec) -> Result<Self, RateSpecError> {
        let params = spec.params(now)?;
        let config = BackoffConfig::new(params.price, params.limit);
        Ok(Self::with_bucket(
            ConcurrentBucket::new(params.baseline, params.limit),
            now,
            config,
        ))
    }
}

impl<B: CreditBucket> Backoff<B> {
    /// Wraps an existing bucket. The price starts at `config.min_price` and
    /// `ts` counts as the last adjustment.
    pub fn with_bucket(bucket: B, ts: Nanos, config: BackoffConfig) -> Self {
        let backoff = Backoff {
            bucket,
            price: AtomicI64::new(config.min_price),
            last_adjust: AtomicI64::new(ts),
            config,
        };
        backoff.couple_limit(backoff.config.min_price);
        backoff
    }

    /// Empties the bucket at `ts`, sets its limit and the price.
    ///
    /// The price is clamped into the configured range. Under
    /// [`BurstCoupling::TrackPrice`] the limit follows that price and `limit`
    /// is ignored.
    pub fn reset(&mut self, ts: Nanos, price: Nanos, limit: Nanos) {
        self.bucket.reset(ts, limit);
        self.commit(ts, self.config.clamp(price));
    }

    /// Tuning parameters.
    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// The underlying bucket.
    pub fn bucket(&self) -> &B {
        &self.bucket
    }

    /// Last committed price, before any time decay.
    pub fn price(&self) -> Nanos {
        self.price.load(Ordering::Relaxed)
    }

    /// Timestamp of the last adjustment.
    pub fn last_adjust(&self) -> Nanos {
        self.last_adjust.load(Ordering::Relaxed)
    }

    /// Price in effect at `ts`.
    ///
    /// Same as [`price`](Self::price) under the step policy; under time decay,
    /// the decayed value since the last adjustment.
    pub fn price_at(&self, ts: Nanos) -> Nanos {
        let price = self.price();
        match self.config.policy {
            AdjustmentPolicy::MultiplicativeStep => price,
            AdjustmentPolicy::TimeDecay {
                recovery_window,
                bias,
            } => decayed_price(
                ts,
                self.last_adjust(),
                price,
                self.config.min_price,
                recovery_window,
                bias,
            ),
        }
    }

    /// Overrides the price at `ts`, clamped into the configured range.
    pub fn set_price(&self, ts: Nanos, price: Nanos) {
        self.commit(ts, self.config.clamp(price));
    }

    /// Drops the price straight to the floor, bypassing the gradual law.
    pub fn recover(&self) {
        let floor = self.config.min_price;
        log::debug!("backoff recovered: price {} -> {}", self.price(), floor);
        self.price.store(floor, Ordering::Relaxed);
        self.couple_limit(floor);
    }

    /// Raises the price after a failure or congestion signal.
    ///
    /// Returns the new price.
    pub fn back_off(&self, ts: Nanos) -> Nanos {
        self.bucket.advance(ts);
        let config = &self.config;

        let mut p = self.price_at(ts).max(config.min_price);
        p = p.saturating_add(config.increase);
        p = config.factor.mul(p);
        p = p.saturating_add(jitter(ts, config.jitter.mul(p)));
        let p = config.clamp(p);

        log::debug!("backoff at {}: price {} -> {}", ts, self.price(), p);
        self.commit(ts, p);
        p
    }

    /// Lowers the price after a success signal.
    ///
    /// Returns the new price.
    pub fn cool_off(&self, ts: Nanos) -> Nanos {
        self.bucket.advance(ts);
        let config = &self.config;

        let mut p = self.price_at(ts);
        p = p.saturating_sub(config.decrease);
        p = config.cool_factor.mul(p);
        p = p.saturating_add(jitter(ts, config.cool_jitter.mul(p)));
        let p = config.clamp(p);

        log::debug!("cooloff at {}: price {} -> {}", ts, self.price(), p);
        self.commit(ts, p);
        p
    }

    /// Adjusts from a success/failure signal.
    pub fn record(&self, ts: Nanos, outcome: Outcome) -> Adjustment {
        match outcome {
            Outcome::Success => {
                self.cool_off(ts);
                Adjustment::CooledOff
            }
            Outcome::Failure => {
                self.back_off(ts);
                Adjustment::BackedOff
            }
        }
    }

    /// Adjusts from the credit accrued in the bucket.
    ///
    /// At most two operations' worth of credit backs off, credit up to the
    /// price ceiling holds, anything above cools off. Credit is read before
    /// the burst limit applies, so an idle bucket cools off even when the
    /// limit equals the ceiling.
    pub fn auto_adjust(&self, ts: Nanos) -> Adjustment {
        let credit = self.bucket.raw_credit(ts);
        let price = self.price_at(ts);

        if credit <= price.saturating_mul(AUTO_BACKOFF_PRICE_MULTIPLE) {
            self.back_off(ts);
            Adjustment::BackedOff
        } else if credit <= self.config.max_price {
            Adjustment::Held
        } else {
            self.cool_off(ts);
            Adjustment::CooledOff
        }
    }

    /// Available credit at `ts`, as a duration.
    pub fn value(&self, ts: Nanos) -> Nanos {
        self.bucket.value(ts)
    }

    /// Whether one operation at the current price is affordable at `ts`.
    pub fn have(&self, ts: Nanos) -> bool {
        self.bucket.have(ts, self.price_at(ts))
    }

    /// Pays for one operation if affordable. On `false` nothing is spent.
    pub fn take(&self, ts: Nanos) -> bool {
        self.bucket.take(ts, self.price_at(ts))
    }

    /// Pays for one operation unconditionally; returns how long to wait.
    pub fn borrow(&self, ts: Nanos) -> Nanos {
        self.bucket.borrow(ts, self.price_at(ts))
    }

    /// Pays for one operation and waits until it is covered.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Cancelled`] if `cancel` fires first.
    pub fn wait(
        &self,
        cancel: &CancellationToken,
        ts: Nanos,
    ) -> impl Future<Output = Result<(), WaitError>> + Send + 'static {
        let deficit = start_wait(cancel, || self.borrow(ts));
        finish_wait(cancel.clone(), deficit)
    }

    /// Sets the available credit at `ts` to `cost`.
    pub fn set_value(&self, ts: Nanos, cost: Nanos) {
        self.bucket.set_value(ts, cost);
    }

    /// Puts `cost` credit back.
    pub fn return_tokens(&self, ts: Nanos, cost: Nanos) {
        self.bucket.return_tokens(ts, cost);
    }

    fn commit(&self, ts: Nanos, price: Nanos) {
        self.price.store(price, Ordering::Relaxed);
        self.last_adjust.store(ts, Ordering::Relaxed);
        self.couple_limit(price);
    }

    fn couple_limit(&self, price: Nanos) {
        if let BurstCoupling::TrackPrice { bursts } = self.config.burst {
            self.bucket
                .set_limit(price.saturating_mul(Nanos::from(bursts)));
        }
    }
}
