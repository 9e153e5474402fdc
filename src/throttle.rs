//! Item-count throttle.
//!
//! A rate limiter in the style of the Linux netfilter `limit` match: a bucket
//! plus a fixed `price` per item, so callers ask for `n` items and the bucket
//! is charged `n * price`.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::bucket::{finish_wait, start_wait, Bucket, ConcurrentBucket, CreditBucket};
use crate::error_handling::{RateSpecError, WaitError};
use crate::rate::RateSpec;
use crate::Nanos;

/// Token bucket counted in items.
///
/// Wraps any [`CreditBucket`]; `Throttle` on its own is the single-owner form,
/// [`AtomicThrottle`] the shareable one.
#[derive(Debug)]
pub struct Throttle<B = Bucket> {
    bucket: B,
    price: Nanos,
}

/// Throttle over a [`ConcurrentBucket`], safe to share between threads.
pub type AtomicThrottle = Throttle<ConcurrentBucket>;

impl Throttle<Bucket> {
    /// Creates an empty throttle at `ts` with `price` per item and at most
    /// `limit` credit.
    pub fn new(ts: Nanos, price: Nanos, limit: Nanos) -> Self {
        Self::with_bucket(Bucket::new(ts, limit), price)
    }

    /// Creates a throttle from a rate specification.
    ///
    /// # Errors
    ///
    /// Returns the validation error of [`RateSpec::params`].
    pub fn from_rate(now: Nanos, spec: &RateSpec) -> Result<Self, RateSpecError> {
        let params = spec.params(now)?;
        Ok(Self::new(params.baseline, params.price, params.limit))
    }
}

impl Throttle<ConcurrentBucket> {
    /// Lock-free counterpart of [`Throttle::new`].
    pub fn new_atomic(ts: Nanos, price: Nanos, limit: Nanos) -> Self {
        Self::with_bucket(ConcurrentBucket::new(ts, limit), price)
    }

    /// Lock-free counterpart of [`Throttle::from_rate`].
    ///
    /// # Errors
    ///
    /// Returns the validation error of [`RateSpec::params`].
    pub fn from_rate_atomic(now: Nanos, spec: &RateSpec) -> Result<Self, RateSpecError> {
        let params = spec.params(now)?;
        Ok(Self::new_atomic(params.baseline, params.price, params.limit))
    }
}

impl<B: CreditBucket> Throttle<B> {
    /// Wraps an existing bucket.
    pub fn with_bucket(bucket: B, price: Nanos) -> Self {
        Throttle { bucket, price }
    }

    /// Empties the throttle at `ts` and replaces price and limit.
    pub fn reset(&mut self, ts: Nanos, price: Nanos, limit: Nanos) {
        self.bucket.reset(ts, limit);
        self.price = price;
    }

    /// Cost of one item.
    pub fn price(&self) -> Nanos {
        self.price
    }

    /// The underlying bucket.
    pub fn bucket(&self) -> &B {
        &self.bucket
    }

    /// Number of whole items available at `ts` (rounded down, negative when
    /// over-spent).
    pub fn value(&self, ts: Nanos) -> i64 {
        self.bucket.value(ts).div_euclid(self.price)
    }

    /// Whether `n` items are available at `ts`.
    pub fn have(&self, ts: Nanos, n: i64) -> bool {
        self.bucket.have(ts, self.cost(n))
    }

    /// Takes `n` items if available. On `false` nothing is taken.
    pub fn take(&self, ts: Nanos, n: i64) -> bool {
        self.bucket.take(ts, self.cost(n))
    }

    /// Takes `n` items even if there are not enough.
    ///
    /// Returns how long to wait before they may be used; 0 means they were
    /// available and this behaved like [`take`](Self::take). Works even for
    /// more items than fit into the limit.
    pub fn borrow(&self, ts: Nanos, n: i64) -> Nanos {
        self.bucket.borrow(ts, self.cost(n))
    }

    /// Borrows `n` items and waits until they may be used.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Cancelled`] if `cancel` fires first.
    pub fn wait(
        &self,
        cancel: &CancellationToken,
        ts: Nanos,
        n: i64,
    ) -> impl Future<Output = Result<(), WaitError>> + Send + 'static {
        let deficit = start_wait(cancel, || self.borrow(ts, n));
        finish_wait(cancel.clone(), deficit)
    }

    /// Sets the number of items available at `ts`.
    pub fn set_value(&self, ts: Nanos, n: i64) {
        self.bucket.set_value(ts, self.cost(n));
    }

    /// Puts `n` items back, even if they were never taken.
    pub fn return_tokens(&self, ts: Nanos, n: i64) {
        self.bucket.return_tokens(ts, self.cost(n));
    }

    fn cost(&self, n: i64) -> Nanos {
        self.price.saturating_mul(n)
    }
}
