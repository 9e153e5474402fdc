//! Single-owner token bucket.

use std::cell::Cell;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::{finish_wait, start_wait, CreditBucket};
use crate::error_handling::WaitError;
use crate::Nanos;

/// Token bucket for a single owner.
///
/// State lives in `Cell`s, so the bucket can be moved between threads but not
/// shared by them. Use [`ConcurrentBucket`](super::ConcurrentBucket) for shared
/// access.
///
/// Arithmetic saturates at the `i64` bounds instead of wrapping.
#[derive(Debug, Clone)]
pub struct Bucket {
    baseline: Cell<Nanos>,
    limit: Cell<Nanos>,
}

impl Bucket {
    /// Creates an empty bucket at `ts` holding at most `limit` credit.
    pub fn new(ts: Nanos, limit: Nanos) -> Self {
        Bucket {
            baseline: Cell::new(ts),
            limit: Cell::new(limit),
        }
    }

    /// Borrows `cost` and waits until the borrowed credit is covered.
    ///
    /// The borrow happens when this is called, not when the future is first
    /// polled. If `cancel` is already cancelled nothing is borrowed. If it
    /// fires during the wait, the wait fails with [`WaitError::Cancelled`] and
    /// the borrowed credit stays spent.
    pub fn wait(
        &self,
        cancel: &CancellationToken,
        ts: Nanos,
        cost: Nanos,
    ) -> impl Future<Output = Result<(), WaitError>> + Send + 'static {
        let deficit = start_wait(cancel, || self.borrow(ts, cost));
        finish_wait(cancel.clone(), deficit)
    }

    fn tokens(&self, ts: Nanos) -> Nanos {
        ts.saturating_sub(self.baseline.get())
    }

    fn spend(&self, cost: Nanos) {
        self.baseline.set(self.baseline.get().saturating_add(cost));
    }
}

impl CreditBucket for Bucket {
    fn reset(&self, ts: Nanos, limit: Nanos) {
        self.baseline.set(ts);
        self.limit.set(limit);
    }

    fn limit(&self) -> Nanos {
        self.limit.get()
    }

    fn set_limit(&self, limit: Nanos) {
        self.limit.set(limit);
    }

    fn advance(&self, ts: Nanos) {
        let limit = self.limit.get();
        if self.tokens(ts) > limit {
            self.baseline.set(ts.saturating_sub(limit));
        }
    }

    fn value(&self, ts: Nanos) -> Nanos {
        self.advance(ts);
        self.tokens(ts)
    }

    fn raw_credit(&self, ts: Nanos) -> Nanos {
        self.tokens(ts)
    }

    fn have(&self, ts: Nanos, cost: Nanos) -> bool {
        self.advance(ts);
        self.tokens(ts) >= cost
    }

    fn take(&self, ts: Nanos, cost: Nanos) -> bool {
        if !self.have(ts, cost) {
            return false;
        }

        self.spend(cost);
        true
    }

    fn borrow(&self, ts: Nanos, cost: Nanos) -> Nanos {
        self.advance(ts);
        self.spend(cost);

        let left = self.tokens(ts);
        if left > 0 {
            0
        } else {
            left.saturating_neg()
        }
    }

    fn set_value(&self, ts: Nanos, cost: Nanos) {
        self.baseline.set(ts.saturating_sub(cost));
    }

    fn return_tokens(&self, _ts: Nanos, cost: Nanos) {
        self.spend(cost.saturating_neg());
    }
}
