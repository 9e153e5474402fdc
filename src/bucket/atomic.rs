//! Lock-free token bucket.
//!
//! The baseline is a single `AtomicI64`. Mutations load it, compute the new
//! baseline, and publish it with compare-and-swap, retrying from the freshly
//! observed value when another thread got there first. No lock is ever held:
//! an uncontended call finishes in one pass, and under contention some thread
//! always makes progress.

use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio_util::sync::CancellationToken;

use super::{finish_wait, start_wait, CreditBucket};
use crate::error_handling::WaitError;
use crate::Nanos;

/// Token bucket safe for unsynchronized use from any number of threads.
///
/// Same contract as [`Bucket`](super::Bucket). Operations are linearized by
/// the order in which their compare-and-swap succeeds. There is no fairness
/// between callers racing for the last credit.
#[derive(Debug)]
pub struct ConcurrentBucket {
    baseline: AtomicI64,
    limit: AtomicI64,
}

impl ConcurrentBucket {
    /// Creates an empty bucket at `ts` holding at most `limit` credit.
    pub fn new(ts: Nanos, limit: Nanos) -> Self {
        ConcurrentBucket {
            baseline: AtomicI64::new(ts),
            limit: AtomicI64::new(limit),
        }
    }

    /// Borrows `cost` and waits until the borrowed credit is covered.
    ///
    /// Checks `cancel` before borrowing, so an already-cancelled token spends
    /// nothing. Cancellation during the wait leaves the borrow in place.
    pub fn wait(
        &self,
        cancel: &CancellationToken,
        ts: Nanos,
        cost: Nanos,
    ) -> impl Future<Output = Result<(), WaitError>> + Send + 'static {
        let deficit = start_wait(cancel, || self.borrow(ts, cost));
        finish_wait(cancel.clone(), deficit)
    }

    /// Credit at `ts` for a given baseline, capped at the limit.
    fn credit(&self, ts: Nanos, baseline: Nanos) -> Nanos {
        ts.saturating_sub(baseline)
            .min(self.limit.load(Ordering::Relaxed))
    }

    /// Runs the optimistic update loop.
    ///
    /// `decide` maps the credit left after paying `cost` to `Some(result)` to
    /// commit, or `None` to give up without writing.
    fn update<T>(&self, ts: Nanos, cost: Nanos, decide: impl Fn(Nanos) -> Option<T>) -> Option<T> {
        let mut current = self.baseline.load(Ordering::Acquire);
        let mut retries = 0u32;

        loop {
            let left = self.credit(ts, current).saturating_sub(cost);
            let result = decide(left)?;

            match self.baseline.compare_exchange_weak(
                current,
                ts.saturating_sub(left),
                Ordering::AcqRel,  // winner publishes the new baseline
                Ordering::Acquire, // loser retries from what it observed
            ) {
                Ok(_) => {
                    if retries > 0 {
                        log::trace!("bucket update committed after {} retries", retries);
                    }
                    return Some(result);
                }
                Err(observed) => {
                    current = observed;
                    retries += 1;
                }
            }
        }
    }
}

impl CreditBucket for ConcurrentBucket {
    fn reset(&self, ts: Nanos, limit: Nanos) {
        self.limit.store(limit, Ordering::Relaxed);
        self.baseline.store(ts, Ordering::Release);
    }

    fn limit(&self) -> Nanos {
        self.limit.load(Ordering::Relaxed)
    }

    fn set_limit(&self, limit: Nanos) {
        self.limit.store(limit, Ordering::Relaxed);
    }

    fn advance(&self, ts: Nanos) {
        let limit = self.limit();
        // Err means the credit was already within the limit
        let _ = self
            .baseline
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |baseline| {
                (ts.saturating_sub(baseline) > limit).then(|| ts.saturating_sub(limit))
            });
    }

    fn value(&self, ts: Nanos) -> Nanos {
        self.credit(ts, self.baseline.load(Ordering::Acquire))
    }

    fn raw_credit(&self, ts: Nanos) -> Nanos {
        ts.saturating_sub(self.baseline.load(Ordering::Acquire))
    }

    fn take(&self, ts: Nanos, cost: Nanos) -> bool {
        self.update(ts, cost, |left| (left >= 0).then_some(()))
            .is_some()
    }

    fn borrow(&self, ts: Nanos, cost: Nanos) -> Nanos {
        self.update(ts, cost, |left| {
            Some(if left > 0 { 0 } else { left.saturating_neg() })
        })
        .unwrap_or(0)
    }

    fn set_value(&self, ts: Nanos, cost: Nanos) {
        self.baseline
            .store(ts.saturating_sub(cost), Ordering::Release);
    }

    fn return_tokens(&self, _ts: Nanos, cost: Nanos) {
        // Unconditional additive update, so no retry loop is needed
        self.baseline.fetch_sub(cost, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_value_is_capped_without_mutation() {
        let b = ConcurrentBucket::new(0, 500);
        assert_eq!(b.value(10_000), 500);
        // Reading does not move the baseline, so an older timestamp still
        // sees its own credit
        assert_eq!(b.value(100), 100);
    }

    #[test]
    fn test_take_failure_leaves_state() {
        let b = ConcurrentBucket::new(0, 1000);
        b.set_value(0, 300);

        assert!(!b.take(0, 301));
        assert_eq!(b.value(0), 300);
        assert!(b.take(0, 300));
        assert_eq!(b.value(0), 0);
    }

    #[test]
    fn test_take_commits_clamped_baseline() {
        let b = ConcurrentBucket::new(0, 500);
        assert!(b.take(10_000, 200));
        assert_eq!(b.value(10_000), 300);
    }

    #[test]
    fn test_borrow_reports_deficit() {
        let b = ConcurrentBucket::new(0, 100);
        b.set_value(0, 100);
        assert_eq!(b.borrow(0, 1000), 900);
        assert_eq!(b.value(0), -900);
        assert_eq!(b.value(900), 0);
    }

    #[test]
    fn test_advance_clamps_once() {
        let b = ConcurrentBucket::new(0, 500);
        b.advance(10_000);
        assert_eq!(b.value(10_000), 500);
        // Already within the limit: no change
        b.advance(10_000);
        assert_eq!(b.value(10_000), 500);
    }

    #[test]
    fn test_return_tokens_is_additive() {
        let b = ConcurrentBucket::new(0, 1000);
        b.set_value(0, 200);
        b.return_tokens(0, 300);
        assert_eq!(b.value(0), 500);
    }

    #[test]
    fn test_reset_and_limit() {
        let b = ConcurrentBucket::new(0, 1000);
        b.reset(100, 50);
        assert_eq!(b.limit(), 50);
        assert_eq!(b.value(100), 0);
        b.set_limit(20);
        assert_eq!(b.value(1000), 20);
    }

    #[test]
    fn test_concurrent_takes_never_overspend() {
        const LIMIT: Nanos = 1_000;
        let b = Arc::new(ConcurrentBucket::new(0, LIMIT));
        b.set_value(0, LIMIT);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let b = Arc::clone(&b);
                thread::spawn(move || (0..500).filter(|_| b.take(0, 1)).count())
            })
            .collect();

        let granted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(granted as Nanos, LIMIT);
        assert_eq!(b.value(0), 0);
    }
}
