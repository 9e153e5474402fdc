//! Token-bucket accounting.
//!
//! A bucket never stores a token count. It stores a `baseline` timestamp and
//! derives the available credit at `ts` as `ts - baseline`, capped at the burst
//! `limit`. Spending moves the baseline forward, refunding moves it back, and
//! idle time accrues credit on its own:
//!
//! ```text
//!            baseline            ts
//! ---------------|---------------|-------->  time
//!                <--- credit ---->
//! ```
//!
//! Credit may go negative when a caller borrows more than is available; the
//! negative part is the time the caller has to wait before the spend is covered.
//!
//! Two implementations share the [`CreditBucket`] contract:
//! - [`Bucket`]: single owner, plain cells, no synchronization (`Send`, not `Sync`)
//! - [`ConcurrentBucket`]: lock-free, all mutation goes through compare-and-swap

mod atomic;
mod local;
mod wait;

pub use atomic::ConcurrentBucket;
pub use local::Bucket;
pub use wait::sleep_or_cancel;
pub(crate) use wait::{finish_wait, start_wait};

use crate::Nanos;

/// Accounting contract shared by [`Bucket`] and [`ConcurrentBucket`].
///
/// All durations are in the same unit as the timestamps (nanoseconds by
/// convention). Timestamps are expected to be non-decreasing, but nothing
/// breaks if they are not: an older `ts` simply sees less credit.
pub trait CreditBucket {
    /// Replaces both the baseline and the burst limit. The bucket is empty at `ts`.
    fn reset(&self, ts: Nanos, limit: Nanos);

    /// Current burst limit.
    fn limit(&self) -> Nanos;

    /// Changes the burst limit. Excess credit is dropped on the next access.
    fn set_limit(&self, limit: Nanos);

    /// Drops credit above the limit at `ts`.
    fn advance(&self, ts: Nanos);

    /// Available credit at `ts`. Negative when over-spent.
    fn value(&self, ts: Nanos) -> Nanos;

    /// Credit accrued by `ts` without the limit applied. Drops nothing, so
    /// after idle time this reads above [`limit`](Self::limit).
    fn raw_credit(&self, ts: Nanos) -> Nanos;

    /// Whether at least `cost` credit is available at `ts`.
    fn have(&self, ts: Nanos, cost: Nanos) -> bool {
        self.value(ts) >= cost
    }

    /// Spends `cost` if available. On `false` nothing is spent.
    fn take(&self, ts: Nanos, cost: Nanos) -> bool;

    /// Spends `cost` unconditionally.
    ///
    /// Returns 0 if the credit covered the cost, otherwise the deficit: how
    /// long the caller must wait before the spent credit is legitimate.
    /// Borrowing more than the limit is allowed.
    fn borrow(&self, ts: Nanos, cost: Nanos) -> Nanos;

    /// Sets the credit at `ts` to exactly `cost`.
    fn set_value(&self, ts: Nanos, cost: Nanos);

    /// Puts `cost` credit back, even if it was never taken.
    fn return_tokens(&self, ts: Nanos, cost: Nanos);
}

/// Converts a non-negative deficit into a sleep duration.
pub(crate) fn deficit_to_duration(deficit: Nanos) -> std::time::Duration {
    std::time::Duration::from_nanos(u64::try_from(deficit).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs the same accounting script against any implementation.
    fn end_to_end<B: CreditBucket>(b: &B) {
        b.set_value(0, 1000);
        assert!(b.take(0, 500));
        assert_eq!(b.value(0), 500);

        assert!(!b.take(0, 600));
        assert_eq!(b.value(0), 500);

        assert_eq!(b.borrow(0, 600), 100);
        assert_eq!(b.value(0), -100);

        // Credit catches up with time
        assert_eq!(b.value(100), 0);
        assert_eq!(b.value(2000), 1000);
    }

    #[test]
    fn test_both_buckets_share_the_contract() {
        end_to_end(&Bucket::new(0, 1000));
        end_to_end(&ConcurrentBucket::new(0, 1000));
    }

    #[test]
    fn test_raw_credit_ignores_the_limit() {
        for b in [&Bucket::new(0, 1000) as &dyn CreditBucket, &ConcurrentBucket::new(0, 1000)] {
            assert_eq!(b.raw_credit(5000), 5000);
            assert_eq!(b.value(5000), 1000);
            b.advance(5000);
            assert_eq!(b.raw_credit(5000), 1000);
        }
    }

    #[test]
    fn test_default_have_uses_value() {
        let b = ConcurrentBucket::new(0, 1000);
        assert!(!b.have(10, 11));
        assert!(b.have(10, 10));
    }

    #[test]
    fn test_deficit_to_duration() {
        assert_eq!(deficit_to_duration(0), std::time::Duration::ZERO);
        assert_eq!(deficit_to_duration(-5), std::time::Duration::ZERO);
        assert_eq!(
            deficit_to_duration(1_500),
            std::time::Duration::from_nanos(1_500)
        );
    }
}
