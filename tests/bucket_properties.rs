//! Property-based tests for the accounting core.
//!
//! Random operation scripts are replayed against both bucket implementations,
//! checking the accounting invariants after every step and that the two
//! implementations never disagree.

use adaptive_throttle::backoff::decayed_price;
use adaptive_throttle::{
    AdjustmentPolicy, Backoff, BackoffConfig, Bucket, ConcurrentBucket, CreditBucket, Fract,
    Nanos,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Op {
    Take(Nanos),
    Borrow(Nanos),
    Return(Nanos),
    Value,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..5_000i64).prop_map(Op::Take),
        (0..5_000i64).prop_map(Op::Borrow),
        (0..5_000i64).prop_map(Op::Return),
        Just(Op::Value),
    ]
}

/// Non-decreasing timestamps paired with operations.
fn arb_script() -> impl Strategy<Value = Vec<(Nanos, Op)>> {
    prop::collection::vec((0..3_000i64, arb_op()), 1..60).prop_map(|steps| {
        let mut ts = 0;
        steps
            .into_iter()
            .map(|(dt, op)| {
                ts += dt;
                (ts, op)
            })
            .collect()
    })
}

fn apply<B: CreditBucket + ?Sized>(b: &B, ts: Nanos, op: Op) -> Nanos {
    match op {
        Op::Take(cost) => Nanos::from(b.take(ts, cost)),
        Op::Borrow(cost) => b.borrow(ts, cost),
        Op::Return(cost) => {
            b.return_tokens(ts, cost);
            0
        }
        Op::Value => b.value(ts),
    }
}

// ── Property tests ──────────────────────────────────────────────────────────

proptest! {
    /// Credit never exceeds the limit, whatever happened before.
    #[test]
    fn value_is_clamped_to_limit(limit in 1..100_000i64, script in arb_script(), later in 0..1_000_000i64) {
        let b = Bucket::new(0, limit);
        for &(ts, op) in &script {
            apply(&b, ts, op);
        }
        let last = script.last().map_or(0, |&(ts, _)| ts);
        let v1 = b.value(last);
        let v2 = b.value(last + later);
        prop_assert!(v1 <= limit);
        prop_assert!(v2 <= limit);
    }

    /// A refused take leaves the credit untouched.
    #[test]
    fn failed_take_spends_nothing(limit in 1..100_000i64, fill in 0..100_000i64, cost in 0..200_000i64, ts in 0..1_000i64) {
        for b in [&Bucket::new(0, limit) as &dyn CreditBucket, &ConcurrentBucket::new(0, limit)] {
            b.set_value(ts, fill);
            let before = b.value(ts);
            if !b.take(ts, cost) {
                prop_assert_eq!(b.value(ts), before);
            }
        }
    }

    /// `borrow` reports no wait exactly when `take` would have succeeded.
    #[test]
    fn borrow_zero_iff_take_succeeds(limit in 1..100_000i64, fill in -50_000..100_000i64, cost in 0..200_000i64, ts in 0..1_000i64) {
        let taker = Bucket::new(0, limit);
        let borrower = Bucket::new(0, limit);
        taker.set_value(ts, fill);
        borrower.set_value(ts, fill);

        prop_assert_eq!(borrower.borrow(ts, cost) == 0, taker.take(ts, cost));
    }

    /// Returning what was just taken restores the credit.
    #[test]
    fn return_undoes_take(limit in 1..100_000i64, script in arb_script(), cost in 0..5_000i64) {
        for b in [&Bucket::new(0, limit) as &dyn CreditBucket, &ConcurrentBucket::new(0, limit)] {
            for &(ts, op) in &script {
                apply(b, ts, op);
            }
            let ts = script.last().map_or(0, |&(ts, _)| ts);
            let before = b.value(ts);
            if b.take(ts, cost) {
                b.return_tokens(ts, cost);
            }
            prop_assert_eq!(b.value(ts), before);
        }
    }

    /// Single-threaded, both implementations give identical answers.
    #[test]
    fn implementations_agree(limit in 1..100_000i64, script in arb_script()) {
        let local = Bucket::new(0, limit);
        let shared = ConcurrentBucket::new(0, limit);
        for &(ts, op) in &script {
            prop_assert_eq!(apply(&local, ts, op), apply(&shared, ts, op), "diverged at ts {} on {:?}", ts, op);
        }
    }

    /// Adjustments keep the price within its bounds.
    #[test]
    fn backoff_price_stays_in_range(
        min in 1..10_000i64,
        spread in 1..100i64,
        steps in prop::collection::vec((any::<bool>(), 0..1i64 << 40), 1..100),
    ) {
        let max = min * spread;
        let b = Backoff::new(0, min, max);
        let mut ts = 0;
        for (up, dt) in steps {
            ts += dt;
            let p = if up { b.back_off(ts) } else { b.cool_off(ts) };
            prop_assert!((min..=max).contains(&p), "price {} outside [{}, {}]", p, min, max);
        }
    }

    /// Without jitter, back-off strictly increases the price until it hits
    /// the ceiling, and then stays there.
    #[test]
    fn backoff_converges_to_ceiling(min in 1..10_000i64, spread in 2..1_000i64) {
        let max = min * spread;
        let b = Backoff::with_config(0, max, BackoffConfig::new(min, max).without_jitter());

        let mut prev = b.price();
        // Each step grows the price by more than 1.7x
        let bound = 2 * (64 - spread.leading_zeros()) + 2;
        for step in 0..=bound {
            let p = b.back_off(Nanos::from(step));
            if prev < max {
                prop_assert!(p > prev);
            } else {
                prop_assert_eq!(p, max);
            }
            prev = p;
        }
        prop_assert_eq!(prev, max);
    }

    /// Decay hits its endpoints exactly.
    #[test]
    fn decay_boundaries(
        start in -1_000_000i64..1_000_000,
        floor in 0..1_000_000i64,
        extra in 1..1_000_000i64,
        window in 1..100_000_000i64,
        after in 0..1_000_000i64,
        num in 1..10u16,
    ) {
        let peak = floor + extra;
        let bias = Fract::new(num, 10);
        prop_assert_eq!(decayed_price(start, start, peak, floor, window, bias), peak);
        prop_assert_eq!(decayed_price(start + window + after, start, peak, floor, window, bias), floor);
    }

    /// Any bias keeps the decayed price between floor and peak.
    #[test]
    fn decay_stays_in_bracket(
        offset in 0..2_000_000_000i64,
        floor in 0..1_000_000i64,
        extra in 1..1_000_000i64,
        window in 1..1_000_000_000i64,
        num in 0..40u16,
    ) {
        let peak = floor + extra;
        let p = decayed_price(offset, 0, peak, floor, window, Fract::new(num, 10));
        prop_assert!((floor..=peak).contains(&p), "price {} outside [{}, {}]", p, floor, peak);
    }

    /// Under time decay the effective price only goes down between adjustments.
    #[test]
    fn decayed_price_is_non_increasing(window in 1_000_000..1_000_000_000i64, samples in prop::collection::vec(0..2_000_000_000i64, 2..20)) {
        let config = BackoffConfig::new(1_000, 1_000_000)
            .without_jitter()
            .with_policy(AdjustmentPolicy::time_decay(window));
        let b = Backoff::with_config(0, 1_000_000, config);
        b.back_off(0);
        b.back_off(0);

        let mut samples = samples;
        samples.sort_unstable();
        let mut prev = b.price();
        for ts in samples {
            let p = b.price_at(ts);
            prop_assert!(p <= prev);
            prop_assert!(p >= 1_000);
            prev = p;
        }
    }
}

// ── Scenario ────────────────────────────────────────────────────────────────

#[test]
fn take_refuse_then_borrow_into_deficit() {
    let b = Bucket::new(0, 1000);
    b.set_value(0, 1000);

    assert!(b.take(0, 500));
    assert_eq!(b.value(0), 500);

    assert!(!b.take(0, 600));
    assert_eq!(b.value(0), 500);

    assert_eq!(b.borrow(0, 600), 100);
    assert_eq!(b.value(0), -100);
}
