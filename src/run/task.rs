//! Per-request processing.

use rand::rngs::StdRng;
use rand::Rng;

use crate::backoff::{Backoff, Outcome};
use crate::bucket::CreditBucket;
use crate::Nanos;

use super::report::SimulationReport;

/// Draws the result of an admitted request.
///
/// `failure_rate` must be within `[0, 1]`.
pub fn draw_outcome(rng: &mut StdRng, failure_rate: f64) -> Outcome {
    if rng.random_bool(failure_rate) {
        Outcome::Failure
    } else {
        Outcome::Success
    }
}

/// Offers one request to the bucket at `ts` without waiting.
///
/// Admitted requests get an outcome from `rng` that is fed back into the
/// controller. Returns whether the request was admitted.
pub fn process_request<B: CreditBucket>(
    backoff: &Backoff<B>,
    ts: Nanos,
    rng: &mut StdRng,
    failure_rate: f64,
    report: &mut SimulationReport,
) -> bool {
    report.requests += 1;

    if !backoff.take(ts) {
        report.throttled += 1;
        report.observe_price(backoff.price_at(ts));
        return false;
    }

    report.granted += 1;
    complete_request(backoff, ts, draw_outcome(rng, failure_rate), report);
    true
}

/// Feeds the outcome of an admitted request back into the controller.
pub fn complete_request<B: CreditBucket>(
    backoff: &Backoff<B>,
    ts: Nanos,
    outcome: Outcome,
    report: &mut SimulationReport,
) {
    if outcome == Outcome::Failure {
        report.failures += 1;
    }
    report.observe_adjustment(backoff.record(ts, outcome));
    report.observe_price(backoff.price_at(ts));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff::BackoffConfig;
    use crate::config::PolicyKind;
    use rand::SeedableRng;

    #[test]
    fn test_draw_outcome_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..100).all(|_| draw_outcome(&mut rng, 0.0) == Outcome::Success));
        assert!((0..100).all(|_| draw_outcome(&mut rng, 1.0) == Outcome::Failure));
    }

    #[test]
    fn test_process_request_throttles_when_empty() {
        let backoff = Backoff::new(0, 1000, 10_000);
        let mut rng = StdRng::seed_from_u64(1);
        let mut report = SimulationReport::new(PolicyKind::Step, 1000);

        assert!(!process_request(&backoff, 0, &mut rng, 0.0, &mut report));
        assert_eq!(report.requests, 1);
        assert_eq!(report.throttled, 1);
        assert_eq!(report.granted, 0);
    }

    #[test]
    fn test_process_request_feeds_failure_back() {
        let config = BackoffConfig::new(1000, 100_000).without_jitter();
        let backoff = Backoff::with_config(0, 100_000, config);
        backoff.set_value(0, 50_000);
        let mut rng = StdRng::seed_from_u64(1);
        let mut report = SimulationReport::new(PolicyKind::Step, 1000);

        assert!(process_request(&backoff, 0, &mut rng, 1.0, &mut report));
        assert_eq!(report.granted, 1);
        assert_eq!(report.failures, 1);
        assert_eq!(report.backed_off, 1);
        assert_eq!(report.max_price, 3400);
        assert_eq!(backoff.value(0), 49_000);
    }
}
