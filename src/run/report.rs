//! Simulation results.

use log::info;
use serde::Serialize;

use crate::backoff::Adjustment;
use crate::config::{PolicyKind, NANOS_PER_MILLI};
use crate::Nanos;

/// Results of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    /// Policy the controller ran with
    pub policy: PolicyKind,
    /// Requests that arrived
    pub requests: u64,
    /// Requests admitted by the bucket
    pub granted: u64,
    /// Requests turned away for lack of credit
    pub throttled: u64,
    /// Admitted requests that failed
    pub failures: u64,
    /// Price increases
    pub backed_off: u64,
    /// Price decreases
    pub cooled_off: u64,
    /// Price floor, in nanoseconds
    pub base_price: Nanos,
    /// Lowest price seen
    pub min_price: Nanos,
    /// Highest price seen
    pub max_price: Nanos,
    /// Price in effect at the end
    pub final_price: Nanos,
    /// Elapsed time (virtual or wall clock) in milliseconds
    pub elapsed_ms: f64,
    /// Whether the run was interrupted
    pub cancelled: bool,
}

impl SimulationReport {
    /// Empty report with every price at `base_price`.
    pub(crate) fn new(policy: PolicyKind, base_price: Nanos) -> Self {
        SimulationReport {
            policy,
            requests: 0,
            granted: 0,
            throttled: 0,
            failures: 0,
            backed_off: 0,
            cooled_off: 0,
            base_price,
            min_price: base_price,
            max_price: base_price,
            final_price: base_price,
            elapsed_ms: 0.0,
            cancelled: false,
        }
    }

    pub(crate) fn observe_price(&mut self, price: Nanos) {
        self.min_price = self.min_price.min(price);
        self.max_price = self.max_price.max(price);
        self.final_price = price;
    }

    pub(crate) fn observe_adjustment(&mut self, adjustment: Adjustment) {
        match adjustment {
            Adjustment::BackedOff => self.backed_off += 1,
            Adjustment::CooledOff => self.cooled_off += 1,
            Adjustment::Held => {}
        }
    }

    pub(crate) fn set_elapsed(&mut self, elapsed: Nanos) {
        #[allow(clippy::cast_precision_loss)]
        let ms = elapsed as f64 / NANOS_PER_MILLI as f64;
        self.elapsed_ms = ms;
    }

    /// Share of arrivals that were admitted (1.0 for an empty run).
    pub fn admission_ratio(&self) -> f64 {
        if self.requests == 0 {
            return 1.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.granted as f64 / self.requests as f64;
        ratio
    }
}

/// Logs the end-of-run summary.
///
/// Works with both plain and JSON log formats.
pub fn log_summary(report: &SimulationReport) {
    info!(
        "Simulated {} requests in {:.1}ms: {} granted, {} throttled ({:.1}% admitted)",
        report.requests,
        report.elapsed_ms,
        report.granted,
        report.throttled,
        report.admission_ratio() * 100.0
    );
    info!(
        "Outcomes: {} failures, {} back-offs, {} cool-offs",
        report.failures, report.backed_off, report.cooled_off
    );
    info!(
        "Price (ns): base {}, min {}, max {}, final {}",
        report.base_price, report.min_price, report.max_price, report.final_price
    );
    if report.cancelled {
        info!("Run was cancelled before all requests arrived");
    }
}
