//! Simulation driver.
//!
//! Runs a [`Backoff`](crate::Backoff) against a stream of requests arriving at
//! a fixed interval, injecting failures at a configured rate. In virtual time
//! (the default) arrivals that find the bucket empty are throttled and the run
//! is fully deterministic for a given seed. In real time every arrival waits
//! for credit instead, and Ctrl-C cancels the pending wait.

mod init;
mod report;
mod shutdown;
mod task;

use std::time::Duration;

use anyhow::Result;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;

use crate::bucket::sleep_or_cancel;
use crate::clock::{Clock, ManualClock, MonotonicClock};
use crate::config::{Config, NANOS_PER_MILLI, SIM_LOGGING_INTERVAL};
use crate::Nanos;

use init::{init_backoff, validate_config};
use report::log_summary;
pub use report::SimulationReport;
use shutdown::{shutdown_gracefully, spawn_interrupt_listener};
use task::{complete_request, draw_outcome, process_request};

/// Runs a simulation with the provided configuration.
///
/// # Errors
///
/// Returns an error if the configuration is invalid. A cancelled real-time
/// run is not an error; it is reported through
/// [`SimulationReport::cancelled`].
///
/// # Example
///
/// ```no_run
/// use adaptive_throttle::{run_simulation, Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let report = run_simulation(&Config::default()).await?;
/// println!("{} of {} requests admitted", report.granted, report.requests);
/// # Ok(())
/// # }
/// ```
pub async fn run_simulation(config: &Config) -> Result<SimulationReport> {
    validate_config(config)?;

    let report = if config.real_time {
        run_real_time(config).await?
    } else {
        run_virtual_time(config)?
    };

    log_summary(&report);
    Ok(report)
}

fn interval_nanos(config: &Config) -> Nanos {
    Nanos::try_from(config.interval_ms)
        .unwrap_or(Nanos::MAX)
        .saturating_mul(NANOS_PER_MILLI)
}

fn log_progress(report: &SimulationReport) {
    if report.requests % SIM_LOGGING_INTERVAL == 0 {
        info!(
            "Processed {} requests ({} granted, {} throttled), price {}ns",
            report.requests, report.granted, report.throttled, report.final_price
        );
    }
}

fn run_virtual_time(config: &Config) -> Result<SimulationReport> {
    let clock = ManualClock::new(0);
    let backoff = init_backoff(config, clock.now())?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let interval = interval_nanos(config);

    let mut report = SimulationReport::new(config.policy, backoff.config().min_price);
    for _ in 0..config.requests {
        process_request(
            &backoff,
            clock.now(),
            &mut rng,
            config.failure_rate,
            &mut report,
        );
        log_progress(&report);
        clock.advance(interval);
    }

    report.set_elapsed(clock.now());
    Ok(report)
}

async fn run_real_time(config: &Config) -> Result<SimulationReport> {
    let clock = MonotonicClock::new();
    let backoff = init_backoff(config, clock.now())?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let interval = Duration::from_millis(config.interval_ms);

    let cancel = CancellationToken::new();
    let listener = spawn_interrupt_listener(cancel.clone());

    let mut report = SimulationReport::new(config.policy, backoff.config().min_price);
    for i in 0..config.requests {
        if i > 0 && sleep_or_cancel(&cancel, interval).await.is_err() {
            report.cancelled = true;
            break;
        }

        report.requests += 1;
        if let Err(e) = backoff.wait(&cancel, clock.now()).await {
            warn!("Request {} not admitted: {}", report.requests, e);
            report.cancelled = true;
            break;
        }

        report.granted += 1;
        let outcome = draw_outcome(&mut rng, config.failure_rate);
        complete_request(&backoff, clock.now(), outcome, &mut report);
        log_progress(&report);
    }

    shutdown_gracefully(cancel, listener).await;
    report.set_elapsed(clock.now());
    Ok(report)
}
