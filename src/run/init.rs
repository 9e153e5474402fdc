//! Simulation setup.
//!
//! Validates the configuration and builds the controller under test.

use anyhow::{ensure, Context, Result};
use log::info;

use crate::backoff::{AdjustmentPolicy, Backoff, BackoffConfig, BurstCoupling};
use crate::bucket::ConcurrentBucket;
use crate::config::{Config, PolicyKind, NANOS_PER_MILLI};
use crate::rate::RateSpec;
use crate::Nanos;

/// Rejects configurations the simulator cannot run.
///
/// # Errors
///
/// Returns an error naming the offending option.
pub fn validate_config(config: &Config) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&config.failure_rate),
        "--failure-rate must be between 0.0 and 1.0, got {}",
        config.failure_rate
    );
    ensure!(
        config.max_price_multiple >= 1,
        "--max-price-multiple must be at least 1, got {}",
        config.max_price_multiple
    );
    ensure!(
        config.track_burst != Some(0),
        "--track-burst must be at least 1"
    );
    // With a fixed limit, a price above it could never be paid
    ensure!(
        config.track_burst.is_some() || config.max_price_multiple <= i64::from(config.burst),
        "--max-price-multiple ({}) exceeds --burst ({}); raise --burst or use --track-burst",
        config.max_price_multiple,
        config.burst
    );
    Ok(())
}

/// Adjustment policy selected on the command line.
pub fn policy_for(config: &Config) -> AdjustmentPolicy {
    match config.policy {
        PolicyKind::Step => AdjustmentPolicy::MultiplicativeStep,
        PolicyKind::Decay => {
            let window = Nanos::try_from(config.recovery_window_ms)
                .unwrap_or(Nanos::MAX)
                .saturating_mul(NANOS_PER_MILLI);
            AdjustmentPolicy::time_decay(window)
        }
    }
}

/// Builds the controller at `now`, starting with a full burst.
///
/// # Errors
///
/// Returns an error if the rate or burst cannot produce a valid bucket.
pub fn init_backoff(config: &Config, now: Nanos) -> Result<Backoff<ConcurrentBucket>> {
    let spec = RateSpec::per_second(config.rate).with_burst(config.burst);
    let params = spec
        .params(now)
        .context("Invalid --rate/--burst combination")?;

    let burst = match config.track_burst {
        Some(bursts) => BurstCoupling::TrackPrice { bursts },
        None => BurstCoupling::Fixed,
    };
    let max_price = params.price.saturating_mul(config.max_price_multiple);
    let backoff_config = BackoffConfig::new(params.price, max_price)
        .with_policy(policy_for(config))
        .with_burst_coupling(burst);

    info!(
        "Simulating {} requests at {}/s (burst {}, price {}ns, ceiling {}ns, policy {:?})",
        config.requests, config.rate, config.burst, params.price, max_price, config.policy
    );

    Ok(Backoff::with_bucket(
        ConcurrentBucket::new(params.baseline, params.limit),
        now,
        backoff_config,
    ))
}
