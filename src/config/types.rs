//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::config::constants::{
    DEFAULT_SIM_BURST, DEFAULT_SIM_FAILURE_RATE, DEFAULT_SIM_INTERVAL_MS,
    DEFAULT_SIM_MAX_PRICE_MULTIPLE, DEFAULT_SIM_RATE, DEFAULT_SIM_RECOVERY_WINDOW_MS,
    DEFAULT_SIM_REQUESTS, DEFAULT_SIM_SEED,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Which adjustment policy the simulated controller runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// Price moves only on explicit back-off / cool-off steps
    Step,
    /// Price decays toward its floor over the recovery window
    Decay,
}

/// Simulator configuration.
///
/// Derives `clap::Parser` for the CLI, and `Default` so the library can be
/// driven programmatically.
///
/// # Examples
///
/// ```no_run
/// use adaptive_throttle::Config;
///
/// let config = Config {
///     rate: 50,
///     requests: 200,
///     failure_rate: 0.2,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "adaptive_throttle",
    about = "Simulates a token bucket with adaptive backoff over a stream of requests"
)]
pub struct Config {
    /// Target events per second
    #[arg(long, default_value_t = DEFAULT_SIM_RATE)]
    pub rate: u64,

    /// Burst capacity in events
    #[arg(long, default_value_t = DEFAULT_SIM_BURST)]
    pub burst: u32,

    /// Number of requests to simulate
    #[arg(long, default_value_t = DEFAULT_SIM_REQUESTS)]
    pub requests: u64,

    /// Milliseconds between request arrivals
    #[arg(long, default_value_t = DEFAULT_SIM_INTERVAL_MS)]
    pub interval_ms: u64,

    /// Probability (0.0-1.0) that a granted request fails
    #[arg(long, default_value_t = DEFAULT_SIM_FAILURE_RATE)]
    pub failure_rate: f64,

    /// Seed for failure injection
    #[arg(long, default_value_t = DEFAULT_SIM_SEED)]
    pub seed: u64,

    /// Adjustment policy
    #[arg(long, value_enum, default_value_t = PolicyKind::Step)]
    pub policy: PolicyKind,

    /// Recovery window of the decay policy, in milliseconds
    #[arg(long, default_value_t = DEFAULT_SIM_RECOVERY_WINDOW_MS)]
    pub recovery_window_ms: u64,

    /// Price ceiling as a multiple of the base price
    #[arg(long, default_value_t = DEFAULT_SIM_MAX_PRICE_MULTIPLE)]
    pub max_price_multiple: i64,

    /// Resize the burst limit to this many requests at the current price
    #[arg(long)]
    pub track_burst: Option<u32>,

    /// Pace requests in wall-clock time, waiting on the bucket (Ctrl-C cancels)
    #[arg(long)]
    pub real_time: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rate: DEFAULT_SIM_RATE,
            burst: DEFAULT_SIM_BURST,
            requests: DEFAULT_SIM_REQUESTS,
            interval_ms: DEFAULT_SIM_INTERVAL_MS,
            failure_rate: DEFAULT_SIM_FAILURE_RATE,
            seed: DEFAULT_SIM_SEED,
            policy: PolicyKind::Step,
            recovery_window_ms: DEFAULT_SIM_RECOVERY_WINDOW_MS,
            max_price_multiple: DEFAULT_SIM_MAX_PRICE_MULTIPLE,
            track_burst: None,
            real_time: false,
            json: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
