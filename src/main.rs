//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `adaptive_throttle` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use adaptive_throttle::initialization::init_logger_with;
use adaptive_throttle::{run_simulation, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_simulation(&config).await {
        Ok(report) if config.json => {
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{}", json);
            Ok(())
        }
        Ok(report) => {
            // Print user-friendly summary
            println!(
                "✅ Simulated {} request{} ({} granted, {} throttled, {} failed) in {:.1}ms",
                report.requests,
                if report.requests == 1 { "" } else { "s" },
                report.granted,
                report.throttled,
                report.failures,
                report.elapsed_ms
            );
            println!(
                "Price went from {}ns up to {}ns and ended at {}ns",
                report.base_price, report.max_price, report.final_price
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("adaptive_throttle error: {:#}", e);
            process::exit(1);
        }
    }
}
