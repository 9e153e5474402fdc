//! Logger initialization.
//!
//! Configures `env_logger` with a colored plain format or one JSON object per line.

use std::io::{self, Write};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use chrono::SecondsFormat;
use colored::{ColoredString, Colorize};
use env_logger::fmt::Formatter;
use log::{Level, LevelFilter, Record};

/// Initializes the global logger.
///
/// `RUST_LOG` seeds the filters; `level` then applies to this crate and as the
/// default for everything else, with `tokio` capped at `info`. Calling this
/// twice is an error, not a panic.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Quick debugging without CLI args
/// RUST_LOG=debug adaptive_throttle
///
/// # The CLI level wins over RUST_LOG
/// RUST_LOG=debug adaptive_throttle --log-level info
///
/// # Watch every price adjustment
/// adaptive_throttle --log-level debug --failure-rate 0.3
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder
        .filter_level(level)
        .filter_module("tokio", LevelFilter::Info)
        .filter_module("adaptive_throttle", level);

    match format {
        LogFormat::Json => builder.format(write_json),
        LogFormat::Plain => builder.format(write_plain),
    };

    builder.try_init()?;
    Ok(())
}

fn write_json(buf: &mut Formatter, record: &Record) -> io::Result<()> {
    let line = json_line(
        &chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        record,
    );
    writeln!(buf, "{line}")
}

fn json_line(ts: &str, record: &Record) -> serde_json::Value {
    serde_json::json!({
        "ts": ts,
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    })
}

fn write_plain(buf: &mut Formatter, record: &Record) -> io::Result<()> {
    let clock = chrono::Local::now().format("%H:%M:%S%.3f").to_string();
    writeln!(
        buf,
        "{} {} {} {}",
        clock.dimmed(),
        level_badge(record.level()),
        record.target().cyan(),
        record.args()
    )
}

/// Fixed-width, colored level tag.
fn level_badge(level: Level) -> ColoredString {
    let tag = format!("{:<5}", level.as_str());
    match level {
        Level::Error => tag.red().bold(),
        Level::Warn => tag.yellow(),
        Level::Info => tag.green(),
        Level::Debug => tag.blue(),
        Level::Trace => tag.purple(),
    }
}
