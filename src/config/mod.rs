//! Application configuration and constants.
//!
//! This module provides:
//! - Tuning constants (default factors, jitter hash, decay resolution)
//! - Simulator defaults
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, PolicyKind};
