//! Application initialization.
//!
//! The library itself needs no setup; this only configures logging for the
//! simulator binary (and for anyone embedding it who wants the same output).

mod logger;

// Re-export public API
pub use logger::init_logger_with;
