//! Error handling.
//!
//! This module provides the error types of the crate:
//! - **Wait errors**: cancellation of a suspended `wait`
//! - **Rate specification errors**: parameters rejected before construction
//! - **Initialization errors**: logger setup
//!
//! Insufficient credit is an ordinary result, not an error.

mod types;

// Re-export public API
pub use types::{InitializationError, RateSpecError, WaitError};
