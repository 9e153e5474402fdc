//! Error type definitions.
//!
//! Running out of credit is not an error: `take` reports it as `false` and
//! `borrow` as a wait duration. The types here cover the few real failure paths.

use std::time::Duration;

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Failure of a `wait` call.
///
/// Cancellation is the only way a wait can fail. It is surfaced to the caller
/// as-is and never retried internally.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    /// The cancellation token fired before the credit deficit elapsed.
    ///
    /// `remaining` is the part of the wait that was not served. Tokens
    /// borrowed by the call stay spent.
    #[error("wait cancelled with {remaining:?} still to go")]
    Cancelled {
        /// Portion of the wait that had not elapsed yet
        remaining: Duration,
    },
}

/// Invalid rate specification.
///
/// Returned by [`RateSpec::params`](crate::RateSpec::params) so that the
/// accounting core never sees a zero price or limit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateSpecError {
    /// The event count of the rate is zero.
    #[error("rate must allow at least one event")]
    ZeroEvents,

    /// The window of the rate is zero.
    #[error("rate window must be non-zero")]
    ZeroWindow,

    /// `per / events` rounds down to zero nanoseconds.
    #[error("rate of {events} events per {per:?} is finer than one nanosecond per event")]
    PriceUnderflow {
        /// Requested event count
        events: u64,
        /// Requested window
        per: Duration,
    },

    /// Burst capacity is zero, so nothing could ever be taken.
    #[error("burst must be at least one event")]
    ZeroBurst,

    /// Initial fill level is not a fraction in `[0, 1]`.
    #[error("initial fill {0} is outside [0, 1]")]
    FillOutOfRange(f64),

    /// The derived price or limit does not fit the 64-bit nanosecond range.
    #[error("rate parameters overflow the nanosecond range")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_error_display_mentions_remaining() {
        let err = WaitError::Cancelled {
            remaining: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "wait cancelled with 250ms still to go");
    }

    #[test]
    fn test_rate_spec_error_messages() {
        assert_eq!(
            RateSpecError::ZeroEvents.to_string(),
            "rate must allow at least one event"
        );
        assert_eq!(
            RateSpecError::FillOutOfRange(1.5).to_string(),
            "initial fill 1.5 is outside [0, 1]"
        );
        let underflow = RateSpecError::PriceUnderflow {
            events: 10,
            per: Duration::from_nanos(5),
        };
        assert!(underflow.to_string().contains("10 events per 5ns"));
    }
}
