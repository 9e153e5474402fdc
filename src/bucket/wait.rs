//! Cancellable suspension for `wait`.
//!
//! A wait is split in two so the borrow happens synchronously at call time and
//! the returned future owns everything it needs (`Send + 'static`), even when
//! the bucket itself is a single-owner `Bucket`.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use super::deficit_to_duration;
use crate::error_handling::WaitError;
use crate::Nanos;

/// Sleeps for `wait` unless `cancel` fires first.
///
/// Returns immediately for a zero duration. If both happen at once,
/// cancellation wins.
///
/// # Errors
///
/// Returns [`WaitError::Cancelled`] with the unserved part of the wait when
/// the token fires before the sleep finishes.
pub async fn sleep_or_cancel(cancel: &CancellationToken, wait: Duration) -> Result<(), WaitError> {
    if wait.is_zero() {
        return Ok(());
    }

    let deadline = Instant::now() + wait;
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(WaitError::Cancelled {
            remaining: deadline.saturating_duration_since(Instant::now()),
        }),
        _ = sleep_until(deadline) => Ok(()),
    }
}

/// Borrows through `borrow` unless `cancel` is already cancelled.
///
/// `None` means nothing was borrowed.
pub(crate) fn start_wait(
    cancel: &CancellationToken,
    borrow: impl FnOnce() -> Nanos,
) -> Option<Nanos> {
    if cancel.is_cancelled() {
        return None;
    }
    Some(borrow())
}

/// Suspends for the deficit produced by [`start_wait`].
pub(crate) async fn finish_wait(
    cancel: CancellationToken,
    deficit: Option<Nanos>,
) -> Result<(), WaitError> {
    match deficit {
        None => Err(WaitError::Cancelled {
            remaining: Duration::ZERO,
        }),
        Some(deficit) => sleep_or_cancel(&cancel, deficit_to_duration(deficit)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes_without_cancel() {
        let cancel = CancellationToken::new();
        let start = Instant::now();

        sleep_or_cancel(&cancel, Duration::from_millis(200))
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_sleep() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = sleep_or_cancel(&cancel, Duration::from_secs(1))
            .await
            .unwrap_err();

        let WaitError::Cancelled { remaining } = err;
        assert!(remaining <= Duration::from_millis(950));
        assert!(remaining > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_zero_wait_ignores_cancelled_token() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(sleep_or_cancel(&cancel, Duration::ZERO).await.is_ok());
    }

    #[test]
    fn test_start_wait_skips_borrow_when_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut called = false;
        assert_eq!(
            start_wait(&cancel, || {
                called = true;
                10
            }),
            None
        );
        assert!(!called);
    }

    #[tokio::test]
    async fn test_finish_wait_without_borrow_is_cancelled() {
        let cancel = CancellationToken::new();
        let err = finish_wait(cancel, None).await.unwrap_err();
        assert_eq!(
            err,
            WaitError::Cancelled {
                remaining: Duration::ZERO
            }
        );
    }
}
