//! Interrupt handling for real-time runs.

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `cancel` on the first Ctrl-C.
pub fn spawn_interrupt_listener(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => {
                    info!("Interrupt received, cancelling pending waits");
                    cancel.cancel();
                }
                Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
            },
        }
    })
}

/// Stops the listener and waits for it to exit.
pub async fn shutdown_gracefully(cancel: CancellationToken, listener: JoinHandle<()>) {
    cancel.cancel();
    let _ = listener.await;
}
