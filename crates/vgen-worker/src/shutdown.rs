//! Shutdown signal handling.
//!
//! The first interrupt asks the scheduler to stop once the current run is
//! done. A second interrupt means the operator does not want to wait.

use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

/// Exit status used when a second signal aborts the process.
pub const ABORT_EXIT_CODE: i32 = 130;

/// Turn a stream of signals into a graceful shutdown request.
///
/// Sets `shutdown` on the first signal. Returns `true` when a second signal
/// arrives, `false` if the signal source goes away first.
pub async fn escalate_signals(
    mut signals: mpsc::UnboundedReceiver<()>,
    shutdown: watch::Sender<bool>,
) -> bool {
    if signals.recv().await.is_none() {
        return false;
    }
    info!("Received shutdown signal, stopping after the current run (signal again to abort)");
    let _ = shutdown.send(true);

    if signals.recv().await.is_none() {
        return false;
    }
    warn!("Received second shutdown signal, aborting");
    true
}

/// Forward every SIGINT/SIGTERM into `signals` until the receiver is gone.
pub async fn forward_signals(signals: mpsc::UnboundedSender<()>) {
    loop {
        wait_for_signal().await;
        if signals.send(()).is_err() {
            break;
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    tokio::signal::ctrl_c().await.ok();
}
