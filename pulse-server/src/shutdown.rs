//! Graceful shutdown handling.
//!
//! One [`ShutdownController`] is shared by the HTTP server, the signal
//! ticker and the OS signal listener. Any of them may trigger it and all of
//! them observe it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

/// Shutdown controller for coordinating graceful shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownController {
    /// Whether shutdown has been initiated.
    shutdown_initiated: Arc<AtomicBool>,
    /// Sender for shutdown notification.
    shutdown_tx: broadcast::Sender<()>,
    /// Watch channel for shutdown completion.
    completion_tx: Arc<watch::Sender<bool>>,
    /// Receiver for shutdown completion.
    completion_rx: watch::Receiver<bool>,
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownController {
    /// Creates a new shutdown controller.
    #[must_use]
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (completion_tx, completion_rx) = watch::channel(false);

        Self {
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            completion_tx: Arc::new(completion_tx),
            completion_rx,
        }
    }

    /// Initiates shutdown. Only the first call notifies.
    pub fn initiate_shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Shutdown initiated");
            let _ = self.shutdown_tx.send(());
        }
    }

    /// Returns whether shutdown has been initiated.
    #[must_use]
    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }

    /// Completes once shutdown has been initiated, including before the call.
    pub async fn wait_for_shutdown(&self) {
        let mut rx = self.shutdown_tx.subscribe();
        if self.is_shutdown_initiated() {
            return;
        }
        let _ = rx.recv().await;
    }

    /// Returns a receiver for shutdown signals.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Marks shutdown as complete.
    pub fn mark_complete(&self) {
        let _ = self.completion_tx.send(true);
    }

    /// Waits for shutdown to complete.
    ///
    /// Returns `false` if `timeout` elapsed first.
    pub async fn wait_for_completion(&self, timeout: Duration) -> bool {
        let mut rx = self.completion_rx.clone();

        match tokio::time::timeout(timeout, rx.wait_for(|done| *done)).await {
            Ok(result) => result.is_ok(),
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis(), "Shutdown completion timeout");
                false
            }
        }
    }
}

/// Waits for SIGINT or SIGTERM (Ctrl+C elsewhere) and initiates shutdown.
pub async fn setup_signal_handlers(controller: ShutdownController) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let (mut sigint, mut sigterm) =
            match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
                (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
                (Err(e), _) | (_, Err(e)) => {
                    error!(error = %e, "Failed to install signal handlers");
                    return;
                }
            };

        tokio::select! {
            _ = sigint.recv() => info!("Received SIGINT (Ctrl+C)"),
            _ = sigterm.recv() => info!("Received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            return;
        }
        info!("Received Ctrl+C");
    }

    controller.initiate_shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_initiation_is_idempotent() {
        let controller = ShutdownController::new();
        assert!(!controller.is_shutdown_initiated());

        let mut rx = controller.subscribe();
        controller.initiate_shutdown();
        controller.initiate_shutdown();

        assert!(controller.is_shutdown_initiated());
        assert!(rx.recv().await.is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_wait_for_shutdown_from_other_task() {
        let controller = ShutdownController::new();

        let ctrl = controller.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            ctrl.initiate_shutdown();
        });

        let result =
            tokio::time::timeout(Duration::from_secs(1), controller.wait_for_shutdown()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wait_after_initiation_returns_immediately() {
        let controller = ShutdownController::new();
        controller.initiate_shutdown();

        let result =
            tokio::time::timeout(Duration::from_millis(100), controller.wait_for_shutdown()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_completion() {
        let controller = ShutdownController::new();
        controller.initiate_shutdown();
        controller.mark_complete();

        assert!(controller.wait_for_completion(Duration::from_millis(100)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_completion_timeout() {
        let controller = ShutdownController::new();
        controller.initiate_shutdown();

        assert!(!controller.wait_for_completion(Duration::from_millis(50)).await);
    }
}
