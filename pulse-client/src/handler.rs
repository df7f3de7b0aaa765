//! Application callbacks.

use async_trait::async_trait;
use pulse_core::types::Signal;
use tracing::{info, warn};

/// Receives what the client surfaces.
#[async_trait]
pub trait SignalHandler: Send + Sync {
    /// Called for every received signal.
    async fn on_signal(&self, signal: Signal);

    /// Called when a connection is established.
    async fn on_connected(&self) {}

    /// Called when an established connection is lost or closed.
    async fn on_disconnected(&self, _reason: Option<String>) {}
}

/// Surfaces signals as log alerts.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

#[async_trait]
impl SignalHandler for LoggingHandler {
    async fn on_signal(&self, signal: Signal) {
        warn!(
            id = %signal.id(),
            symbol = %signal.symbol(),
            market = signal.market().unwrap_or(signal.symbol()),
            side = %signal.side(),
            entry_price = signal.entry_price(),
            timeframe = %signal.timeframe(),
            "Signal alert"
        );
    }

    async fn on_connected(&self) {
        info!("Connected to signal channel");
    }

    async fn on_disconnected(&self, reason: Option<String>) {
        info!(reason = reason.as_deref().unwrap_or("unknown"), "Disconnected from signal channel");
    }
}
