//! Fan-out of signals to every open listener.

use pulse_core::error::DeliveryError;
use pulse_core::types::Signal;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use super::connection::ConnectionRegistry;

/// Delivers each signal to every registered, open connection.
///
/// A signal is serialized once and the same `Arc<str>` payload is queued on
/// every member of a registry snapshot, in id order. Writes never block.
#[derive(Debug, Clone)]
pub struct SignalBroadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl SignalBroadcaster {
    /// Creates a broadcaster over the given registry.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Broadcasts a signal and returns how many connections it was written to.
    #[instrument(skip(self, signal), fields(signal_id = %signal.id(), symbol = %signal.symbol()))]
    pub fn broadcast(&self, signal: &Signal) -> usize {
        let payload = match encode(signal) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "Delivery failure");
                return 0;
            }
        };

        let delivered = self.broadcast_payload(&payload);
        debug!(delivered, "Signal broadcast");
        delivered
    }

    /// Queues a pre-serialized payload on every open connection.
    pub fn broadcast_payload(&self, payload: &Arc<str>) -> usize {
        let mut delivered = 0;

        for connection in self.registry.snapshot() {
            if !connection.is_open() {
                continue;
            }

            match connection.try_deliver(Arc::clone(payload)) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(conn_id = %connection.id(), error = %e, "Delivery failure");
                    if e.evicts_connection() {
                        self.registry.unregister(connection.id());
                    }
                }
            }
        }

        delivered
    }
}

/// Serializes a signal into the payload shared by every connection.
fn encode(signal: &Signal) -> Result<Arc<str>, DeliveryError> {
    signal
        .to_json()
        .map(Arc::from)
        .map_err(|e| DeliveryError::Serialization {
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::connection::{ConnectionId, ListenerConnection, ReadyState};
    use pulse_core::types::{SignalSide, Timeframe};
    use tokio::sync::mpsc;

    fn open_connection(
        registry: &ConnectionRegistry,
        capacity: usize,
    ) -> (Arc<ListenerConnection>, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(capacity);
        let conn = Arc::new(ListenerConnection::new(ConnectionId::generate(), tx));
        conn.set_ready_state(ReadyState::Open);
        registry.register(Arc::clone(&conn)).unwrap();
        (conn, rx)
    }

    fn signal() -> Signal {
        Signal::new("BTC/USD", SignalSide::Buy, 60_000.5, Timeframe::D1)
            .unwrap()
            .with_market("Bitcoin")
            .with_status("active")
    }

    #[test]
    fn test_encode_matches_signal_json() {
        let signal = signal();
        let payload = encode(&signal).unwrap();
        assert_eq!(&*payload, signal.to_json().unwrap().as_str());
    }

    #[test]
    fn test_broadcast_no_connections() {
        let broadcaster = SignalBroadcaster::new(Arc::new(ConnectionRegistry::new()));
        assert_eq!(broadcaster.broadcast(&signal()), 0);
    }

    #[test]
    fn test_broadcast_same_text_to_every_open_connection() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut receivers: Vec<_> = (0..3)
            .map(|_| open_connection(&registry, 4).1)
            .collect();
        let broadcaster = SignalBroadcaster::new(Arc::clone(&registry));

        let signal = signal();
        assert_eq!(broadcaster.broadcast(&signal), 3);

        let expected = signal.to_json().unwrap();
        for rx in &mut receivers {
            assert_eq!(&*rx.try_recv().unwrap(), expected.as_str());
        }
    }

    #[test]
    fn test_broadcast_skips_non_open() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (_open, mut open_rx) = open_connection(&registry, 4);
        let (closing, mut closing_rx) = open_connection(&registry, 4);
        closing.set_ready_state(ReadyState::Closing);

        let broadcaster = SignalBroadcaster::new(Arc::clone(&registry));
        assert_eq!(broadcaster.broadcast(&signal()), 1);

        assert!(open_rx.try_recv().is_ok());
        assert!(closing_rx.try_recv().is_err());
        assert_eq!(registry.size(), 2);
    }

    #[test]
    fn test_closed_channel_is_evicted_others_still_receive() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (_a, mut rx_a) = open_connection(&registry, 4);
        let (failing, failing_rx) = open_connection(&registry, 4);
        let (_c, mut rx_c) = open_connection(&registry, 4);
        drop(failing_rx);

        let broadcaster = SignalBroadcaster::new(Arc::clone(&registry));
        assert_eq!(broadcaster.broadcast(&signal()), 2);

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_c.try_recv().is_ok());
        assert!(!registry.contains(failing.id()));
        assert_eq!(registry.size(), 2);
    }

    #[test]
    fn test_full_queue_drops_payload_but_keeps_connection() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (slow, mut slow_rx) = open_connection(&registry, 1);
        let broadcaster = SignalBroadcaster::new(Arc::clone(&registry));

        assert_eq!(broadcaster.broadcast(&signal()), 1);
        assert_eq!(broadcaster.broadcast(&signal()), 0);

        assert!(registry.contains(slow.id()));
        assert!(slow_rx.try_recv().is_ok());
        assert!(slow_rx.try_recv().is_err());
    }

    #[test]
    fn test_unregistered_connection_gets_nothing() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (gone, mut gone_rx) = open_connection(&registry, 4);
        let (_stay, mut stay_rx) = open_connection(&registry, 4);

        assert!(registry.unregister(gone.id()));
        assert_eq!(registry.size(), 1);

        let broadcaster = SignalBroadcaster::new(Arc::clone(&registry));
        assert_eq!(broadcaster.broadcast(&signal()), 1);
        assert!(stay_rx.try_recv().is_ok());
        assert!(gone_rx.try_recv().is_err());
    }
}
