//! Listener connection tracking.
//!
//! Each accepted WebSocket becomes a [`ListenerConnection`]: an id, a
//! readiness flag and the sending half of a bounded outbound queue drained
//! by the connection's writer task. The [`ConnectionRegistry`] owns every
//! live connection for its whole lifetime.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use pulse_core::error::{DeliveryError, RegistryError};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Unique connection identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generates a new process-unique connection ID.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Wraps a raw id value.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the inner ID value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Readiness of a connection. Only `Open` accepts broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadyState {
    /// Upgraded but not yet greeted.
    Connecting = 0,
    /// Ready to receive signals.
    Open = 1,
    /// Close in progress.
    Closing = 2,
    /// Closed; awaiting removal.
    Closed = 3,
}

impl ReadyState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// One open duplex channel to a listener.
#[derive(Debug)]
pub struct ListenerConnection {
    id: ConnectionId,
    state: AtomicU8,
    sender: mpsc::Sender<Arc<str>>,
    connected_at: DateTime<Utc>,
}

impl ListenerConnection {
    /// Creates a connection in the `Connecting` state.
    #[must_use]
    pub fn new(id: ConnectionId, sender: mpsc::Sender<Arc<str>>) -> Self {
        Self {
            id,
            state: AtomicU8::new(ReadyState::Connecting as u8),
            sender,
            connected_at: Utc::now(),
        }
    }

    /// Returns the connection id.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns when the connection was accepted.
    #[must_use]
    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Returns the current readiness.
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        ReadyState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Updates the readiness.
    pub fn set_ready_state(&self, state: ReadyState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Returns true if the connection accepts broadcasts.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    /// Queues a payload without waiting.
    ///
    /// # Errors
    ///
    /// `QueueFull` if the outbound queue is at capacity, `ChannelClosed` if
    /// the writer task is gone.
    pub fn try_deliver(&self, payload: Arc<str>) -> Result<(), DeliveryError> {
        self.sender.try_send(payload).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::QueueFull {
                id: self.id.to_string(),
            },
            TrySendError::Closed(_) => DeliveryError::ChannelClosed {
                id: self.id.to_string(),
            },
        })
    }
}

/// Registry of all live listener connections.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Arc<ListenerConnection>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Adds a connection.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateConnection` if the id is already registered.
    pub fn register(&self, connection: Arc<ListenerConnection>) -> Result<(), RegistryError> {
        match self.connections.entry(connection.id()) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateConnection {
                id: entry.key().to_string(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(connection);
                Ok(())
            }
        }
    }

    /// Removes a connection. Returns false if it was not registered.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        self.connections.remove(&id).is_some()
    }

    /// Returns the number of registered connections.
    #[must_use]
    pub fn size(&self) -> usize {
        self.connections.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Returns true if `id` is registered.
    #[must_use]
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Copies the current members, ordered by id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<ListenerConnection>> {
        let mut members: Vec<_> = self
            .connections
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        members.sort_by_key(|c| c.id());
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(capacity: usize) -> (Arc<ListenerConnection>, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Arc::new(ListenerConnection::new(ConnectionId::generate(), tx)),
            rx,
        )
    }

    #[test]
    fn test_connection_id_generate() {
        let id1 = ConnectionId::generate();
        let id2 = ConnectionId::generate();
        assert_ne!(id1, id2);
        assert!(id2 > id1);
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::from_raw(42).to_string(), "conn-42");
    }

    #[test]
    fn test_ready_state_transitions() {
        let (conn, _rx) = connection(1);
        assert_eq!(conn.ready_state(), ReadyState::Connecting);
        assert!(!conn.is_open());

        conn.set_ready_state(ReadyState::Open);
        assert!(conn.is_open());

        conn.set_ready_state(ReadyState::Closing);
        assert_eq!(conn.ready_state(), ReadyState::Closing);
    }

    #[test]
    fn test_try_deliver_queue_full() {
        let (conn, _rx) = connection(1);
        conn.try_deliver(Arc::from("a")).unwrap();

        let err = conn.try_deliver(Arc::from("b")).unwrap_err();
        assert!(matches!(err, DeliveryError::QueueFull { .. }));
        assert!(!err.evicts_connection());
    }

    #[test]
    fn test_try_deliver_closed() {
        let (conn, rx) = connection(1);
        drop(rx);

        let err = conn.try_deliver(Arc::from("a")).unwrap_err();
        assert!(matches!(err, DeliveryError::ChannelClosed { .. }));
        assert!(err.evicts_connection());
    }

    #[test]
    fn test_register_rejects_duplicate() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = connection(1);

        registry.register(Arc::clone(&conn)).unwrap();
        let err = registry.register(Arc::clone(&conn)).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateConnection {
                id: conn.id().to_string()
            }
        );
        assert_eq!(registry.size(), 1);
    }

    #[test]
    fn test_unregister_tolerates_double_close() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = connection(1);
        registry.register(Arc::clone(&conn)).unwrap();

        assert!(registry.unregister(conn.id()));
        assert!(!registry.unregister(conn.id()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_ordered_and_detached() {
        let registry = ConnectionRegistry::new();
        let (a, _ra) = connection(1);
        let (b, _rb) = connection(1);
        let (c, _rc) = connection(1);
        registry.register(Arc::clone(&c)).unwrap();
        registry.register(Arc::clone(&a)).unwrap();
        registry.register(Arc::clone(&b)).unwrap();

        let snapshot = registry.snapshot();
        let ids: Vec<_> = snapshot.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec![a.id(), b.id(), c.id()]);

        registry.unregister(b.id());
        assert_eq!(snapshot.len(), 3);
        assert_eq!(registry.size(), 2);
    }
}
