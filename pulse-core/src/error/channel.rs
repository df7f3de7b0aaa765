//! Server-side channel errors: registry membership and per-connection delivery.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ErrorSeverity;

/// Connection registry invariant violations.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryError {
    /// A connection with this id is already registered.
    #[error("[Registry] Duplicate connection: {id}")]
    DuplicateConnection {
        /// Connection id.
        id: String,
    },
}

/// A write to one connection failed during a broadcast.
///
/// Delivery failures are isolated: they are logged and never abort delivery
/// to the remaining connections.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryError {
    /// The connection's outbound channel is closed; the listener is gone.
    #[error("[Delivery] Channel closed for {id}")]
    ChannelClosed {
        /// Connection id.
        id: String,
    },

    /// The connection's outbound queue is full; the payload was dropped.
    #[error("[Delivery] Outbound queue full for {id}")]
    QueueFull {
        /// Connection id.
        id: String,
    },

    /// The payload could not be serialized.
    #[error("[Delivery] Serialization failed: {reason}")]
    Serialization {
        /// Serializer message.
        reason: String,
    },
}

impl DeliveryError {
    /// Returns true if the failing connection should be dropped from the registry.
    #[must_use]
    pub fn evicts_connection(&self) -> bool {
        matches!(self, Self::ChannelClosed { .. })
    }

    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ChannelClosed { .. } => ErrorSeverity::Info,
            Self::QueueFull { .. } => ErrorSeverity::Warning,
            Self::Serialization { .. } => ErrorSeverity::Recoverable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_connection_display() {
        let err = RegistryError::DuplicateConnection {
            id: "conn-3".to_string(),
        };
        assert_eq!(err.to_string(), "[Registry] Duplicate connection: conn-3");
    }

    #[test]
    fn test_only_closed_channel_evicts() {
        let closed = DeliveryError::ChannelClosed {
            id: "conn-1".to_string(),
        };
        let full = DeliveryError::QueueFull {
            id: "conn-1".to_string(),
        };
        assert!(closed.evicts_connection());
        assert!(!full.evicts_connection());
        assert!(full.severity().is_recoverable());
    }

    #[test]
    fn test_serialization_failure_keeps_connection() {
        let err = DeliveryError::Serialization {
            reason: "key must be a string".to_string(),
        };
        assert!(!err.evicts_connection());
        assert_eq!(err.severity(), ErrorSeverity::Recoverable);
        assert_eq!(
            err.to_string(),
            "[Delivery] Serialization failed: key must be a string"
        );
    }
}
