//! Network-related error types.
//!
//! Raised by the reconnecting client. Every variant is recoverable: the
//! client reacts by scheduling a reconnection, never by exiting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client transport error.
///
/// ```
/// use pulse_core::error::NetworkError;
///
/// let error = NetworkError::ConnectionFailed {
///     reason: "Connection refused".to_string(),
/// };
/// assert!(error.to_string().contains("Connection refused"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkError {
    /// Connection to the remote endpoint failed.
    #[error("[Network] Connection failed: {reason}")]
    ConnectionFailed {
        /// Reason for the connection failure.
        reason: String,
    },

    /// Connection attempt timed out.
    #[error("[Network] Connection timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// WebSocket protocol error on an open connection.
    #[error("[Network] WebSocket error: {reason}")]
    WebSocket {
        /// Reason for the WebSocket error.
        reason: String,
    },

    /// Connection was closed.
    #[error("[Network] Connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for the connection closure.
        reason: String,
    },
}

impl NetworkError {
    /// Returns true if this error is recoverable. Always true for this channel.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }

    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        use super::ErrorSeverity;
        match self {
            Self::ConnectionClosed { .. } => ErrorSeverity::Info,
            Self::Timeout { .. } | Self::ConnectionFailed { .. } | Self::WebSocket { .. } => {
                ErrorSeverity::Recoverable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let error = NetworkError::Timeout { timeout_ms: 5000 };
        assert_eq!(error.to_string(), "[Network] Connection timeout after 5000ms");
    }

    #[test]
    fn test_all_recoverable() {
        let errors = [
            NetworkError::ConnectionFailed {
                reason: "refused".to_string(),
            },
            NetworkError::Timeout { timeout_ms: 1 },
            NetworkError::WebSocket {
                reason: "protocol".to_string(),
            },
            NetworkError::ConnectionClosed {
                reason: "eof".to_string(),
            },
        ];
        assert!(errors.iter().all(NetworkError::is_recoverable));
    }
}
