//! Error types and handling framework.
//!
//! The error system is organized by the component that raises it:
//! - `PulseError` - Top-level error type
//!   - `SignalError` - Rejected on-demand signal requests
//!   - `RegistryError` - Connection registry invariant violations
//!   - `DeliveryError` - Per-connection write failures during a broadcast
//!   - `NetworkError` - Client-side transport failures
//!   - `ConfigError` - Configuration errors
//!
//! Only `SignalError` is meant to cross the boundary to an external caller.
//! Everything else is logged and isolated where it happens.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error severity levels for categorizing errors.
///
/// ```
/// use pulse_core::error::ErrorSeverity;
///
/// let severity = ErrorSeverity::Recoverable;
/// assert!(severity.is_recoverable());
/// assert!(!severity.is_fatal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Unrecoverable error; the process cannot continue normal operation.
    Fatal,

    /// The operation failed but can be retried or skipped.
    #[default]
    Recoverable,

    /// Non-critical issue that should be logged.
    Warning,

    /// Expected condition worth noting.
    Info,
}

impl ErrorSeverity {
    /// Returns true if this error is recoverable (not fatal).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Fatal)
    }

    /// Returns true if this error is fatal (unrecoverable).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }

    /// Returns the severity as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Recoverable => "RECOVERABLE",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

mod channel;
mod config;
mod network;
mod signal;

pub use channel::{DeliveryError, RegistryError};
pub use config::ConfigError;
pub use network::NetworkError;
pub use signal::SignalError;

/// Top-level error type for Pulse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PulseError {
    /// Rejected signal request.
    #[error("{0}")]
    Signal(#[from] SignalError),

    /// Registry invariant violation.
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// Per-connection delivery failure.
    #[error("{0}")]
    Delivery(#[from] DeliveryError),

    /// Transport error.
    #[error("{0}")]
    Network(#[from] NetworkError),

    /// Configuration error.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl PulseError {
    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Signal(_) | Self::Registry(_) => ErrorSeverity::Warning,
            Self::Delivery(e) => e.severity(),
            Self::Network(e) => e.severity(),
            Self::Config(_) => ErrorSeverity::Fatal,
        }
    }

    /// Returns true if this error is recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }

    /// Returns the error category as a string.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Signal(_) => "signal",
            Self::Registry(_) => "registry",
            Self::Delivery(_) => "delivery",
            Self::Network(_) => "network",
            Self::Config(_) => "config",
        }
    }
}

/// Result type alias using `PulseError`.
pub type Result<T> = std::result::Result<T, PulseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_display() {
        assert_eq!(ErrorSeverity::Fatal.to_string(), "FATAL");
        assert!(ErrorSeverity::Warning.is_recoverable());
    }

    #[test]
    fn test_pulse_error_from_conversions() {
        let err: PulseError = SignalError::invalid("price", "missing").into();
        assert_eq!(err.category(), "signal");
        assert!(err.is_recoverable());

        let err: PulseError = NetworkError::ConnectionClosed {
            reason: "eof".to_string(),
        }
        .into();
        assert_eq!(err.category(), "network");
        assert!(err.is_recoverable());

        let err: PulseError = ConfigError::missing_field("host").into();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_transparent_display() {
        let err: PulseError = RegistryError::DuplicateConnection {
            id: "conn-7".to_string(),
        }
        .into();
        assert!(err.to_string().contains("conn-7"));
    }
}
