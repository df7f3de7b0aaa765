//! Errors for on-demand signal requests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when an externally supplied signal request is incomplete or
/// malformed. No broadcast happens when this is returned.
///
/// ```
/// use pulse_core::error::SignalError;
///
/// let err = SignalError::invalid("price", "must be positive");
/// assert!(err.to_string().contains("price"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalError {
    /// A required field is missing or carries an unusable value.
    #[error("[Signal] Invalid signal request, field '{field}': {reason}")]
    InvalidSignalRequest {
        /// Offending request field.
        field: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl SignalError {
    /// Creates an `InvalidSignalRequest` error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSignalRequest {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the offending field name.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidSignalRequest { field, .. } => field,
        }
    }
}
