//! Client wire messages.

use chrono::{DateTime, Utc};
use pulse_core::types::{Signal, SignalSide, iso_millis};
use serde::Serialize;

/// Messages sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Identification, sent once per connection.
    Hello {
        /// Client name
        client: String,
        /// Send time
        #[serde(with = "iso_millis")]
        timestamp: DateTime<Utc>,
    },
    /// Keep-alive.
    Ping {
        /// Send time
        #[serde(with = "iso_millis")]
        timestamp: DateTime<Utc>,
    },
}

impl OutboundMessage {
    /// Builds a hello stamped with the current time.
    #[must_use]
    pub fn hello(client: impl Into<String>) -> Self {
        Self::Hello {
            client: client.into(),
            timestamp: Utc::now(),
        }
    }

    /// Builds a ping stamped with the current time.
    #[must_use]
    pub fn ping() -> Self {
        Self::Ping {
            timestamp: Utc::now(),
        }
    }

    /// Serializes the message to JSON text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Classification of one inbound text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A broadcast signal.
    Signal(Box<Signal>),
    /// Well-formed JSON that is not a signal, e.g. a welcome or pong.
    Other {
        /// Value of the `type` field, if it was a string
        kind: Option<String>,
    },
    /// Not JSON, or a signal-typed payload missing required fields.
    Malformed {
        /// Parser message
        reason: String,
    },
}

/// Decodes an inbound text frame.
///
/// A payload is a signal when its `type` field is `buy` or `sell`.
#[must_use]
pub fn decode_inbound(text: &str) -> Inbound {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            return Inbound::Malformed {
                reason: e.to_string(),
            };
        }
    };

    let kind = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned);
    let is_signal = kind
        .as_deref()
        .is_some_and(|k| SignalSide::ALL.iter().any(|side| side.as_str() == k));

    if !is_signal {
        return Inbound::Other { kind };
    }

    match serde_json::from_value::<Signal>(value) {
        Ok(signal) => Inbound::Signal(Box::new(signal)),
        Err(e) => Inbound::Malformed {
            reason: e.to_string(),
        },
    }
}
