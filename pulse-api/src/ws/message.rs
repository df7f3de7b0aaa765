//! Control messages exchanged on the channel besides signals.

use chrono::{DateTime, Utc};
use pulse_core::types::iso_millis;
use serde::{Deserialize, Serialize};

/// Client-to-server message types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Identification sent once after connecting
    Hello {
        /// Client name
        client: String,
        /// Client clock, ISO-8601
        timestamp: String,
    },
    /// Keep-alive
    Ping {
        /// Client clock, ISO-8601
        #[serde(default)]
        timestamp: Option<String>,
    },
}

/// Server-to-client message types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Greeting sent after registration
    Welcome {
        /// Assigned connection id
        #[serde(rename = "connectionId")]
        connection_id: String,
        /// Server clock
        #[serde(with = "iso_millis")]
        timestamp: DateTime<Utc>,
    },
    /// Reply to a client ping
    Pong {
        /// Server clock
        #[serde(with = "iso_millis")]
        timestamp: DateTime<Utc>,
    },
}

impl ServerMessage {
    /// Creates a welcome stamped now.
    #[must_use]
    pub fn welcome(connection_id: impl Into<String>) -> Self {
        Self::Welcome {
            connection_id: connection_id.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a pong stamped now.
    #[must_use]
    pub fn pong() -> Self {
        Self::Pong {
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_hello_deserialize() {
        let json = r#"{"type":"hello","client":"pulse-client","timestamp":"2024-05-01T12:00:00.000Z"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Hello {
                client: "pulse-client".to_string(),
                timestamp: "2024-05-01T12:00:00.000Z".to_string(),
            }
        );
    }

    #[test]
    fn test_client_ping_without_timestamp() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Ping { timestamp: None });
    }

    #[test]
    fn test_welcome_wire_shape() {
        let json = serde_json::to_value(ServerMessage::welcome("conn-7")).unwrap();
        assert_eq!(json["type"], "welcome");
        assert_eq!(json["connectionId"], "conn-7");
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_pong_wire_shape() {
        let json = serde_json::to_value(ServerMessage::pong()).unwrap();
        assert_eq!(json["type"], "pong");
        assert!(json["timestamp"].is_string());
    }
}
