//! WebSocket channel configuration.

use pulse_core::config::{EnvOverride, ValidationContext, Validator};
use serde::{Deserialize, Serialize};

/// WebSocket channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsConfig {
    /// Maximum number of queued payloads per connection
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// Maximum inbound message size in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,

    /// Reply to client pings with a pong
    #[serde(default = "default_true")]
    pub echo_pings: bool,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            max_queue_size: default_max_queue_size(),
            max_message_size: default_max_message_size(),
            echo_pings: true,
        }
    }
}

impl WsConfig {
    /// Validates the section against `ctx`.
    pub fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx)
            .positive("max_queue_size", &self.max_queue_size)
            .in_range("max_message_size", &self.max_message_size, &256, &(16 * 1024 * 1024));
    }

    /// Applies `{prefix}_*` environment overrides.
    pub fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_number(&format!("{prefix}_MAX_QUEUE_SIZE"), &mut self.max_queue_size);
        EnvOverride::apply_number(
            &format!("{prefix}_MAX_MESSAGE_SIZE"),
            &mut self.max_message_size,
        );
        EnvOverride::apply_bool(&format!("{prefix}_ECHO_PINGS"), &mut self.echo_pings);
    }
}

fn default_max_queue_size() -> usize {
    256
}

fn default_max_message_size() -> usize {
    64 * 1024
}

fn default_true() -> bool {
    true
}
