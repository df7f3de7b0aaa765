//! Client configuration.

use pulse_core::config::{EnvOverridable, EnvOverride, Validatable, ValidationContext, Validator};
use pulse_core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the reconnecting client.
///
/// Reconnection uses a fixed delay with no attempt limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket endpoint URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// Name sent in the hello message.
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Connection attempt timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Delay before reconnecting after a disconnect, in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Keep-alive ping interval in milliseconds.
    #[serde(default = "default_keepalive_interval_ms")]
    pub keepalive_interval_ms: u64,
}

fn default_url() -> String {
    "ws://127.0.0.1:8080/ws".to_string()
}

fn default_client_name() -> String {
    "pulse-client".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_reconnect_delay_ms() -> u64 {
    5_000
}

fn default_keepalive_interval_ms() -> u64 {
    30_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            client_name: default_client_name(),
            connect_timeout_ms: default_connect_timeout_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            keepalive_interval_ms: default_keepalive_interval_ms(),
        }
    }
}

impl ClientConfig {
    /// Creates a new builder for `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Returns the connection timeout as a Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns the reconnect delay as a Duration.
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Returns the keep-alive interval as a Duration.
    #[must_use]
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_millis(self.keepalive_interval_ms)
    }

    /// Validates the configuration against `ctx`.
    pub fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx)
            .valid_ws_url("url", &self.url)
            .require_non_empty("client_name", &self.client_name)
            .positive("connect_timeout_ms", &self.connect_timeout_ms)
            .positive("reconnect_delay_ms", &self.reconnect_delay_ms)
            .positive("keepalive_interval_ms", &self.keepalive_interval_ms);
    }
}

impl EnvOverridable for ClientConfig {
    fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_string(&format!("{prefix}_URL"), &mut self.url);
        EnvOverride::apply_string(&format!("{prefix}_NAME"), &mut self.client_name);
        EnvOverride::apply_number(
            &format!("{prefix}_CONNECT_TIMEOUT_MS"),
            &mut self.connect_timeout_ms,
        );
        EnvOverride::apply_number(
            &format!("{prefix}_RECONNECT_DELAY_MS"),
            &mut self.reconnect_delay_ms,
        );
        EnvOverride::apply_number(
            &format!("{prefix}_KEEPALIVE_INTERVAL_MS"),
            &mut self.keepalive_interval_ms,
        );
    }
}

impl Validatable for ClientConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut ctx = ValidationContext::new();
        ctx.enter("client");
        self.validate_with_context(&mut ctx);
        ctx.into_result()
    }
}

/// Builder for `ClientConfig`.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    url: Option<String>,
    client_name: Option<String>,
    connect_timeout_ms: Option<u64>,
    reconnect_delay_ms: Option<u64>,
    keepalive_interval_ms: Option<u64>,
}

impl ClientConfigBuilder {
    /// Sets the WebSocket URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the client name.
    #[must_use]
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(duration_ms(timeout));
        self
    }

    /// Sets the reconnection delay.
    #[must_use]
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay_ms = Some(duration_ms(delay));
        self
    }

    /// Sets the keep-alive interval.
    #[must_use]
    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval_ms = Some(duration_ms(interval));
        self
    }

    /// Builds the `ClientConfig`.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            url: self.url.unwrap_or_else(default_url),
            client_name: self.client_name.unwrap_or_else(default_client_name),
            connect_timeout_ms: self
                .connect_timeout_ms
                .unwrap_or_else(default_connect_timeout_ms),
            reconnect_delay_ms: self
                .reconnect_delay_ms
                .unwrap_or_else(default_reconnect_delay_ms),
            keepalive_interval_ms: self
                .keepalive_interval_ms
                .unwrap_or_else(default_keepalive_interval_ms),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
