//! Server configuration module.
//!
//! One file configures the whole process: the shared sections from
//! [`PulseConfig`] plus the channel, generator, CORS and shutdown sections.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use pulse_api::{ApiConfig, CorsConfig, GeneratorConfig, WsConfig};
use pulse_core::config::{EnvOverridable, EnvOverride, PulseConfig, Validatable, ValidationContext, Validator};
use pulse_core::error::ConfigError;

/// Prefix of the environment variables that override the server configuration.
pub const ENV_PREFIX: &str = "PULSE";

/// Server configuration.
///
/// ```yaml
/// server:
///   host: 0.0.0.0
///   port: 8080
/// logging:
///   level: info
/// generator:
///   tick_interval_secs: 30
///   probability: 0.2
/// shutdown:
///   timeout_secs: 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Listener, logging and catalog sections.
    #[serde(flatten)]
    pub pulse: PulseConfig,

    /// WebSocket channel configuration.
    #[serde(default)]
    pub websocket: WsConfig,

    /// Periodic generator configuration.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Shutdown configuration.
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl ServerConfig {
    /// Creates a new server configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the API configuration from the relevant sections.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            listen: self.pulse.server.clone(),
            cors: self.cors.clone(),
            websocket: self.websocket.clone(),
            generator: self.generator.clone(),
        }
    }

}

impl EnvOverridable for ServerConfig {
    fn apply_env_overrides(&mut self, prefix: &str) {
        self.pulse.apply_env_overrides(prefix);
        self.websocket.apply_env_overrides(&format!("{prefix}_WEBSOCKET"));
        self.generator.apply_env_overrides(&format!("{prefix}_GENERATOR"));
        self.cors.apply_env_overrides(&format!("{prefix}_CORS"));
        self.shutdown.apply_env_overrides(&format!("{prefix}_SHUTDOWN"));
    }
}

impl Validatable for ServerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.pulse.validate()?;

        let mut ctx = ValidationContext::new();

        ctx.enter("websocket");
        self.websocket.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.enter("generator");
        self.generator.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.enter("cors");
        self.cors.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.enter("shutdown");
        self.shutdown.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.into_result()
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// How long to wait for background tasks to finish, in seconds.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl ShutdownConfig {
    /// Returns the shutdown timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validates the section against `ctx`.
    pub fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx).in_range("timeout_secs", &self.timeout_secs, &1, &600);
    }

    /// Applies `{prefix}_*` environment overrides.
    pub fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_number(&format!("{prefix}_TIMEOUT_SECS"), &mut self.timeout_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::config::{ConfigFormat, ConfigLoader};

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.shutdown.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_config_mapping() {
        let mut config = ServerConfig::default();
        config.pulse.server.port = 9090;
        config.generator.probability = 0.5;
        config.websocket.echo_pings = false;

        let api = config.api_config();
        assert_eq!(api.bind_address(), "127.0.0.1:9090");
        assert!((api.generator.probability - 0.5).abs() < f64::EPSILON);
        assert!(!api.websocket.echo_pings);
    }

    #[test]
    fn test_flattened_yaml() {
        let yaml = r"
server:
  host: 0.0.0.0
  port: 9000
logging:
  level: debug
  format: pretty
generator:
  tick_interval_secs: 5
  probability: 1.0
shutdown:
  timeout_secs: 3
";
        let config: ServerConfig = ConfigLoader::new().load_str(yaml, ConfigFormat::Yaml).unwrap();

        assert_eq!(config.pulse.server.host, "0.0.0.0");
        assert_eq!(config.pulse.server.port, 9000);
        assert_eq!(config.pulse.logging.level, "debug");
        assert_eq!(config.generator.tick_interval_secs, 5);
        assert_eq!(config.shutdown.timeout_secs, 3);
        assert_eq!(config.websocket.max_queue_size, 256);
        assert_eq!(config.pulse.catalog.len(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_section_is_reported_with_path() {
        let mut config = ServerConfig::default();
        config.generator.probability = 1.5;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("generator.probability"));
    }

    #[test]
    fn test_shutdown_timeout_bounds() {
        let mut config = ServerConfig::default();
        config.shutdown.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("shutdown.timeout_secs"));
    }
}
