//! Shared Pulse configuration structures.

use super::traits::{EnvOverridable, Validatable};
use super::validation::{EnvOverride, ValidationContext, Validator};
use crate::catalog::Catalog;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["json", "pretty"];
const LOG_ROTATIONS: [&str; 3] = ["hourly", "daily", "never"];

/// Base configuration shared by every Pulse server deployment.
///
/// # Example YAML
///
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 8080
///
/// logging:
///   level: debug
///   format: pretty
///
/// catalog:
///   - name: crypto
///     instruments:
///       - { symbol: "BTC/USD", name: "Bitcoin", base_price: 60000 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PulseConfig {
    /// Listener configuration.
    #[serde(default)]
    pub server: ListenConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Instrument catalogs.
    #[serde(default)]
    pub catalog: Catalog,
}

impl Validatable for PulseConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut ctx = ValidationContext::new();

        ctx.enter("server");
        self.server.validate_with_context(&mut ctx);
        ctx.exit();

        ctx.enter("logging");
        self.logging.validate_with_context(&mut ctx);
        ctx.exit();

        if let Err(e) = self.catalog.validate() {
            ctx.add_error(e);
        }

        ctx.into_result()
    }
}

/// With prefix `PULSE`:
///
/// - `PULSE_SERVER_PORT=9090` overrides `server.port`
/// - `PULSE_LOGGING_LEVEL=debug` overrides `logging.level`
impl EnvOverridable for PulseConfig {
    fn apply_env_overrides(&mut self, prefix: &str) {
        self.server.apply_env_overrides(&format!("{prefix}_SERVER"));
        self.logging.apply_env_overrides(&format!("{prefix}_LOGGING"));
    }
}

/// HTTP/WebSocket listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on. `0` picks an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ListenConfig {
    /// Returns the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx).require_non_empty("host", &self.host);
    }

    fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_string(&format!("{prefix}_HOST"), &mut self.host);
        EnvOverride::apply_number(&format!("{prefix}_PORT"), &mut self.port);
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty).
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files. Stdout only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    /// File rotation (hourly, daily, never).
    #[serde(default = "default_rotation")]
    pub rotation: String,

    /// Whether to also log to stdout when a directory is set.
    #[serde(default = "default_stdout_enabled")]
    pub stdout_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

fn default_stdout_enabled() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            directory: None,
            rotation: default_rotation(),
            stdout_enabled: default_stdout_enabled(),
        }
    }
}

impl LoggingConfig {
    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        let level = self.level.to_lowercase();
        let format = self.format.to_lowercase();
        let rotation = self.rotation.to_lowercase();
        Validator::new(ctx)
            .custom(
                "level",
                || LOG_LEVELS.contains(&level.as_str()),
                "Must be one of trace, debug, info, warn, error",
            )
            .custom(
                "format",
                || LOG_FORMATS.contains(&format.as_str()),
                "Must be json or pretty",
            )
            .custom(
                "rotation",
                || LOG_ROTATIONS.contains(&rotation.as_str()),
                "Must be hourly, daily or never",
            );
    }

    fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_string(&format!("{prefix}_LEVEL"), &mut self.level);
        EnvOverride::apply_string(&format!("{prefix}_FORMAT"), &mut self.format);
        EnvOverride::apply_optional_string(&format!("{prefix}_DIRECTORY"), &mut self.directory);
        EnvOverride::apply_string(&format!("{prefix}_ROTATION"), &mut self.rotation);
        EnvOverride::apply_bool(
            &format!("{prefix}_STDOUT_ENABLED"),
            &mut self.stdout_enabled,
        );
    }
}
