//! API configuration types.
//!
//! Binding, CORS, WebSocket and generator settings for one server instance.

use pulse_core::config::{EnvOverride, ListenConfig, ValidationContext, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::generator::GeneratorConfig;
use crate::ws::WsConfig;

/// API server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bind address
    #[serde(default)]
    pub listen: ListenConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// WebSocket configuration
    #[serde(default)]
    pub websocket: WsConfig,

    /// Periodic generator configuration
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl ApiConfig {
    /// Returns the server bind address.
    #[must_use]
    pub fn bind_address(&self) -> String {
        self.listen.bind_addr()
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Enable permissive CORS
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Preflight cache duration in seconds
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_secs: default_max_age(),
        }
    }
}

impl CorsConfig {
    /// Returns the preflight cache duration.
    #[must_use]
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    /// Validates the section against `ctx`.
    pub fn validate_with_context(&self, ctx: &mut ValidationContext) {
        Validator::new(ctx).in_range("max_age_secs", &self.max_age_secs, &0, &86_400);
    }

    /// Applies `{prefix}_*` environment overrides.
    pub fn apply_env_overrides(&mut self, prefix: &str) {
        EnvOverride::apply_bool(&format!("{prefix}_ENABLED"), &mut self.enabled);
        EnvOverride::apply_number(&format!("{prefix}_MAX_AGE_SECS"), &mut self.max_age_secs);
    }
}

fn default_true() -> bool {
    true
}

fn default_max_age() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_default() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert!(config.cors.enabled);
        assert_eq!(config.cors.max_age(), Duration::from_secs(3600));
        assert_eq!(config.generator.tick_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_cors_max_age_bounds() {
        let config = CorsConfig {
            max_age_secs: 100_000,
            ..CorsConfig::default()
        };
        let mut ctx = ValidationContext::new();
        config.validate_with_context(&mut ctx);
        assert!(!ctx.is_valid());
    }
}
