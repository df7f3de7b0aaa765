//! Logging configuration types.

use pulse_core::config::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the logging system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,

    /// Output targets
    #[serde(default = "default_outputs")]
    pub outputs: Vec<LogOutput>,

    /// Include thread IDs in log output
    #[serde(default)]
    pub include_thread_id: bool,

    /// Include file and line information
    #[serde(default)]
    pub include_file_info: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            outputs: default_outputs(),
            include_thread_id: false,
            include_file_info: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_outputs() -> Vec<LogOutput> {
    vec![LogOutput::Stdout]
}

impl LogConfig {
    /// Overrides the level, e.g. from a `--debug` flag.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(settings: &LoggingConfig) -> Self {
        let format = if settings.format.eq_ignore_ascii_case("pretty") {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        };

        let mut outputs = Vec::new();
        if settings.directory.is_none() || settings.stdout_enabled {
            outputs.push(LogOutput::Stdout);
        }
        if let Some(dir) = &settings.directory {
            outputs.push(LogOutput::File {
                path: dir.clone(),
                rotation: RotationConfig::parse(&settings.rotation),
            });
        }

        Self {
            level: settings.level.to_lowercase(),
            format,
            outputs,
            ..Self::default()
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format for log aggregation systems
    #[default]
    Json,
    /// Human-readable format for development
    Pretty,
}

/// Log output target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogOutput {
    /// Output to stdout
    Stdout,
    /// Output to file with optional rotation
    File {
        /// Directory path for log files
        path: String,
        /// Rotation configuration
        rotation: Option<RotationConfig>,
    },
}

/// Log rotation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationConfig {
    /// Rotate logs hourly
    Hourly,
    /// Rotate logs daily
    Daily,
    /// Never rotate (single file)
    Never,
}

impl RotationConfig {
    /// Parses a rotation name, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            "never" => Some(Self::Never),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.outputs, vec![LogOutput::Stdout]);
    }

    #[test]
    fn test_from_settings_with_directory() {
        let settings = LoggingConfig {
            level: "DEBUG".to_string(),
            format: "pretty".to_string(),
            directory: Some("/var/log/pulse".to_string()),
            rotation: "hourly".to_string(),
            stdout_enabled: false,
        };

        let config = LogConfig::from(&settings);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(
            config.outputs,
            vec![LogOutput::File {
                path: "/var/log/pulse".to_string(),
                rotation: Some(RotationConfig::Hourly),
            }]
        );
    }

    #[test]
    fn test_from_settings_without_directory_keeps_stdout() {
        let settings = LoggingConfig {
            stdout_enabled: false,
            ..LoggingConfig::default()
        };
        let config = LogConfig::from(&settings);
        assert_eq!(config.outputs, vec![LogOutput::Stdout]);
    }

    #[test]
    fn test_output_serialization() {
        let output = LogOutput::File {
            path: "logs".to_string(),
            rotation: Some(RotationConfig::Daily),
        };
        let json = serde_json::to_string(&output).unwrap();
        assert_eq!(json, r#"{"type":"file","path":"logs","rotation":"daily"}"#);
    }
}
