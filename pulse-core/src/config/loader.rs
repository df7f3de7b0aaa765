//! Configuration loader supporting YAML, TOML and JSON formats.

use super::traits::EnvOverridable;
use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    /// YAML format (.yaml, .yml)
    #[default]
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

impl ConfigFormat {
    /// Detects the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "yaml" | "yml" => Some(Self::Yaml),
                "toml" => Some(Self::Toml),
                "json" => Some(Self::Json),
                _ => None,
            })
    }
}

/// Configuration loader with format detection.
///
/// ```rust,ignore
/// use pulse_core::config::ConfigLoader;
///
/// let config: PulseConfig = ConfigLoader::new()
///     .with_env_prefix("PULSE")
///     .load_file_with_env("pulse.yaml")?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self { env_prefix: None }
    }

    /// Sets the environment variable prefix used for overrides (e.g. `PULSE`).
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Loads configuration from a file, detecting the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, its extension is not
    /// recognized, or its content cannot be parsed.
    pub fn load_file<T, P>(&self, path: P) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::InvalidFormat {
            path: path.display().to_string(),
            reason: "Unrecognized file extension. Supported: .yaml, .yml, .toml, .json".to_string(),
        })?;

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        self.load_str(&content, format).map_err(|e| match e {
            ConfigError::InvalidFormat { reason, .. } => ConfigError::InvalidFormat {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Loads a file, then applies environment overrides under the configured
    /// prefix. Without a prefix this is the same as [`ConfigLoader::load_file`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded.
    pub fn load_file_with_env<T, P>(&self, path: P) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + EnvOverridable,
        P: AsRef<Path>,
    {
        let mut config: T = self.load_file(path)?;
        self.apply_env(&mut config);
        Ok(config)
    }

    /// Applies environment overrides under the configured prefix, if any.
    pub fn apply_env<T: EnvOverridable>(&self, config: &mut T) {
        if let Some(prefix) = &self.env_prefix {
            config.apply_env_overrides(prefix);
        }
    }

    /// Loads configuration from a string with the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be parsed.
    pub fn load_str<T>(&self, content: &str, format: ConfigFormat) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
    {
        let config: T = match format {
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidFormat {
                    path: "<string>".to_string(),
                    reason: format!("YAML parse error: {e}"),
                })?
            }
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| ConfigError::InvalidFormat {
                path: "<string>".to_string(),
                reason: format!("TOML parse error: {e}"),
            })?,
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| ConfigError::InvalidFormat {
                    path: "<string>".to_string(),
                    reason: format!("JSON parse error: {e}"),
                })?
            }
        };

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        host: String,
        port: u16,
    }

    #[derive(Debug, Deserialize)]
    struct Prefixed {
        host: String,
        #[serde(skip)]
        applied: Option<String>,
    }

    impl EnvOverridable for Prefixed {
        fn apply_env_overrides(&mut self, prefix: &str) {
            self.applied = Some(prefix.to_string());
        }
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("pulse.yml")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("pulse.TOML")),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("pulse.json")),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("pulse.ini")), None);
    }

    #[test]
    fn test_load_str_formats() {
        let loader = ConfigLoader::new();
        let expected = Sample {
            host: "0.0.0.0".to_string(),
            port: 9000,
        };

        let yaml: Sample = loader
            .load_str("host: 0.0.0.0\nport: 9000\n", ConfigFormat::Yaml)
            .unwrap();
        let toml: Sample = loader
            .load_str("host = \"0.0.0.0\"\nport = 9000\n", ConfigFormat::Toml)
            .unwrap();
        let json: Sample = loader
            .load_str(r#"{"host":"0.0.0.0","port":9000}"#, ConfigFormat::Json)
            .unwrap();

        assert_eq!(yaml, expected);
        assert_eq!(toml, expected);
        assert_eq!(json, expected);
    }

    #[test]
    fn test_load_file_reports_path() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "host: [unclosed").unwrap();

        let err = ConfigLoader::new()
            .load_file::<Sample, _>(file.path())
            .unwrap_err();
        match err {
            ConfigError::InvalidFormat { path, reason } => {
                assert_eq!(path, file.path().display().to_string());
                assert!(reason.contains("YAML"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_file_with_env_uses_prefix() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "host: 0.0.0.0").unwrap();

        let config: Prefixed = ConfigLoader::new()
            .with_env_prefix("PULSE")
            .load_file_with_env(file.path())
            .unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.applied.as_deref(), Some("PULSE"));

        let config: Prefixed = ConfigLoader::new().load_file_with_env(file.path()).unwrap();
        assert_eq!(config.applied, None);
    }

    #[test]
    fn test_load_file_missing() {
        let err = ConfigLoader::new()
            .load_file::<Sample, _>("/definitely/not/here.yaml")
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }

    #[test]
    fn test_load_file_unknown_extension() {
        let err = ConfigLoader::new()
            .load_file::<Sample, _>("pulse.ini")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat { .. }));
    }
}
