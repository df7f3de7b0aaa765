//! Structured logging system for Pulse.
//!
//! Provides configurable logging with support for:
//! - JSON and pretty-print formats
//! - Multiple output targets (stdout, rolling files)
//! - `RUST_LOG` taking precedence over the configured level

mod config;

pub use config::{LogConfig, LogFormat, LogOutput, RotationConfig};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const LOG_FILE_NAME: &str = "pulse.log";

/// Initialize the logging system with the given configuration.
///
/// Returns guards that must be kept alive for the duration of the program
/// so buffered file output is flushed.
///
/// # Example
///
/// ```no_run
/// use pulse_telemetry::logging::{LogConfig, init_logging};
///
/// let _guards = init_logging(&LogConfig::default()).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<Vec<WorkerGuard>, LoggingError> {
    let mut guards = Vec::new();

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| LoggingError::InvalidConfig(format!("level '{}': {e}", config.level)))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    for output in &config.outputs {
        match output {
            LogOutput::Stdout => layers.push(create_stdout_layer(config)),
            LogOutput::File { path, rotation } => {
                let (layer, guard) = create_file_layer(config, path, *rotation)?;
                layers.push(layer);
                guards.push(guard);
            }
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(guards)
}

fn create_stdout_layer(config: &LogConfig) -> BoxedLayer {
    let base_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(config.include_thread_id)
        .with_file(config.include_file_info)
        .with_line_number(config.include_file_info);

    match config.format {
        LogFormat::Json => base_layer.json().flatten_event(true).boxed(),
        LogFormat::Pretty => base_layer.pretty().boxed(),
    }
}

fn create_file_layer(
    config: &LogConfig,
    path: &str,
    rotation: Option<RotationConfig>,
) -> Result<(BoxedLayer, WorkerGuard), LoggingError> {
    std::fs::create_dir_all(path)?;

    let file_appender = match rotation.unwrap_or(RotationConfig::Daily) {
        RotationConfig::Hourly => tracing_appender::rolling::hourly(path, LOG_FILE_NAME),
        RotationConfig::Daily => tracing_appender::rolling::daily(path, LOG_FILE_NAME),
        RotationConfig::Never => tracing_appender::rolling::never(path, LOG_FILE_NAME),
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Files are always JSON regardless of the stdout format.
    let layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(config.include_thread_id)
        .with_file(config.include_file_info)
        .with_line_number(config.include_file_info)
        .json()
        .flatten_event(true)
        .boxed();

    Ok((layer, guard))
}

/// Errors that can occur during logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory: {0}")]
    DirectoryCreation(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid logging configuration: {0}")]
    InvalidConfig(String),

    /// A global subscriber is already installed
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        // Only meaningful when RUST_LOG does not override the level.
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LogConfig::default().with_level("pulse=verbose");
        assert!(matches!(
            init_logging(&config),
            Err(LoggingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_file_layer_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested/logs");
        let path = nested.to_string_lossy().to_string();

        let result = create_file_layer(&LogConfig::default(), &path, Some(RotationConfig::Never));
        assert!(result.is_ok());
        assert!(nested.is_dir());
    }
}
