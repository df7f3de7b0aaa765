//! Main server implementation.
//!
//! [`PulseServer`] owns the process lifecycle: logging, the shared
//! application state, the periodic ticker and the HTTP/WebSocket server.

use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use pulse_api::{ApiServer, AppState, SignalTicker};
use pulse_core::config::{ConfigLoader, Validatable};
use pulse_telemetry::logging::{LogConfig, LoggingError, init_logging};

use crate::config::{ENV_PREFIX, ServerConfig};
use crate::shutdown::{ShutdownController, setup_signal_handlers};

/// Lifecycle state of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Not started, or fully stopped.
    Stopped,
    /// Initialized and ready to run.
    Starting,
    /// Serving.
    Running,
    /// Draining background tasks.
    ShuttingDown,
}

/// The Pulse signal server.
pub struct PulseServer {
    config: ServerConfig,
    state: Arc<RwLock<ServerState>>,
    shutdown: ShutdownController,
    app_state: Option<Arc<AppState>>,
    _log_guards: Vec<WorkerGuard>,
}

impl PulseServer {
    /// Creates a server in the `Stopped` state.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(ServerState::Stopped)),
            shutdown: ShutdownController::new(),
            app_state: None,
            _log_guards: Vec::new(),
        }
    }

    /// Loads, overrides and validates a configuration file.
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServerConfig, ServerError> {
        let config: ServerConfig = ConfigLoader::new()
            .with_env_prefix(ENV_PREFIX)
            .load_file_with_env(path)
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        config
            .validate()
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        Ok(config)
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the current lifecycle state.
    pub async fn state(&self) -> ServerState {
        *self.state.read().await
    }

    /// Returns the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }

    /// Returns the application state once initialized.
    #[must_use]
    pub fn app_state(&self) -> Option<&Arc<AppState>> {
        self.app_state.as_ref()
    }

    /// Initializes logging and the application state.
    pub async fn initialize(&mut self) -> Result<(), ServerError> {
        {
            let mut state = self.state.write().await;
            if *state != ServerState::Stopped {
                return Err(ServerError::InvalidState(
                    "Server must be stopped to initialize".to_string(),
                ));
            }
            *state = ServerState::Starting;
        }

        self.init_logging()?;
        info!("Initializing Pulse server...");

        let app_state = Arc::new(AppState::new(
            self.config.api_config(),
            self.config.pulse.catalog.clone(),
        ));
        info!(
            instruments = app_state.catalog().len(),
            tick_interval_secs = self.config.generator.tick_interval_secs,
            probability = self.config.generator.probability,
            "Signal channel ready"
        );
        self.app_state = Some(app_state);

        Ok(())
    }

    fn init_logging(&mut self) -> Result<(), ServerError> {
        let log_config = LogConfig::from(&self.config.pulse.logging);

        match init_logging(&log_config) {
            Ok(guards) => {
                self._log_guards = guards;
                info!(log_level = %log_config.level, "Logging initialized");
                Ok(())
            }
            Err(LoggingError::AlreadyInitialized(reason)) => {
                warn!(reason = %reason, "Keeping the existing log subscriber");
                Ok(())
            }
            Err(e) => Err(ServerError::InitializationError(format!(
                "Failed to initialize logging: {e}"
            ))),
        }
    }

    /// Binds the configured address, installs OS signal handlers and serves
    /// until shutdown.
    pub async fn run(&self) -> Result<(), ServerError> {
        let app_state = self.require_app_state()?;
        let listener = ApiServer::with_state(self.config.api_config(), Arc::clone(app_state))
            .bind()
            .await
            .map_err(|e| ServerError::RuntimeError(e.to_string()))?;

        let shutdown_ctrl = self.shutdown.clone();
        tokio::spawn(async move {
            setup_signal_handlers(shutdown_ctrl).await;
        });

        self.serve(listener).await
    }

    /// Serves on an already bound listener until shutdown is initiated.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let app_state = Arc::clone(self.require_app_state()?);
        {
            let mut state = self.state.write().await;
            if *state != ServerState::Starting {
                return Err(ServerError::InvalidState(
                    "Server must be initialized before running".to_string(),
                ));
            }
            *state = ServerState::Running;
        }

        let ticker_shutdown = self.shutdown.clone();
        let ticker = tokio::spawn(SignalTicker::new(Arc::clone(&app_state)).run(async move {
            ticker_shutdown.wait_for_shutdown().await;
        }));

        let api_server = ApiServer::with_state(self.config.api_config(), app_state);
        let shutdown = self.shutdown.clone();
        let result = api_server
            .serve(listener, async move {
                shutdown.wait_for_shutdown().await;
            })
            .await
            .map_err(|e| ServerError::RuntimeError(format!("API server error: {e}")));

        // The API server can also stop on its own error; the ticker must follow.
        self.shutdown.initiate_shutdown();
        self.graceful_shutdown(ticker).await;

        result
    }

    async fn graceful_shutdown(&self, ticker: JoinHandle<u64>) {
        *self.state.write().await = ServerState::ShuttingDown;
        info!("Performing graceful shutdown...");

        match tokio::time::timeout(self.config.shutdown.timeout(), ticker).await {
            Ok(Ok(emitted)) => info!(emitted, "Ticker drained"),
            Ok(Err(e)) => warn!(error = %e, "Ticker task failed"),
            Err(_) => warn!(
                timeout_secs = self.config.shutdown.timeout_secs,
                "Ticker did not stop in time"
            ),
        }

        if let Some(app_state) = &self.app_state {
            info!(
                connections = app_state.registry().size(),
                uptime_secs = app_state.uptime().as_secs(),
                "Channel closed"
            );
        }

        *self.state.write().await = ServerState::Stopped;
        self.shutdown.mark_complete();
        info!("Graceful shutdown complete");
    }

    /// Initiates shutdown.
    pub fn shutdown(&self) {
        self.shutdown.initiate_shutdown();
    }

    fn require_app_state(&self) -> Result<&Arc<AppState>, ServerError> {
        self.app_state.as_ref().ok_or_else(|| {
            ServerError::InvalidState("Server must be initialized before running".to_string())
        })
    }
}

/// Server lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A component failed to start.
    #[error("Initialization error: {0}")]
    InitializationError(String),

    /// Lifecycle method called out of order.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Failure while serving.
    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_server_new() {
        let server = PulseServer::new(ServerConfig::default());
        assert_eq!(server.state().await, ServerState::Stopped);
        assert!(server.app_state().is_none());
    }

    #[tokio::test]
    async fn test_run_requires_initialize() {
        let server = PulseServer::new(ServerConfig::default());
        let result = server.run().await;
        assert!(matches!(result, Err(ServerError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_initialize_twice_fails() {
        let mut server = PulseServer::new(ServerConfig::default());
        server.initialize().await.unwrap();
        assert_eq!(server.state().await, ServerState::Starting);
        assert_eq!(server.app_state().unwrap().catalog().len(), 10);

        assert!(matches!(
            server.initialize().await,
            Err(ServerError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_initialize_json_lines_carry_one_level_key() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .with_writer(logs.clone())
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let mut server = PulseServer::new(ServerConfig::default());
        server.initialize().await.unwrap();

        let output = logs.text();
        assert!(output.contains("Initializing Pulse server"));
        for line in output.lines() {
            assert_eq!(line.matches("\"level\":").count(), 1, "{line}");
        }
    }

    #[test]
    fn test_load_config_rejects_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "generator:\n  probability: 2.0").unwrap();

        let err = PulseServer::load_config(file.path()).unwrap_err();
        assert!(matches!(err, ServerError::ConfigError(_)));
        assert!(err.to_string().contains("generator.probability"));
    }

    #[test]
    fn test_server_error_display() {
        let err = ServerError::ConfigError("test error".to_string());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }
}
