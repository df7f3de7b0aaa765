//! API server implementation.

use axum::{Router, extract::Request};
use pulse_core::catalog::Catalog;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::routes::create_router;
use crate::state::AppState;
use pulse_telemetry::spans::request_span;

/// API server.
pub struct ApiServer {
    /// Server configuration
    config: ApiConfig,
    /// Application state
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server.
    #[must_use]
    pub fn new(config: ApiConfig, catalog: Catalog) -> Self {
        let state = Arc::new(AppState::new(config.clone(), catalog));
        Self { config, state }
    }

    /// Creates a new API server with custom state.
    #[must_use]
    pub fn with_state(config: ApiConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Builds the router with tracing middleware.
    #[must_use]
    pub fn router(&self) -> Router {
        create_router(Arc::clone(&self.state)).layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request| request_span(req.method().as_str(), req.uri().path())),
        )
    }

    /// Binds the configured address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or already in use.
    pub async fn bind(&self) -> Result<TcpListener, ApiError> {
        let addr = self.config.bind_address();

        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| ApiError::Internal(format!("Invalid bind address: {e}")))?;

        TcpListener::bind(socket_addr)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to bind to {addr}: {e}")))
    }

    /// Serves on an already bound listener until `shutdown_signal` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails while running.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ApiError> {
        let app = self.router();

        match listener.local_addr() {
            Ok(addr) => info!(%addr, "API server listening"),
            Err(e) => warn!(error = %e, "API server listening on unknown address"),
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ApiError::Internal(format!("Server error: {e}")))?;

        warn!("API server shutting down");

        Ok(())
    }

    /// Binds the configured address and serves with graceful shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or run.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ApiError> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown_signal).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::config::ListenConfig;

    #[test]
    fn test_api_server_with_state() {
        let config = ApiConfig::default();
        let state = Arc::new(AppState::new(config.clone(), Catalog::default()));
        let server = ApiServer::with_state(config, Arc::clone(&state));

        assert!(Arc::ptr_eq(server.state(), &state));
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_address() {
        let config = ApiConfig {
            listen: ListenConfig {
                host: "not an address".to_string(),
                port: 80,
            },
            ..ApiConfig::default()
        };
        let server = ApiServer::new(config, Catalog::default());
        assert!(matches!(server.bind().await, Err(ApiError::Internal(_))));
    }

    #[tokio::test]
    async fn test_run_with_shutdown_ephemeral_port() {
        let config = ApiConfig {
            listen: ListenConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            ..ApiConfig::default()
        };
        let server = ApiServer::new(config, Catalog::default());
        assert!(server.run_with_shutdown(async {}).await.is_ok());
    }
}
