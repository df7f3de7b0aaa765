//! Liveness and status handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Service version
    pub version: &'static str,
}

/// Health check handler.
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Channel status response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Registered listener connections
    pub connections: usize,
    /// Seconds since startup
    pub uptime_secs: u64,
}

/// Channel status handler.
///
/// GET /api/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        connections: state.registry().size(),
        uptime_secs: state.uptime().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use pulse_core::catalog::Catalog;

    #[tokio::test]
    async fn test_health_check() {
        let Json(response) = health_check().await;
        assert_eq!(response.status, "healthy");
        assert!(!response.version.is_empty());
    }

    #[tokio::test]
    async fn test_status_reports_registry_size() {
        let state = Arc::new(AppState::new(ApiConfig::default(), Catalog::default()));
        let Json(response) = status(State(state)).await;
        assert_eq!(response.connections, 0);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("uptimeSecs").is_some());
    }
}
