//! Route definitions.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsConfig;
use crate::handlers::{health, signals};
use crate::state::AppState;
use crate::ws::ws_handler;

/// Creates the router with every route.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(&state.config.cors);

    let api_routes = Router::new()
        .route("/signals", post(signals::create_signal))
        .route("/status", get(health::status));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ws", get(ws_handler))
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

/// Builds the CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    if !config.enabled {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(config.max_age())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use pulse_core::catalog::Catalog;

    #[test]
    fn test_create_router() {
        let state = Arc::new(AppState::new(ApiConfig::default(), Catalog::default()));
        let _router = create_router(state);
    }

    #[test]
    fn test_build_cors_layer_disabled() {
        let config = CorsConfig {
            enabled: false,
            ..CorsConfig::default()
        };
        let _cors = build_cors_layer(&config);
    }
}
