//! On-demand signal trigger.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use pulse_core::types::Signal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::generator::SignalRequest;
use crate::state::AppState;

/// Response for a broadcast signal.
#[derive(Debug, Serialize)]
pub struct CreateSignalResponse {
    /// Always true
    pub success: bool,
    /// The signal as broadcast
    pub signal: Signal,
    /// Connections the signal was written to
    pub delivered: usize,
}

/// Builds a signal from the request body and broadcasts it.
///
/// POST /api/signals
pub async fn create_signal(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SignalRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateSignalResponse>)> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let (signal, delivered) = state.trigger(&request).inspect_err(|e| {
        warn!(error = %e, "Signal request rejected");
    })?;

    info!(
        signal_id = %signal.id(),
        symbol = %signal.symbol(),
        side = %signal.side(),
        delivered,
        "Signal broadcast on demand"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateSignalResponse {
            success: true,
            signal,
            delivered,
        }),
    ))
}
