//! Sync API handlers.

use axum::{extract::State, http::StatusCode, Json};
use reelsync_core::{RunnerError, RunnerStatus};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Simple message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/sync/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<RunnerStatus> {
    Json(state.runner().status().await)
}

/// POST /api/v1/sync
///
/// Starts a run in the background. 409 while another run is in progress.
pub async fn trigger(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, Json<ErrorResponse>)> {
    match state.runner().trigger() {
        Ok(()) => {
            info!("Sync run triggered via API");
            Ok((
                StatusCode::ACCEPTED,
                Json(MessageResponse {
                    message: "Sync started".to_string(),
                }),
            ))
        }
        Err(e @ RunnerError::AlreadyRunning) => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
