//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{infrastructure::dto::http::SessionSnapshotDto, ui::state::AppState};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current round, roster and board of the session
pub async fn get_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionSnapshotDto>, StatusCode> {
    match state.session.snapshot().await {
        // Domain Model から DTO への変換
        Ok(snapshot) => Ok(Json(SessionSnapshotDto::from(&snapshot))),
        Err(e) => {
            tracing::error!("Failed to read session snapshot: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
