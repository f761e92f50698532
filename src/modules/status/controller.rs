use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::services::metrics::MetricsRegistry;
use crate::services::monitor::{MonitorPhase, StatusBoard};

pub struct StatusState {
    pub status: StatusBoard,
    pub metrics: Arc<MetricsRegistry>,
}

/// Handler for GET /metrics endpoint
/// Returns Prometheus metrics in text format
pub async fn get_metrics(
    State(state): State<Arc<StatusState>>,
) -> Response {
    match state.metrics.export() {
        Ok(output) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            output,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to export metrics: {}", e),
        )
            .into_response(),
    }
}

/// Handler for GET /health endpoint
/// Healthy only while the monitor is polling
pub async fn health_check(
    State(state): State<Arc<StatusState>>,
) -> Response {
    let phase = state.status.phase().await;

    if phase == MonitorPhase::Running {
        (StatusCode::OK, Json(json!({ "status": "healthy", "phase": phase }))).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unhealthy", "phase": phase })),
        )
            .into_response()
    }
}

/// Handler for GET /status endpoint
pub async fn get_status(
    State(state): State<Arc<StatusState>>,
) -> Response {
    Json(state.status.snapshot().await).into_response()
}
