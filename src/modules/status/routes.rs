use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;

use super::controller::{get_metrics, get_status, health_check, StatusState};

pub fn status_routes(state: Arc<StatusState>) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .route("/health", get(health_check))
        .route("/status", get(get_status))
        .with_state(state)
}
