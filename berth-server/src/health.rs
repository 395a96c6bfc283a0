use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use berth_control::RunningStatus;
use serde_json::json;
use tokio::sync::watch;

/// Shared state for the built-in endpoints.
#[derive(Clone)]
pub struct AppState {
    /// Live view of the instance's running status
    pub status: watch::Receiver<RunningStatus>,
}

/// GET /health - version plus the externally observable running status
pub async fn health(State(state): State<AppState>) -> Response {
    let status = *state.status.borrow();

    let health = json!({
        "status": status.to_string(),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(health)).into_response()
}

/// GET /live - liveness probe (is the process alive?)
pub async fn liveness() -> Response {
    // Simple check: if we can respond, we're alive
    (StatusCode::OK, "OK").into_response()
}

/// GET /ready - readiness probe (ready to accept traffic?)
pub async fn readiness(State(state): State<AppState>) -> Response {
    // RESTRICTED means a drain is in progress; stop advertising readiness
    // so a fronting balancer moves traffic away before the forced cutoff.
    if *state.status.borrow() == RunningStatus::Enabled {
        (StatusCode::OK, "Ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not ready").into_response()
    }
}
