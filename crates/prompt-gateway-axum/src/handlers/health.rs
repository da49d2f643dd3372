//! Liveness and backend health probes.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::BackendHealthResponse;
use crate::state::AppState;

pub async fn up() -> Json<&'static str> {
    Json(":)")
}

pub async fn echo() -> Json<&'static str> {
    Json("Server active!")
}

/// Single probe of the backend; 503 when it is not reachable.
pub async fn ollama(State(state): State<AppState>) -> (StatusCode, Json<BackendHealthResponse>) {
    let report = state.prober.probe().await;
    let status = if report.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report.into()))
}
