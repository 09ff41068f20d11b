use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Health check endpoint for container liveness probes.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.analyzer.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "report-relay",
                "provider": state.analyzer.name(),
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": "report-relay",
                "error": e.to_string()
            })),
        ),
    }
}
