use crate::services::ModelState;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub const HEALTH_MESSAGE: &str = "✅ Gemini server running!";

/// Liveness: answers as long as the process serves HTTP, whatever the model
/// state.
pub async fn health_check() -> &'static str {
    HEALTH_MESSAGE
}

/// Readiness probe for orchestrators. 503 until the model handle is ready.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.model.state() {
        ModelState::Ready(provider) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "model": provider.model(),
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        other => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": other.label()
            })),
        ),
    }
}
