use axum::extract::State;
use axum::Json;

use super::AppState;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready while the registry still has room for new sessions.
pub async fn ready(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.registry.len().await;
    let capacity = state.config.max_sessions;
    let status = if sessions < capacity { "ready" } else { "full" };
    Json(serde_json::json!({
        "status": status,
        "sessions": sessions,
        "capacity": capacity,
    }))
}
