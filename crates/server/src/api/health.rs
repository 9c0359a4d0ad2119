use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

/// GET /v1/health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "agents": state.registry.list_agents().len(),
        "sessions": state.sessions.list().len(),
    }))
}

/// GET /v1/health/backend: 503 while the backend is unreachable; the
/// service keeps answering from fallback content either way.
pub async fn backend_readiness(State(state): State<AppState>) -> impl IntoResponse {
    let cfg = &state.config.backend;
    let reachable = cfg.enabled
        && state
            .gateway
            .health(Duration::from_millis(cfg.health_deadline_ms))
            .await;

    let status = if reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "enabled": cfg.enabled,
            "reachable": reachable,
            "base_url": cfg.base_url,
            "mode": if reachable { "live" } else { "fallback" },
        })),
    )
}
