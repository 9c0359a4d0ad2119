pub mod agents;
pub mod auth;
pub mod error;
pub mod health;
pub mod reports;
pub mod resolve;
pub mod sessions;

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
///
/// Health routes are public; everything else sits behind the
/// `CA_API_TOKEN` bearer-token middleware.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/v1/health", get(health::health))
        .route("/v1/health/backend", get(health::backend_readiness));

    let protected = Router::new()
        // Agents
        .route("/v1/agents", get(agents::list_agents))
        .route(
            "/v1/agents/enablement",
            get(agents::get_enablement).put(agents::put_enablement),
        )
        .route("/v1/agents/:id", get(agents::get_agent))
        .route("/v1/agents/:id/children", get(agents::list_children))
        .route("/v1/agents/:id/welcome", get(agents::welcome))
        .route("/v1/agents/:id/enabled", put(agents::set_enabled))
        // Classification
        .route("/v1/resolve", post(resolve::resolve))
        .route("/v1/cases/:case_id/agent", get(resolve::agent_for_case))
        // Sessions
        .route(
            "/v1/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route("/v1/sessions/:id", get(sessions::get_session))
        .route("/v1/sessions/:id/agent", post(sessions::assign_agent))
        .route("/v1/sessions/:id/turns", post(sessions::submit_turn))
        .route("/v1/sessions/:id/reset", post(sessions::reset_session))
        .route("/v1/sessions/:id/report", post(sessions::synthesize_report))
        // Reports
        .route(
            "/v1/reports",
            get(reports::list_reports).post(reports::submit_report),
        )
        .route("/v1/reports/:id", get(reports::get_report))
        .route("/v1/reports/:id/status", put(reports::settle_report))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_api_token,
        ));

    public.merge(protected)
}
