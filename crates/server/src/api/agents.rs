//! Agent catalog, hierarchy and enablement endpoints.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use ca_backend::Welcome;
use ca_domain::Agent;

use crate::api::error::ApiResult;
use crate::state::AppState;

/// Agent with its `enabled` flag replaced by the live value.
fn effective(state: &AppState, mut agent: Agent) -> Agent {
    agent.enabled = state.registry.is_enabled(&agent.id);
    agent
}

/// GET /v1/agents
pub async fn list_agents(State(state): State<AppState>) -> Json<Value> {
    let agents: Vec<Agent> = state
        .registry
        .list_agents()
        .into_iter()
        .map(|a| effective(&state, a))
        .collect();
    Json(json!({ "count": agents.len(), "agents": agents }))
}

/// GET /v1/agents/:id
pub async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Agent>> {
    let agent = state.registry.get_agent(&id)?;
    Ok(Json(effective(&state, agent)))
}

/// GET /v1/agents/:id/children
pub async fn list_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let children: Vec<Agent> = state
        .registry
        .children(&id)?
        .into_iter()
        .map(|a| effective(&state, a))
        .collect();
    Ok(Json(json!({ "parent": id, "children": children })))
}

/// GET /v1/agents/:id/welcome. Unknown ids get the general welcome.
pub async fn welcome(State(state): State<AppState>, Path(id): Path<String>) -> Json<Welcome> {
    Json(state.fallback.welcome_for(&id))
}

/// GET /v1/agents/enablement
pub async fn get_enablement(State(state): State<AppState>) -> Json<HashMap<String, bool>> {
    Json(state.registry.enablement())
}

/// PUT /v1/agents/enablement. All ids must exist or nothing changes.
pub async fn put_enablement(
    State(state): State<AppState>,
    Json(flags): Json<HashMap<String, bool>>,
) -> ApiResult<Json<HashMap<String, bool>>> {
    state.registry.set_enabled_many(&flags)?;
    Ok(Json(state.registry.enablement()))
}

#[derive(Debug, Deserialize)]
pub struct EnabledBody {
    pub enabled: bool,
}

/// PUT /v1/agents/:id/enabled
pub async fn set_enabled(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<EnabledBody>,
) -> ApiResult<Json<Value>> {
    state.registry.set_enabled(&id, body.enabled)?;
    Ok(Json(json!({ "id": id, "enabled": body.enabled })))
}
