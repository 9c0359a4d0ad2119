use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use ca_agents::Resolution;

use crate::api::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveBody {
    #[serde(default)]
    pub classification: String,
    #[serde(default)]
    pub case_id: Option<String>,
}

/// POST /v1/resolve
pub async fn resolve(
    State(state): State<AppState>,
    Json(body): Json<ResolveBody>,
) -> ApiResult<Json<Resolution>> {
    let resolution = state
        .resolver
        .resolve(&body.classification, body.case_id.as_deref())?;
    Ok(Json(resolution))
}

/// GET /v1/cases/:case_id/agent
pub async fn agent_for_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Json<Value> {
    let agent_id = state.resolver.agent_for_case(&case_id);
    Json(json!({ "caseId": case_id, "agentId": agent_id }))
}
