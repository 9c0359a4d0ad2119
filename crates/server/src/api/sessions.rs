//! Session lifecycle endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use ca_domain::{Error, Report};
use ca_sessions::{AssignOutcome, ResetOutcome, Session, TurnOutcome};

use crate::api::error::ApiResult;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request bodies
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionBody {
    #[serde(default)]
    pub agent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
    #[serde(default)]
    pub classification: String,
    #[serde(default)]
    pub case_id: Option<String>,
    /// Reset a non-idle session before assigning.
    #[serde(default)]
    pub reset: bool,
}

#[derive(Debug, Deserialize)]
pub struct TurnBody {
    #[serde(alias = "message")]
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetBody {
    #[serde(default)]
    pub reason: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Handlers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /v1/sessions
pub async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionBody>>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let session = state.sessions.create(body.agent_id.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /v1/sessions
pub async fn list_sessions(State(state): State<AppState>) -> Json<Value> {
    let sessions = state.sessions.list();
    Json(json!({ "count": sessions.len(), "sessions": sessions }))
}

/// GET /v1/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Session>> {
    Ok(Json(state.sessions.get(&id)?))
}

/// POST /v1/sessions/:id/agent
pub async fn assign_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AssignBody>,
) -> ApiResult<Json<AssignOutcome>> {
    let outcome = state
        .sessions
        .assign_agent(&id, &body.classification, body.case_id.as_deref(), body.reset)
        .await?;
    Ok(Json(outcome))
}

/// POST /v1/sessions/:id/turns
pub async fn submit_turn(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TurnBody>,
) -> ApiResult<Json<TurnOutcome>> {
    Ok(Json(state.sessions.submit_turn(&id, &body.text).await?))
}

/// POST /v1/sessions/:id/reset
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<ResetBody>>,
) -> ApiResult<Json<ResetOutcome>> {
    let reason = body
        .and_then(|Json(b)| b.reason)
        .unwrap_or_else(|| "api request".into());
    Ok(Json(state.sessions.reset(&id, &reason).await?))
}

/// POST /v1/sessions/:id/report: synthesize and store a report for a
/// complete session. Repeat calls return the stored report with 200.
pub async fn synthesize_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    let session = state.sessions.get(&id)?;
    if let Some(existing) = state.reports.for_session(&session.id) {
        return Ok((StatusCode::OK, Json(existing)));
    }

    let agent_id = session
        .agent_id
        .clone()
        .ok_or_else(|| Error::IncompleteSession(session.id.clone()))?;
    let agent = state.registry.get_agent(&agent_id)?;

    let report = state.synthesizer.synthesize(&session, &agent)?;
    state.reports.insert(report.clone())?;
    Ok((StatusCode::CREATED, Json(report)))
}
