use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use ca_domain::{Report, ReportStatus};
use ca_reports::AnalysisSubmission;

use crate::api::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportsQuery {
    #[serde(default)]
    pub case_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: ReportStatus,
}

/// POST /v1/reports
pub async fn submit_report(
    State(state): State<AppState>,
    Json(body): Json<AnalysisSubmission>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    let report = state.synthesizer.synthesize_submission(body)?;
    state.reports.insert(report.clone())?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// GET /v1/reports[?case_id=]
pub async fn list_reports(
    State(state): State<AppState>,
    Query(q): Query<ReportsQuery>,
) -> Json<Value> {
    let reports = match q.case_id.as_deref() {
        Some(case_id) => state.reports.by_case(case_id),
        None => state.reports.list(),
    };
    Json(json!({ "count": reports.len(), "reports": reports }))
}

/// GET /v1/reports/:id
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Report>> {
    Ok(Json(state.reports.get(&id)?))
}

/// PUT /v1/reports/:id/status
pub async fn settle_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<Report>> {
    Ok(Json(state.reports.settle(&id, body.status)?))
}
