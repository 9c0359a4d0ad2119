use std::sync::Arc;

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use ca_domain::config::Config;
use ca_server::api;
use ca_server::bootstrap::build_app_state;
use ca_server::state::AppState;

struct TestServer {
    base: String,
    client: reqwest::Client,
    _tmp: tempfile::TempDir,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn put(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self.client.put(self.url(path)).json(&body).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }
}

async fn start(token: Option<&str>) -> TestServer {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.backend.enabled = false;
    config.sessions.state_path = tmp.path().to_path_buf();
    config.server.api_token_env = "CA_API_TEST_TOKEN_NEVER_SET".into();

    let mut state: AppState = build_app_state(Arc::new(config)).await.unwrap();
    state.api_token_hash = token.map(|t| Sha256::digest(t.as_bytes()).to_vec());

    let app = api::router(state.clone()).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base: format!("http://{addr}"),
        client: reqwest::Client::new(),
        _tmp: tmp,
    }
}

async fn new_session(server: &TestServer) -> String {
    let (status, body) = server.post("/v1/sessions", json!({})).await;
    assert_eq!(status, 201);
    assert_eq!(body["state"], "IDLE");
    body["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn health_reports_agents_and_backend_mode() {
    let server = start(None).await;

    let (status, body) = server.get("/v1/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["agents"], 12);

    let (status, body) = server.get("/v1/health/backend").await;
    assert_eq!(status, 503);
    assert_eq!(body["enabled"], false);
    assert_eq!(body["mode"], "fallback");
}

#[tokio::test]
async fn agent_tree_and_welcome() {
    let server = start(None).await;

    let (status, body) = server.get("/v1/agents").await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 12);

    let (status, body) = server.get("/v1/agents/murder/children").await;
    assert_eq!(status, 200);
    let children: Vec<&str> = body["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(children, vec!["murder-chief", "murder-cop-2", "murder-case-3"]);

    let (status, _) = server.get("/v1/agents/arson").await;
    assert_eq!(status, 404);

    let (status, body) = server.get("/v1/agents/theft/welcome").await;
    assert_eq!(status, 200);
    assert!(body["suggestedQuestions"].as_array().is_some_and(|q| !q.is_empty()));
}

#[tokio::test]
async fn resolve_records_case_assignment() {
    let server = start(None).await;

    let (status, body) = server
        .post("/v1/resolve", json!({ "classification": "Homicide", "caseId": "C-77" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["agentId"], "murder");
    assert_eq!(body["seedContext"]["caseId"], "C-77");

    let (_, body) = server.get("/v1/cases/C-77/agent").await;
    assert_eq!(body["agentId"], "murder");

    let (_, body) = server.get("/v1/cases/unknown/agent").await;
    assert_eq!(body["agentId"], "general");

    let (status, body) = server.post("/v1/resolve", json!({ "classification": "  " })).await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn disabled_agent_falls_back_to_parent() {
    let server = start(None).await;

    let (status, _) = server
        .put("/v1/agents/theft-chain-snatching/enabled", json!({ "enabled": false }))
        .await;
    assert_eq!(status, 200);

    let (_, body) = server
        .post("/v1/resolve", json!({ "classification": "chain-snatching" }))
        .await;
    assert_eq!(body["agentId"], "theft");
}

#[tokio::test]
async fn murder_intake_to_pending_report() {
    let server = start(None).await;
    let id = new_session(&server).await;

    let (status, body) = server
        .post(
            &format!("/v1/sessions/{id}/agent"),
            json!({ "classification": "murder", "caseId": "C-1" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["session"]["state"], "ACTIVE");
    assert_eq!(body["resolution"]["agentId"], "murder");

    // Report before completion is a conflict.
    let (status, _) = server.post(&format!("/v1/sessions/{id}/report"), json!({})).await;
    assert_eq!(status, 409);

    for answer in ["blunt trauma", "last night around 11pm", "a knife"] {
        let (status, _) = server
            .post(&format!("/v1/sessions/{id}/turns"), json!({ "text": answer }))
            .await;
        assert_eq!(status, 200);
    }

    let (_, session) = server.get(&format!("/v1/sessions/{id}")).await;
    assert_eq!(session["state"], "COMPLETE");
    assert_eq!(session["collectedData"]["weaponUsed"], "a knife");

    // Further turns are rejected once complete.
    let (status, _) = server
        .post(&format!("/v1/sessions/{id}/turns"), json!({ "message": "one more" }))
        .await;
    assert_eq!(status, 409);

    let (status, report) = server.post(&format!("/v1/sessions/{id}/report"), json!({})).await;
    assert_eq!(status, 201);
    assert_eq!(report["status"], "pending");
    assert_eq!(report["degraded"], true);
    assert_eq!(report["caseId"], "C-1");
    let report_id = report["id"].as_str().unwrap().to_owned();

    // A second request returns the same report instead of minting another.
    let (status, again) = server.post(&format!("/v1/sessions/{id}/report"), json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(again["id"], report_id.as_str());

    let (_, listed) = server.get("/v1/reports?case_id=C-1").await;
    assert_eq!(listed["count"], 1);

    let (status, settled) = server
        .put(&format!("/v1/reports/{report_id}/status"), json!({ "status": "completed" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(settled["status"], "completed");

    let (status, _) = server
        .put(&format!("/v1/reports/{report_id}/status"), json!({ "status": "error" }))
        .await;
    assert_eq!(status, 409);
}

#[tokio::test]
async fn reset_replaces_session() {
    let server = start(None).await;
    let id = new_session(&server).await;
    server
        .post(&format!("/v1/sessions/{id}/agent"), json!({ "classification": "theft" }))
        .await;

    let (status, body) = server
        .post(&format!("/v1/sessions/{id}/turns"), json!({ "text": "start over" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["reset"], true);
    let new_id = body["session"]["id"].as_str().unwrap().to_owned();
    assert_ne!(new_id, id);
    assert_eq!(body["session"]["previousSessionId"], id.as_str());

    let (status, _) = server.get(&format!("/v1/sessions/{id}")).await;
    assert_eq!(status, 404);

    let (status, body) = server.post(&format!("/v1/sessions/{new_id}/reset"), json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["session"]["state"], "ACTIVE");
}

#[tokio::test]
async fn error_mapping() {
    let server = start(None).await;

    let (status, body) = server.get("/v1/sessions/nope").await;
    assert_eq!(status, 404);
    assert!(body["error"].as_str().is_some());

    let id = new_session(&server).await;
    let (status, _) = server
        .post(&format!("/v1/sessions/{id}/turns"), json!({ "text": "hello" }))
        .await;
    assert_eq!(status, 409);

    server
        .post(&format!("/v1/sessions/{id}/agent"), json!({ "classification": "accident" }))
        .await;
    let (status, _) = server
        .post(&format!("/v1/sessions/{id}/turns"), json!({ "text": "   " }))
        .await;
    assert_eq!(status, 400);

    let (status, body) = server
        .post("/v1/reports", json!({ "title": "Only a title" }))
        .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("missing required fields"));
}

#[tokio::test]
async fn submitted_analysis_is_stored() {
    let server = start(None).await;
    let (status, report) = server
        .post(
            "/v1/reports",
            json!({
                "title": "Warehouse fraud",
                "caseId": "F-9",
                "classification": "Finance",
                "analysis": "Invoices were duplicated across two vendors.",
            }),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(report["status"], "completed");
    assert_eq!(report["classification"], "finance");

    let id = report["id"].as_str().unwrap();
    let (status, fetched) = server.get(&format!("/v1/reports/{id}")).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["caseId"], "F-9");
}

#[tokio::test]
async fn protected_routes_need_token() {
    let server = start(Some("s3cret")).await;

    let (status, _) = server.get("/v1/health").await;
    assert_eq!(status, 200);

    let (status, body) = server.get("/v1/agents").await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "invalid or missing API token");

    let resp = server
        .client
        .get(server.url("/v1/agents"))
        .bearer_auth("s3cret")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}
