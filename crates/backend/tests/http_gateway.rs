use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use ca_backend::{BackendGateway, BackendRequest, GatewayError, HttpBackendGateway};
use ca_domain::config::BackendConfig;
use ca_domain::FieldMap;

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "response": format!(
            "{} via {}",
            body["question"].as_str().unwrap_or(""),
            body["agentType"].as_str().unwrap_or("")
        ),
        "session_id": "backend-1",
    }))
}

async fn whoami(headers: HeaderMap) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none")
        .to_owned();
    Json(json!({ "response": auth }))
}

async fn secure_health(headers: HeaderMap) -> StatusCode {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer s3cret") => StatusCode::OK,
        _ => StatusCode::UNAUTHORIZED,
    }
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/augment", post(echo))
        .route(
            "/api/murder",
            post(|| async { Json(json!({"data": {"analysis": "murder analysis"}})) }),
        )
        .route(
            "/api/slow",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({"response": "too late"}))
            }),
        )
        .route(
            "/api/broken",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/api/whoami", post(whoami))
        .route("/api/garbage", post(|| async { "not json at all" }))
        .route("/health", get(|| async { "ok" }))
        .route("/secure-health", get(secure_health));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(base_url: &str) -> BackendConfig {
    let mut agent_paths = HashMap::new();
    agent_paths.insert("murder".to_owned(), "/api/murder".to_owned());
    agent_paths.insert("slow".to_owned(), "/api/slow".to_owned());
    agent_paths.insert("broken".to_owned(), "/api/broken".to_owned());
    agent_paths.insert("garbage".to_owned(), "/api/garbage".to_owned());
    BackendConfig {
        base_url: base_url.to_owned(),
        agent_paths,
        api_key_env: "CA_TEST_BACKEND_KEY_UNSET".into(),
        ..BackendConfig::default()
    }
}

fn ask(agent: &str, question: &str) -> BackendRequest {
    BackendRequest::question(agent, question, FieldMap::new())
}

const DEADLINE: Duration = Duration::from_secs(5);

#[tokio::test]
async fn default_path_round_trip() {
    let base = spawn_backend().await;
    let gw = HttpBackendGateway::new(&config(&base)).unwrap();

    let resp = gw.call(ask("theft", "where is my bike"), DEADLINE).await.unwrap();
    assert_eq!(resp.text, "where is my bike via theft");
    assert_eq!(resp.session_id.as_deref(), Some("backend-1"));
}

#[tokio::test]
async fn agent_specific_path_is_used() {
    let base = spawn_backend().await;
    let gw = HttpBackendGateway::new(&config(&base)).unwrap();

    let resp = gw.call(ask("murder", "analyze"), DEADLINE).await.unwrap();
    assert_eq!(resp.text, "murder analysis");
}

#[tokio::test]
async fn deadline_cancels_slow_backend() {
    let base = spawn_backend().await;
    let gw = HttpBackendGateway::new(&config(&base)).unwrap();

    let start = Instant::now();
    let err = gw
        .call(ask("slow", "hello"), Duration::from_millis(100))
        .await
        .unwrap_err();
    assert_eq!(err, GatewayError::Timeout { deadline_ms: 100 });
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn server_error_is_bad_response() {
    let base = spawn_backend().await;
    let gw = HttpBackendGateway::new(&config(&base)).unwrap();

    let err = gw.call(ask("broken", "hello"), DEADLINE).await.unwrap_err();
    assert_eq!(err.kind(), "bad_response");
}

#[tokio::test]
async fn non_json_body_is_bad_response() {
    let base = spawn_backend().await;
    let gw = HttpBackendGateway::new(&config(&base)).unwrap();

    let err = gw.call(ask("garbage", "hello"), DEADLINE).await.unwrap_err();
    assert!(matches!(err, GatewayError::BadResponse(_)));
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gw = HttpBackendGateway::new(&config(&format!("http://{addr}"))).unwrap();
    let err = gw.call(ask("theft", "hello"), DEADLINE).await.unwrap_err();
    assert_eq!(err.kind(), "unreachable");
    assert!(!gw.health(Duration::from_millis(500)).await);
}

#[tokio::test]
async fn health_probe_succeeds() {
    let base = spawn_backend().await;
    let gw = HttpBackendGateway::new(&config(&base)).unwrap();
    assert!(gw.health(Duration::from_secs(1)).await);
}

#[tokio::test]
async fn bearer_key_is_forwarded() {
    let base = spawn_backend().await;
    let mut cfg = config(&base);
    cfg.agent_paths.insert("whoami".into(), "/api/whoami".into());
    let gw = HttpBackendGateway::new(&cfg).unwrap().with_api_key("s3cret");

    let resp = gw.call(ask("whoami", "q"), DEADLINE).await.unwrap();
    assert_eq!(resp.text, "Bearer s3cret");
}

#[tokio::test]
async fn health_probe_sends_bearer_key() {
    let base = spawn_backend().await;
    let mut cfg = config(&base);
    cfg.health_path = "/secure-health".into();

    let anonymous = HttpBackendGateway::new(&cfg).unwrap();
    assert!(!anonymous.health(Duration::from_secs(1)).await);

    let keyed = HttpBackendGateway::new(&cfg).unwrap().with_api_key("s3cret");
    assert!(keyed.health(Duration::from_secs(1)).await);
}
