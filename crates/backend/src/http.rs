//! reqwest implementation of [`BackendGateway`].
//!
//! The deadline wraps the whole exchange (connect, send, body read) in
//! `tokio::time::timeout`; when it fires the request future is dropped,
//! which aborts the in-flight HTTP call.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use ca_domain::config::BackendConfig;
use ca_domain::error::Error;
use ca_domain::trace::TraceEvent;

use crate::gateway::{BackendGateway, GatewayError};
use crate::types::{BackendRequest, BackendResponse};

#[derive(Debug, Clone)]
pub struct HttpBackendGateway {
    http: Client,
    base_url: String,
    default_path: String,
    agent_paths: HashMap<String, String>,
    health_path: String,
    api_key: Option<String>,
}

impl HttpBackendGateway {
    /// Build from config. The bearer key is read from `api_key_env` once.
    pub fn new(cfg: &BackendConfig) -> ca_domain::Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("building backend HTTP client: {e}")))?;

        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::debug!(env = %cfg.api_key_env, "no backend API key set; calling without auth");
        }

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            default_path: cfg.default_path.clone(),
            agent_paths: cfg.agent_paths.clone(),
            health_path: cfg.health_path.clone(),
            api_key,
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn url_for(&self, agent_id: &str) -> String {
        let path = self
            .agent_paths
            .get(agent_id)
            .unwrap_or(&self.default_path);
        format!("{}{}", self.base_url, path)
    }

    async fn exchange(&self, url: &str, payload: &BackendRequest) -> Result<BackendResponse, GatewayError> {
        let start = Instant::now();

        let mut rb = self.http.post(url).json(payload);
        if let Some(key) = &self.api_key {
            rb = rb.bearer_auth(key);
        }
        let resp = rb.send().await.map_err(classify)?;
        let status = resp.status();

        TraceEvent::BackendCall {
            endpoint: url.to_owned(),
            agent_id: payload.agent_type.clone(),
            status: status.as_u16(),
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::BadResponse(format!(
                "{status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| GatewayError::BadResponse(format!("invalid JSON: {e}")))?;

        BackendResponse::from_body(&body)
            .ok_or_else(|| GatewayError::BadResponse("no response text in body".into()))
    }
}

/// Map a reqwest failure onto the gateway taxonomy.
fn classify(e: reqwest::Error) -> GatewayError {
    if e.is_decode() || e.is_body() {
        GatewayError::BadResponse(e.to_string())
    } else {
        GatewayError::Unreachable(e.to_string())
    }
}

#[async_trait]
impl BackendGateway for HttpBackendGateway {
    async fn call(
        &self,
        payload: BackendRequest,
        deadline: Duration,
    ) -> Result<BackendResponse, GatewayError> {
        let url = self.url_for(&payload.agent_type);
        let deadline_ms = deadline.as_millis() as u64;

        match tokio::time::timeout(deadline, self.exchange(&url, &payload)).await {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::warn!(url = %url, error = %e, "backend call failed");
                }
                result
            }
            Err(_) => {
                tracing::warn!(url = %url, deadline_ms, "backend call cancelled at deadline");
                Err(GatewayError::Timeout { deadline_ms })
            }
        }
    }

    async fn health(&self, deadline: Duration) -> bool {
        let url = format!("{}{}", self.base_url, self.health_path);
        let mut rb = self.http.get(&url);
        if let Some(key) = &self.api_key {
            rb = rb.bearer_auth(key);
        }
        match tokio::time::timeout(deadline, rb.send()).await {
            Ok(Ok(resp)) => resp.status().is_success(),
            Ok(Err(e)) => {
                tracing::debug!(url = %url, error = %e, "backend health probe failed");
                false
            }
            Err(_) => false,
        }
    }
}
