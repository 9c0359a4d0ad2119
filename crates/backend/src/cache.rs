//! TTL cache for free-form question answers.
//!
//! Keyed on (agent, case id, backend session id, normalized question), so
//! one case never sees another case's answer. Entries are stored without a
//! backend session id. Analyses and failures pass straight through so a
//! recovered backend is used on the next call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::gateway::{BackendGateway, GatewayError};
use crate::types::{BackendRequest, BackendResponse, RequestKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    agent: String,
    case_id: Option<String>,
    backend_session: Option<String>,
    question: String,
}

pub struct CachingGateway {
    inner: Arc<dyn BackendGateway>,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, (Instant, BackendResponse)>>,
}

impl CachingGateway {
    pub fn new(inner: Arc<dyn BackendGateway>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(payload: &BackendRequest) -> CacheKey {
        CacheKey {
            agent: payload.agent_type.clone(),
            case_id: payload.context.get_str("caseId"),
            backend_session: payload.session_id.clone(),
            question: payload.question.trim().to_lowercase(),
        }
    }

    fn lookup(&self, key: &CacheKey) -> Option<BackendResponse> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some((at, resp)) if at.elapsed() < self.ttl => Some(BackendResponse {
                session_id: None,
                ..resp.clone()
            }),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn store(&self, key: CacheKey, resp: &BackendResponse) {
        let mut entries = self.entries.lock();
        let ttl = self.ttl;
        entries.retain(|_, (at, _)| at.elapsed() < ttl);
        let mut cached = resp.clone();
        cached.session_id = None;
        entries.insert(key, (Instant::now(), cached));
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BackendGateway for CachingGateway {
    async fn call(
        &self,
        payload: BackendRequest,
        deadline: Duration,
    ) -> Result<BackendResponse, GatewayError> {
        if payload.kind != RequestKind::Question {
            return self.inner.call(payload, deadline).await;
        }

        let key = Self::key(&payload);
        if let Some(hit) = self.lookup(&key) {
            tracing::debug!(agent = %key.agent, "backend cache hit");
            return Ok(hit);
        }

        let resp = self.inner.call(payload, deadline).await?;
        self.store(key, &resp);
        Ok(resp)
    }

    async fn health(&self, deadline: Duration) -> bool {
        self.inner.health(deadline).await
    }
}
