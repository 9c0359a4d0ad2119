//! The transport seam between sessions and the reasoning backend.

use std::time::Duration;

use async_trait::async_trait;

use crate::types::{BackendRequest, BackendResponse};

/// Transport failures. Callers convert these into degraded replies; they
/// never reach end users as errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("backend did not answer within {deadline_ms} ms")]
    Timeout { deadline_ms: u64 },

    #[error("bad backend response: {0}")]
    BadResponse(String),
}

impl GatewayError {
    /// Short label for logs and trace events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "unreachable",
            Self::Timeout { .. } => "timeout",
            Self::BadResponse(_) => "bad_response",
        }
    }
}

/// One bounded request/response exchange with the backend.
///
/// Implementations must return no later than `deadline` and must not
/// retry; retry policy belongs to the caller.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn call(
        &self,
        payload: BackendRequest,
        deadline: Duration,
    ) -> Result<BackendResponse, GatewayError>;

    /// Liveness probe bounded by `deadline`.
    async fn health(&self, deadline: Duration) -> bool;
}

/// Gateway used when the backend is switched off in configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGateway;

#[async_trait]
impl BackendGateway for OfflineGateway {
    async fn call(
        &self,
        _payload: BackendRequest,
        _deadline: Duration,
    ) -> Result<BackendResponse, GatewayError> {
        Err(GatewayError::Unreachable("backend disabled in configuration".into()))
    }

    async fn health(&self, _deadline: Duration) -> bool {
        false
    }
}
