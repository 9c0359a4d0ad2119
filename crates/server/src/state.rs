use std::sync::Arc;
use std::time::Instant;

use ca_agents::{AgentRegistry, AgentResolver};
use ca_backend::{BackendGateway, FallbackProvider};
use ca_domain::config::Config;
use ca_reports::{ReportStore, ReportSynthesizer};
use ca_sessions::SessionManager;

/// Shared application state passed to all API handlers.
///
/// Fields are grouped by concern:
/// - **Agents**: registry, resolver, offline content
/// - **Conversation**: backend gateway, session manager
/// - **Reports**: synthesizer and store
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    // ── Agents ────────────────────────────────────────────────────────
    pub registry: Arc<AgentRegistry>,
    pub resolver: Arc<AgentResolver>,
    pub fallback: Arc<FallbackProvider>,

    // ── Conversation ──────────────────────────────────────────────────
    pub gateway: Arc<dyn BackendGateway>,
    pub sessions: Arc<SessionManager>,

    // ── Reports ───────────────────────────────────────────────────────
    pub synthesizer: Arc<ReportSynthesizer>,
    pub reports: Arc<ReportStore>,

    // ── Security ──────────────────────────────────────────────────────
    /// SHA-256 of the API token; `None` disables auth (dev mode).
    pub api_token_hash: Option<Vec<u8>>,

    pub started_at: Instant,
}
