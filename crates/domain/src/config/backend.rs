use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Remote reasoning backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// When false every call fails fast and sessions run on fallback content.
    #[serde(default = "d_true")]
    pub enabled: bool,
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Path used for agents without an entry in `agent_paths`.
    #[serde(default = "d_default_path")]
    pub default_path: String,
    /// Agent id → path override (e.g. `murder = "/api/murder-agent"`).
    #[serde(default)]
    pub agent_paths: HashMap<String, String>,
    #[serde(default = "d_health_path")]
    pub health_path: String,
    /// Environment variable holding the backend bearer key.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// Hard deadline for one backend call.
    #[serde(default = "d_deadline_ms")]
    pub deadline_ms: u64,
    #[serde(default = "d_health_deadline_ms")]
    pub health_deadline_ms: u64,
    /// TTL for cached free-form answers; `0` disables caching.
    #[serde(default = "d_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: d_base_url(),
            default_path: d_default_path(),
            agent_paths: HashMap::new(),
            health_path: d_health_path(),
            api_key_env: d_api_key_env(),
            deadline_ms: d_deadline_ms(),
            health_deadline_ms: d_health_deadline_ms(),
            cache_ttl_secs: d_cache_ttl_secs(),
        }
    }
}

impl BackendConfig {
    /// Path to call for a given agent.
    pub fn path_for(&self, agent_id: &str) -> &str {
        self.agent_paths
            .get(agent_id)
            .map(String::as_str)
            .unwrap_or(&self.default_path)
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_true() -> bool {
    true
}
fn d_base_url() -> String {
    "http://localhost:5000".into()
}
fn d_default_path() -> String {
    "/api/augment".into()
}
fn d_health_path() -> String {
    "/health".into()
}
fn d_api_key_env() -> String {
    "CA_BACKEND_API_KEY".into()
}
fn d_deadline_ms() -> u64 {
    15_000
}
fn d_health_deadline_ms() -> u64 {
    3_000
}
fn d_cache_ttl_secs() -> u64 {
    300
}
