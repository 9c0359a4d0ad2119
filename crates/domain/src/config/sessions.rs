use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions & persistence
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Root directory for `sessions/` and `reports/` state.
    #[serde(default = "d_state_path")]
    pub state_path: PathBuf,
    /// Write a JSONL transcript per session id.
    #[serde(default = "d_true")]
    pub transcripts: bool,
    /// Seconds between background flushes of the session store; 0 disables.
    #[serde(default = "d_flush_interval")]
    pub flush_interval_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            state_path: d_state_path(),
            transcripts: true,
            flush_interval_secs: d_flush_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Author recorded on synthesized reports.
    #[serde(default = "d_author")]
    pub default_author: String,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            default_author: d_author(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_state_path() -> PathBuf {
    PathBuf::from("./data")
}
fn d_true() -> bool {
    true
}
fn d_flush_interval() -> u64 {
    30
}
fn d_author() -> String {
    "System".into()
}
