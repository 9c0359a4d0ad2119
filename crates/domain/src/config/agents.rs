use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::agent::Agent;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Agent catalog & resolution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Extra classification aliases (e.g. `homicide = "murder"`), layered
    /// over the built-in table.
    #[serde(default)]
    pub classifications: HashMap<String, String>,
    /// Additional agents, or replacements for built-ins with the same id.
    #[serde(default)]
    pub definitions: Vec<Agent>,
    /// Initial enablement overrides (`agent_id = false`).
    #[serde(default)]
    pub enabled: HashMap<String, bool>,
    /// JSON file persisting runtime enablement toggles. In-memory when unset.
    #[serde(default)]
    pub enablement_path: Option<PathBuf>,
}
