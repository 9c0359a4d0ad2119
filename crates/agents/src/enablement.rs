//! Agent enablement flags (`{agentId: bool}`).
//!
//! The only state shared across sessions. Each update touches one key
//! under a write lock; concurrent toggles of the same id are last-write-wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use ca_domain::error::{Error, Result};

pub trait EnablementStore: Send + Sync {
    /// Explicit flag for `agent_id`, or `None` when never set.
    fn get(&self, agent_id: &str) -> Option<bool>;

    fn set(&self, agent_id: &str, enabled: bool) -> Result<()>;

    /// Apply several flags; each key is updated independently.
    fn set_many(&self, flags: &HashMap<String, bool>) -> Result<()>;

    fn snapshot(&self) -> HashMap<String, bool>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Default)]
pub struct MemoryEnablementStore {
    flags: RwLock<HashMap<String, bool>>,
}

impl MemoryEnablementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(flags: HashMap<String, bool>) -> Self {
        Self {
            flags: RwLock::new(flags),
        }
    }
}

impl EnablementStore for MemoryEnablementStore {
    fn get(&self, agent_id: &str) -> Option<bool> {
        self.flags.read().get(agent_id).copied()
    }

    fn set(&self, agent_id: &str, enabled: bool) -> Result<()> {
        self.flags.write().insert(agent_id.to_owned(), enabled);
        Ok(())
    }

    fn set_many(&self, flags: &HashMap<String, bool>) -> Result<()> {
        for (id, enabled) in flags {
            self.flags.write().insert(id.clone(), *enabled);
        }
        Ok(())
    }

    fn snapshot(&self) -> HashMap<String, bool> {
        self.flags.read().clone()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JSON file
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Write-through store persisted as a flat JSON object.
///
/// `write` is held across the in-memory update and the file write, so the
/// file always reflects the latest toggle.
pub struct FileEnablementStore {
    path: PathBuf,
    inner: MemoryEnablementStore,
    write: Mutex<()>,
}

impl FileEnablementStore {
    /// Load from `path` if it exists; `defaults` fill keys the file lacks.
    pub fn open(path: &Path, defaults: HashMap<String, bool>) -> Result<Self> {
        let mut flags = defaults;
        if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            let stored: HashMap<String, bool> = serde_json::from_str(&raw)?;
            flags.extend(stored);
        } else if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        tracing::info!(
            agents = flags.len(),
            path = %path.display(),
            "agent enablement loaded"
        );

        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryEnablementStore::with_flags(flags),
            write: Mutex::new(()),
        })
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.inner.snapshot())
            .map_err(|e| Error::Other(format!("serializing enablement: {e}")))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl EnablementStore for FileEnablementStore {
    fn get(&self, agent_id: &str) -> Option<bool> {
        self.inner.get(agent_id)
    }

    fn set(&self, agent_id: &str, enabled: bool) -> Result<()> {
        let _guard = self.write.lock();
        self.inner.set(agent_id, enabled)?;
        self.persist()
    }

    fn set_many(&self, flags: &HashMap<String, bool>) -> Result<()> {
        let _guard = self.write.lock();
        self.inner.set_many(flags)?;
        self.persist()
    }

    fn snapshot(&self) -> HashMap<String, bool> {
        self.inner.snapshot()
    }
}
