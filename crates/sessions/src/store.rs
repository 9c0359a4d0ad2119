//! Session store.
//!
//! Holds live sessions in memory and persists them to
//! `sessions/sessions.json` under the configured state path on flush.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use ca_domain::error::{Error, Result};

use crate::session::Session;

pub struct SessionStore {
    sessions_path: PathBuf,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Load or create the store at `state_path/sessions/sessions.json`.
    pub fn new(state_path: &Path) -> Result<Self> {
        let dir = state_path.join("sessions");
        std::fs::create_dir_all(&dir)?;

        let sessions_path = dir.join("sessions.json");
        let sessions: HashMap<String, Session> = if sessions_path.exists() {
            let raw = std::fs::read_to_string(&sessions_path)?;
            serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, path = %sessions_path.display(), "unreadable session file; starting empty");
                HashMap::new()
            })
        } else {
            HashMap::new()
        };

        tracing::info!(
            sessions = sessions.len(),
            path = %sessions_path.display(),
            "session store loaded"
        );

        Ok(Self {
            sessions_path,
            sessions: RwLock::new(sessions),
        })
    }

    pub fn insert(&self, session: Session) {
        self.sessions.write().insert(session.id.clone(), session);
    }

    pub fn get(&self, id: &str) -> Result<Session> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("session {id}")))
    }

    /// Write back a session that was worked on outside the lock. Returns
    /// false, leaving the store untouched, when the id no longer exists.
    pub fn commit(&self, session: Session) -> bool {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(&session.id) {
            Some(slot) => {
                *slot = session;
                true
            }
            None => false,
        }
    }

    /// Swap a session for its reset successor in one step.
    pub fn replace(&self, old_id: &str, successor: Session) -> Result<()> {
        let mut sessions = self.sessions.write();
        if sessions.remove(old_id).is_none() {
            return Err(Error::NotFound(format!("session {old_id}")));
        }
        sessions.insert(successor.id.clone(), successor);
        Ok(())
    }

    /// All sessions, oldest first.
    pub fn list(&self) -> Vec<Session> {
        let mut all: Vec<Session> = self.sessions.read().values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        all
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flush(&self) -> Result<()> {
        let json = {
            let sessions = self.sessions.read();
            serde_json::to_string_pretty(&*sessions)?
        };
        std::fs::write(&self.sessions_path, json)?;
        Ok(())
    }

    /// Directory holding `sessions.json` and the transcripts.
    pub fn dir(&self) -> PathBuf {
        self.sessions_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf()
    }
}
