//! Append-only JSONL transcripts, one `<sessionId>.jsonl` per session.
//!
//! A reset session keeps its old file; the successor starts a new one, so
//! the pair is joined only through `previousSessionId`.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ca_domain::error::{Error, Result};
use ca_domain::trace::TraceEvent;
use ca_domain::{Message, Sender};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptLine {
    pub timestamp: DateTime<Utc>,
    pub role: Sender,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using_live_backend: Option<bool>,
}

impl From<&Message> for TranscriptLine {
    fn from(msg: &Message) -> Self {
        Self {
            timestamp: msg.timestamp,
            role: msg.sender,
            content: msg.content.clone(),
            agent_id: msg.context.as_ref().map(|c| c.agent_id.clone()),
            using_live_backend: msg.context.as_ref().and_then(|c| c.using_live_backend),
        }
    }
}

pub struct TranscriptWriter {
    base_dir: PathBuf,
}

impl TranscriptWriter {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
        }
    }

    fn path(&self, session_id: &str) -> PathBuf {
        self.base_dir.join(format!("{session_id}.jsonl"))
    }

    /// Append messages off the runtime threads.
    pub async fn append(&self, session_id: &str, messages: &[Message]) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        for msg in messages {
            buf.push_str(&serde_json::to_string(&TranscriptLine::from(msg))?);
            buf.push('\n');
        }
        let path = self.path(session_id);

        tokio::task::spawn_blocking(move || {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            file.write_all(buf.as_bytes())?;
            Ok::<(), Error>(())
        })
        .await
        .map_err(|e| Error::Other(format!("transcript writer join: {e}")))??;

        TraceEvent::TranscriptAppend {
            session_id: session_id.to_owned(),
            lines: messages.len(),
        }
        .emit();
        Ok(())
    }

    /// Read a transcript back; malformed lines are skipped.
    pub fn read(&self, session_id: &str) -> Result<Vec<TranscriptLine>> {
        let path = self.path(session_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let raw = std::fs::read_to_string(&path)?;
        let mut lines = Vec::new();
        for line in raw.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<TranscriptLine>(line) {
                Ok(tl) => lines.push(tl),
                Err(e) => {
                    tracing::warn!(session_id, error = %e, "skipping malformed transcript line");
                }
            }
        }
        Ok(lines)
    }
}
