//! The per-conversation record the state machine drives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ca_domain::{ContextSnapshot, FieldMap, Message, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Idle,
    Active,
    Collecting,
    Analyzing,
    Complete,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Active => "ACTIVE",
            Self::Collecting => "COLLECTING",
            Self::Analyzing => "ANALYZING",
            Self::Complete => "COMPLETE",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    pub state: SessionState,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Field of the intake step awaiting an answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    #[serde(default, rename = "collectedData")]
    pub collected: FieldMap,
    #[serde(default)]
    pub context: FieldMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set once the analysis message has been appended.
    #[serde(default)]
    pub terminal: bool,
    /// Conversation id handed back by the backend, echoed on later calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_session_id: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            previous_session_id: None,
            agent_id: None,
            state: SessionState::Idle,
            messages: Vec::new(),
            current_step: None,
            collected: FieldMap::new(),
            context: FieldMap::new(),
            created_at: now,
            updated_at: now,
            terminal: false,
            backend_session_id: None,
        }
    }

    /// Fresh session correlated to `previous`.
    pub fn successor_of(previous: &Session) -> Self {
        Self {
            previous_session_id: Some(previous.id.clone()),
            ..Self::new()
        }
    }

    pub fn case_id(&self) -> Option<String> {
        self.context.get_str("caseId")
    }

    pub fn push(&mut self, message: Message) {
        self.updated_at = message.timestamp;
        self.messages.push(message);
    }

    /// Assistant message stamped with the current agent and case metadata.
    pub fn reply(&self, content: impl Into<String>, live: Option<bool>) -> Message {
        Message::assistant(
            content,
            ContextSnapshot {
                agent_id: self.agent_id.clone().unwrap_or_default(),
                case: self.context.clone(),
                using_live_backend: live,
            },
        )
    }

    /// The analysis message of a complete session.
    pub fn terminal_message(&self) -> Option<&Message> {
        if !self.terminal {
            return None;
        }
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Assistant)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle() {
        let s = Session::new();
        assert_eq!(s.state, SessionState::Idle);
        assert!(s.agent_id.is_none());
        assert!(s.messages.is_empty());
    }

    #[test]
    fn successor_links_back() {
        let a = Session::new();
        let b = Session::successor_of(&a);
        assert_ne!(a.id, b.id);
        assert_eq!(b.previous_session_id.as_deref(), Some(a.id.as_str()));
    }

    #[test]
    fn state_serializes_upper_case() {
        let mut s = Session::new();
        s.state = SessionState::Collecting;
        s.collected.insert("causeOfDeath", "blunt trauma");
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["state"], "COLLECTING");
        assert_eq!(v["collectedData"]["causeOfDeath"], "blunt trauma");
    }

    #[test]
    fn terminal_message_requires_terminal_flag() {
        let mut s = Session::new();
        s.agent_id = Some("murder".into());
        let reply = s.reply("analysis", Some(true));
        s.push(reply);
        assert!(s.terminal_message().is_none());
        s.terminal = true;
        assert_eq!(s.terminal_message().unwrap().content, "analysis");
    }
}
