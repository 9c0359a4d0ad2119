use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::FieldMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    #[default]
    Sent,
    Delivered,
    Read,
}

/// Case metadata captured at the moment a message was appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    pub agent_id: String,
    #[serde(default)]
    pub case: FieldMap,
    /// `Some(false)` marks a degraded reply produced without the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using_live_backend: Option<bool>,
}

/// One conversation entry. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextSnapshot>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::build(Sender::User, content.into(), None)
    }

    pub fn assistant(content: impl Into<String>, context: ContextSnapshot) -> Self {
        let mut msg = Self::build(Sender::Assistant, content.into(), Some(context));
        msg.status = DeliveryStatus::Delivered;
        msg
    }

    fn build(sender: Sender, content: String, context: Option<ContextSnapshot>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            content,
            timestamp: Utc::now(),
            status: DeliveryStatus::Sent,
            context,
        }
    }

    /// True when the reply came from the live backend; false when degraded.
    /// Messages without a marker are prompts, which count as live.
    pub fn is_live(&self) -> bool {
        self.context
            .as_ref()
            .and_then(|c| c.using_live_backend)
            .unwrap_or(true)
    }
}
