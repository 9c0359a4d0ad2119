use serde::{Deserialize, Serialize};
use serde_json::Value;

use ca_domain::{FieldMap, Sender};

/// What a backend call is for. Only questions are cacheable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestKind {
    #[default]
    Question,
    Analysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Sender,
    pub content: String,
}

/// JSON body sent to the backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendRequest {
    pub question: String,
    pub agent_type: String,
    pub context: FieldMap,
    #[serde(skip_serializing_if = "FieldMap::is_empty")]
    pub collected_data: FieldMap,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryEntry>,
    #[serde(rename = "session_id", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip)]
    pub kind: RequestKind,
}

impl BackendRequest {
    pub fn question(agent_type: &str, question: &str, context: FieldMap) -> Self {
        Self {
            question: question.to_owned(),
            agent_type: agent_type.to_owned(),
            context,
            collected_data: FieldMap::new(),
            history: Vec::new(),
            session_id: None,
            kind: RequestKind::Question,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    pub text: String,
    /// Backend-side conversation id, when the backend keeps one.
    pub session_id: Option<String>,
}

impl BackendResponse {
    /// Accepts `{response}`, `{data: "..."}` or `{data: {analysis|response}}`,
    /// with an optional `session_id` / `sessionId`.
    pub fn from_body(body: &Value) -> Option<Self> {
        let text = body
            .get("response")
            .and_then(Value::as_str)
            .or_else(|| match body.get("data") {
                Some(Value::String(s)) => Some(s.as_str()),
                Some(Value::Object(o)) => o
                    .get("analysis")
                    .or_else(|| o.get("response"))
                    .and_then(Value::as_str),
                _ => None,
            })?
            .trim();
        if text.is_empty() {
            return None;
        }

        let session_id = body
            .get("session_id")
            .or_else(|| body.get("sessionId"))
            .and_then(Value::as_str)
            .map(str::to_owned);

        Some(Self {
            text: text.to_owned(),
            session_id,
        })
    }
}
