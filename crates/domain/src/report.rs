//! Investigation reports and their panels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Completed,
    Error,
}

impl ReportStatus {
    /// Only `pending` may move, and only to `completed` or `error`.
    pub fn can_settle_to(self, next: ReportStatus) -> bool {
        matches!(
            (self, next),
            (ReportStatus::Pending, ReportStatus::Completed)
                | (ReportStatus::Pending, ReportStatus::Error)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Summary,
    Analysis,
    Evidence,
    Recommendations,
    Timeline,
    Custom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelPriority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PanelKind,
    pub content: String,
    #[serde(default)]
    pub priority: PanelPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub title: String,
    pub case_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub classification: String,
    pub generated_at: DateTime<Utc>,
    pub author: String,
    pub status: ReportStatus,
    #[serde(default)]
    pub panels: Vec<Panel>,
    #[serde(default)]
    pub questions: Vec<QuestionAnswer>,
    #[serde(default)]
    pub analysis: String,
    /// Set when the analysis came from canned fallback content.
    #[serde(default)]
    pub degraded: bool,
}

impl Report {
    /// Apply the single permitted status transition.
    pub fn settle(&mut self, next: ReportStatus) -> Result<()> {
        if !self.status.can_settle_to(next) {
            return Err(Error::InvalidTransition(format!(
                "report {} cannot move from {:?} to {:?}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }
}
