//! Agent definitions: identity, hierarchy and intake protocol.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::fields::FieldMap;

/// Capability tag marking agents that run a guided intake.
pub const INTERACTIVE: &str = "interactive";

/// Id of the catch-all agent every resolution can fall back to.
pub const GENERAL_AGENT: &str = "general";

/// A named conversational specialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default = "d_true")]
    pub enabled: bool,
    #[serde(default)]
    pub priority: CasePriority,
    /// Ordered intake steps; only meaningful for interactive agents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intake: Vec<IntakeStep>,
    /// Static placeholders merged into the seed context.
    #[serde(default, skip_serializing_if = "FieldMap::is_empty")]
    pub seed: FieldMap,
}

impl Agent {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            capabilities: BTreeSet::new(),
            parent_id: None,
            enabled: true,
            priority: CasePriority::Medium,
            intake: Vec::new(),
            seed: FieldMap::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn child_of(mut self, parent: impl Into<String>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_capabilities<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_priority(mut self, priority: CasePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Attach an intake protocol and tag the agent interactive.
    pub fn with_intake(mut self, steps: Vec<IntakeStep>) -> Self {
        self.intake = steps;
        self.capabilities.insert(INTERACTIVE.to_owned());
        self
    }

    pub fn with_seed(mut self, seed: FieldMap) -> Self {
        self.seed = seed;
        self
    }

    pub fn is_interactive(&self) -> bool {
        self.capabilities.contains(INTERACTIVE) && !self.intake.is_empty()
    }

    pub fn step(&self, field: &str) -> Option<&IntakeStep> {
        self.intake.iter().find(|s| s.field == field)
    }

    /// First intake step whose field is not yet answered.
    pub fn next_unanswered(&self, answered: &FieldMap) -> Option<&IntakeStep> {
        self.intake.iter().find(|s| !answered.contains_key(&s.field))
    }
}

/// One question of a guided intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeStep {
    pub field: String,
    pub prompt: String,
    #[serde(default)]
    pub format: AnswerFormat,
}

impl IntakeStep {
    pub fn text(field: &str, prompt: &str) -> Self {
        Self::with_format(field, prompt, AnswerFormat::Text)
    }

    pub fn with_format(field: &str, prompt: &str, format: AnswerFormat) -> Self {
        Self {
            field: field.to_owned(),
            prompt: prompt.to_owned(),
            format,
        }
    }
}

/// Normalization applied to an intake answer before it is recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerFormat {
    #[default]
    Text,
    Date,
    Time,
    Age,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasePriority {
    High,
    #[default]
    Medium,
    Low,
}

impl CasePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

fn d_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn murder() -> Agent {
        Agent::new("murder", "Murder").with_intake(vec![
            IntakeStep::text("causeOfDeath", "Cause of death?"),
            IntakeStep::text("crimeTime", "When?"),
            IntakeStep::text("weaponUsed", "Weapon?"),
        ])
    }

    #[test]
    fn with_intake_marks_interactive() {
        assert!(murder().is_interactive());
        assert!(!Agent::new("general", "General").is_interactive());
    }

    #[test]
    fn next_unanswered_follows_declared_order() {
        let agent = murder();
        let mut answered = FieldMap::new();
        assert_eq!(agent.next_unanswered(&answered).unwrap().field, "causeOfDeath");
        answered.insert("causeOfDeath", "blunt trauma");
        assert_eq!(agent.next_unanswered(&answered).unwrap().field, "crimeTime");
        answered.insert("crimeTime", "late");
        answered.insert("weaponUsed", "knife");
        assert!(agent.next_unanswered(&answered).is_none());
    }

    #[test]
    fn agent_json_uses_camel_case() {
        let agent = Agent::new("murder-chief", "Chief").child_of("murder");
        let json = serde_json::to_value(&agent).unwrap();
        assert_eq!(json["parentId"], "murder");
        assert_eq!(json["enabled"], true);
        assert_eq!(json["priority"], "medium");
    }
}
