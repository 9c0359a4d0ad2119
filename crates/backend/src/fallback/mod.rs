//! Deterministic offline content: intake prompts, welcome screens,
//! canned answers and degraded analyses.
//!
//! Lookups walk from the agent to its ancestors and finally to the
//! general agent, so every id (even an unknown one) gets an answer.

mod tables;

use std::collections::HashMap;

use serde::Serialize;

use ca_domain::agent::GENERAL_AGENT;
use ca_domain::{Agent, FieldMap, IntakeStep};

use tables::AgentTable;

/// Landing content for an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    pub title: String,
    pub description: String,
    pub suggested_questions: Vec<String>,
}

#[derive(Debug, Default, Clone)]
pub struct FallbackProvider {
    intake: HashMap<String, Vec<IntakeStep>>,
    names: HashMap<String, String>,
    parents: HashMap<String, String>,
}

impl FallbackProvider {
    pub fn new(agents: &[Agent]) -> Self {
        let mut out = Self::default();
        for agent in agents {
            out.names.insert(agent.id.clone(), agent.name.clone());
            if !agent.intake.is_empty() {
                out.intake.insert(agent.id.clone(), agent.intake.clone());
            }
            if let Some(parent) = &agent.parent_id {
                out.parents.insert(agent.id.clone(), parent.clone());
            }
        }
        out
    }

    /// The agent itself, then its ancestors, then general.
    fn lineage(&self, agent_id: &str) -> Vec<String> {
        let mut chain = vec![agent_id.to_owned()];
        let mut cursor = agent_id;
        while let Some(parent) = self.parents.get(cursor) {
            if chain.iter().any(|c| c == parent) {
                break;
            }
            chain.push(parent.clone());
            cursor = parent;
        }
        if !chain.iter().any(|c| c == GENERAL_AGENT) {
            chain.push(GENERAL_AGENT.to_owned());
        }
        chain
    }

    fn tables(&self, agent_id: &str) -> Vec<&'static AgentTable> {
        self.lineage(agent_id)
            .iter()
            .filter_map(|id| tables::table(id))
            .collect()
    }

    /// Question text for an intake field.
    pub fn prompt_for(&self, agent_id: &str, field: &str) -> String {
        self.lineage(agent_id)
            .iter()
            .filter_map(|id| self.intake.get(id))
            .flat_map(|steps| steps.iter())
            .find(|s| s.field == field)
            .map(|s| s.prompt.clone())
            .unwrap_or_else(|| format!("Please provide the {}.", humanize(field).to_lowercase()))
    }

    /// Greeting posted when an interactive intake starts.
    pub fn greeting_for(&self, agent_id: &str) -> String {
        match self.tables(agent_id).first() {
            Some(t) => t.intro.to_owned(),
            None => format!("You're now working with the {} agent.", self.display_name(agent_id)),
        }
    }

    pub fn welcome_for(&self, agent_id: &str) -> Welcome {
        match self.tables(agent_id).first() {
            Some(t) => Welcome {
                title: t.title.to_owned(),
                description: t.description.to_owned(),
                suggested_questions: t.suggested.iter().map(|s| (*s).to_owned()).collect(),
            },
            None => Welcome {
                title: self.display_name(agent_id),
                description: String::new(),
                suggested_questions: Vec::new(),
            },
        }
    }

    /// Canned answer to a free-form question, followed by a case summary line.
    pub fn respond_to(&self, agent_id: &str, question: &str, context: &FieldMap) -> String {
        let chain = self.tables(agent_id);
        let q = question.to_lowercase();

        let body = chain
            .iter()
            .find(|t| !t.rules.is_empty())
            .and_then(|t| {
                t.rules
                    .iter()
                    .find(|r| r.keywords.iter().any(|k| q.contains(k)))
                    .map(|r| r.reply)
            })
            .or_else(|| chain.first().map(|t| t.intro))
            .unwrap_or("I'm not able to reach the analysis service right now. Please try again shortly.");

        let mut out = String::new();
        if let Some(persona) = tables::table(agent_id).and_then(|t| t.persona) {
            out.push_str(persona);
            out.push(' ');
        }
        out.push_str(body);
        out.push_str("\n\n");
        out.push_str(&case_line(context));
        out
    }

    /// Offline analysis built from the collected answers and the agent's
    /// standard protocol.
    pub fn degraded_analysis_for(&self, agent_id: &str, collected: &FieldMap) -> String {
        let chain = self.tables(agent_id);
        let mut out = format!(
            "The live analysis service could not be reached, so this is a preliminary assessment from the standard {} protocol.\n\n",
            self.display_name(agent_id)
        );

        if collected.is_empty() {
            out.push_str("No case facts were recorded.\n");
        } else {
            out.push_str("Case facts on record:\n");
            for (field, value) in collected.iter() {
                out.push_str(&format!(
                    "• {}: {}\n",
                    humanize(field),
                    ca_domain::fields::value_text(value)
                ));
            }
        }

        let protocol: Vec<&str> = chain
            .iter()
            .flat_map(|t| t.protocol.iter().copied())
            .collect();
        if !protocol.is_empty() {
            out.push_str("\nRecommended next steps:\n");
            for step in protocol {
                out.push_str(&format!("• {step}\n"));
            }
        }

        out.push_str("\nReview this assessment once the analysis service is available.");
        out
    }

    fn display_name(&self, agent_id: &str) -> String {
        self.names
            .get(agent_id)
            .cloned()
            .unwrap_or_else(|| agent_id.to_owned())
    }
}

fn case_line(context: &FieldMap) -> String {
    let get = |key: &str, default: &str| {
        context
            .get_str(key)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default.to_owned())
    };
    format!(
        "Case Details: {} | {} | Priority: {} | Status: {}",
        get("caseId", "N/A"),
        get("caseTitle", "Untitled case"),
        get("casePriority", "medium"),
        get("caseStatus", "open"),
    )
}

/// `causeOfDeath` → `Cause of death`.
pub fn humanize(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for (i, c) in field.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else if c == '_' || c == '-' {
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agents() -> Vec<Agent> {
        vec![
            Agent::new("general", "General"),
            Agent::new("murder", "Murder").with_intake(vec![
                IntakeStep::text("causeOfDeath", "What was the cause of death?"),
                IntakeStep::text("weaponUsed", "What weapon was used?"),
            ]),
            Agent::new("murder-chief", "Chief Investigator").child_of("murder"),
            Agent::new("theft", "Theft"),
        ]
    }

    #[test]
    fn humanize_splits_camel_case() {
        assert_eq!(humanize("causeOfDeath"), "Cause of death");
        assert_eq!(humanize("victim_age"), "Victim age");
    }

    #[test]
    fn prompts_come_from_intake_then_generic() {
        let fp = FallbackProvider::new(&agents());
        assert_eq!(fp.prompt_for("murder", "weaponUsed"), "What weapon was used?");
        assert_eq!(fp.prompt_for("murder-chief", "causeOfDeath"), "What was the cause of death?");
        assert_eq!(fp.prompt_for("theft", "stolenItems"), "Please provide the stolen items.");
    }

    #[test]
    fn welcome_walks_up_to_general() {
        let fp = FallbackProvider::new(&agents());
        assert_eq!(fp.welcome_for("murder").title, "Homicide Investigation Assistant");
        assert_eq!(fp.welcome_for("murder-chief").title, "Chief Investigator");
        let unknown = fp.welcome_for("nonexistent");
        assert_eq!(unknown.title, "Welcome to the Investigation Assistant");
        assert!(!unknown.suggested_questions.is_empty());
    }

    #[test]
    fn keyword_reply_includes_case_line() {
        let fp = FallbackProvider::new(&agents());
        let ctx: FieldMap = [
            ("caseId", "murder-case-1"),
            ("caseTitle", "Murder Investigation"),
            ("casePriority", "high"),
        ]
        .into_iter()
        .collect();
        let reply = fp.respond_to("murder", "What forensic evidence matters?", &ctx);
        assert!(reply.starts_with("Forensic priorities"));
        assert!(reply.ends_with(
            "Case Details: murder-case-1 | Murder Investigation | Priority: high | Status: open"
        ));
    }

    #[test]
    fn sub_agent_borrows_parent_rules_with_persona() {
        let fp = FallbackProvider::new(&agents());
        let reply = fp.respond_to("murder-chief", "any motive?", &FieldMap::new());
        assert!(reply.starts_with("As the Chief Investigator leading this case: Motives to examine"));
        assert!(reply.contains("Case Details: N/A"));
    }

    #[test]
    fn unmatched_question_gets_intro() {
        let fp = FallbackProvider::new(&agents());
        let reply = fp.respond_to("theft", "hello there", &FieldMap::new());
        assert!(reply.starts_with("I'm the Theft Agent"));
    }

    #[test]
    fn responses_are_deterministic() {
        let fp = FallbackProvider::new(&agents());
        let a = fp.respond_to("murder", "timeline please", &FieldMap::new());
        let b = fp.respond_to("murder", "timeline please", &FieldMap::new());
        assert_eq!(a, b);
    }

    #[test]
    fn degraded_analysis_lists_facts_and_protocol() {
        let fp = FallbackProvider::new(&agents());
        let collected: FieldMap = [("causeOfDeath", "blunt trauma"), ("weaponUsed", "bat")]
            .into_iter()
            .collect();
        let text = fp.degraded_analysis_for("murder", &collected);
        assert!(text.contains("• Cause of death: blunt trauma"));
        assert!(text.contains("• Weapon used: bat"));
        assert!(text.contains("chain of custody"));
        assert_eq!(text, fp.degraded_analysis_for("murder", &collected));
    }

    #[test]
    fn degraded_analysis_without_facts() {
        let fp = FallbackProvider::new(&agents());
        let text = fp.degraded_analysis_for("general", &FieldMap::new());
        assert!(text.contains("No case facts were recorded."));
    }
}
