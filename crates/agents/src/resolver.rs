//! Classification → agent resolution.
//!
//! Lookup order: exact alias or agent id, then the nearest ancestor
//! category obtained by stripping trailing segments, then `general`.
//! A disabled result walks up its parent chain before settling on
//! `general`. Only an empty classification is an error.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use ca_domain::agent::GENERAL_AGENT;
use ca_domain::error::{Error, Result};
use ca_domain::trace::TraceEvent;
use ca_domain::{Agent, FieldMap};

use crate::catalog::builtin_classifications;
use crate::registry::AgentRegistry;

const SEGMENT_SEPARATORS: &[char] = &['-', '/', '.', ':', '_', ' '];

/// A crime/case type plus optional case id. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    crime_type: String,
    case_id: Option<String>,
}

impl Classification {
    pub fn new(crime_type: &str, case_id: Option<&str>) -> Result<Self> {
        let crime_type = crime_type.trim();
        if crime_type.is_empty() {
            return Err(Error::InvalidClassification(
                "classification must not be empty".into(),
            ));
        }
        Ok(Self {
            crime_type: crime_type.to_lowercase(),
            case_id: case_id
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_owned),
        })
    }

    pub fn crime_type(&self) -> &str {
        &self.crime_type
    }

    pub fn case_id(&self) -> Option<&str> {
        self.case_id.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Ancestor,
    Default,
}

impl MatchKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Ancestor => "ancestor",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub agent_id: String,
    pub seed_context: FieldMap,
    pub matched: MatchKind,
}

pub struct AgentResolver {
    registry: Arc<AgentRegistry>,
    classifications: HashMap<String, String>,
    assignments: RwLock<HashMap<String, String>>,
}

impl AgentResolver {
    /// Build from the registry, the built-in aliases and configured aliases.
    ///
    /// Every top-level agent id maps to itself; configuration that points a
    /// top-level id at another agent, or any alias at an unknown agent, is
    /// rejected.
    pub fn new(registry: Arc<AgentRegistry>, configured: &HashMap<String, String>) -> Result<Self> {
        let mut classifications: HashMap<String, String> = builtin_classifications()
            .into_iter()
            .filter(|(_, agent)| registry.contains(agent))
            .map(|(class, agent)| (class.to_owned(), agent.to_owned()))
            .collect();

        for (class, agent) in configured {
            let class = class.trim().to_lowercase();
            if class.is_empty() {
                return Err(Error::Config("empty classification alias".into()));
            }
            if !registry.contains(agent) {
                return Err(Error::Config(format!(
                    "classification '{class}' targets unknown agent '{agent}'"
                )));
            }
            classifications.insert(class, agent.clone());
        }

        for root in registry.top_level() {
            let key = root.id.to_lowercase();
            match classifications.get(&key) {
                Some(target) if *target != root.id => {
                    return Err(Error::Config(format!(
                        "classification '{key}' must resolve to its own category, not '{target}'"
                    )));
                }
                Some(_) => {}
                None => {
                    classifications.insert(key, root.id.clone());
                }
            }
        }

        Ok(Self {
            registry,
            classifications,
            assignments: RwLock::new(HashMap::new()),
        })
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Resolve a classification to an agent and its seed context.
    pub fn resolve(&self, classification: &str, existing_case_id: Option<&str>) -> Result<Resolution> {
        let classification = Classification::new(classification, existing_case_id)?;
        self.resolve_classification(&classification)
    }

    pub fn resolve_classification(&self, classification: &Classification) -> Result<Resolution> {
        let (candidate, matched) = self.lookup(classification.crime_type());
        let agent_id = self.first_enabled(&candidate);

        let agent = self.registry.get_agent(&agent_id)?;
        let seed_context = seed_context(&agent, classification.case_id());

        if let Some(case_id) = classification.case_id() {
            self.assignments
                .write()
                .insert(case_id.to_owned(), agent_id.clone());
        }

        TraceEvent::AgentResolved {
            classification: classification.crime_type().to_owned(),
            agent_id: agent_id.clone(),
            matched: matched.as_str().to_owned(),
            case_id: classification.case_id().map(str::to_owned),
        }
        .emit();

        Ok(Resolution {
            agent_id,
            seed_context,
            matched,
        })
    }

    /// Agent recorded for a case by an earlier resolution, else `general`.
    pub fn agent_for_case(&self, case_id: &str) -> String {
        self.assignments
            .read()
            .get(case_id)
            .cloned()
            .unwrap_or_else(|| GENERAL_AGENT.to_owned())
    }

    fn direct(&self, key: &str) -> Option<String> {
        if let Some(agent) = self.classifications.get(key) {
            return Some(agent.clone());
        }
        if self.registry.contains(key) {
            return Some(key.to_owned());
        }
        None
    }

    fn lookup(&self, key: &str) -> (String, MatchKind) {
        if let Some(agent) = self.direct(key) {
            return (agent, MatchKind::Exact);
        }

        let mut rest = key;
        while let Some(cut) = rest.rfind(SEGMENT_SEPARATORS) {
            rest = rest[..cut].trim_end_matches(SEGMENT_SEPARATORS);
            if rest.is_empty() {
                break;
            }
            if let Some(agent) = self.direct(rest) {
                return (agent, MatchKind::Ancestor);
            }
        }

        (GENERAL_AGENT.to_owned(), MatchKind::Default)
    }

    fn first_enabled(&self, candidate: &str) -> String {
        if self.registry.is_enabled(candidate) {
            return candidate.to_owned();
        }
        self.registry
            .ancestors(candidate)
            .into_iter()
            .find(|id| self.registry.is_enabled(id))
            .unwrap_or_else(|| GENERAL_AGENT.to_owned())
    }
}

/// Scaffolding context for prompting. Contains no clock-derived values,
/// so identical inputs always produce identical seeds.
pub fn seed_context(agent: &Agent, case_id: Option<&str>) -> FieldMap {
    let mut ctx = FieldMap::new();
    if let Some(case_id) = case_id {
        ctx.insert("caseId", case_id);
    }
    ctx.insert("caseTitle", format!("{} Investigation", title_case(&agent.id)));
    ctx.insert("caseStatus", "open");
    ctx.insert("casePriority", agent.priority.as_str());
    ctx.insert("agentType", agent.id.as_str());
    ctx.merge(&agent.seed);
    ctx
}

fn title_case(id: &str) -> String {
    id.split(SEGMENT_SEPARATORS)
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
