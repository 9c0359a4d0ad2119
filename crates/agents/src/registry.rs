//! Agent definitions and their hierarchy.

use std::collections::HashMap;
use std::sync::Arc;

use ca_domain::agent::GENERAL_AGENT;
use ca_domain::error::{Error, Result};
use ca_domain::trace::TraceEvent;
use ca_domain::Agent;

use crate::enablement::EnablementStore;

/// Immutable agent tree plus a handle to the mutable enablement flags.
pub struct AgentRegistry {
    agents: Vec<Agent>,
    index: HashMap<String, usize>,
    enablement: Arc<dyn EnablementStore>,
}

impl AgentRegistry {
    /// Validate the tree and build the registry.
    ///
    /// Fails when ids repeat, a parent is missing, the parent chain loops,
    /// a child id is not prefixed by `<parent>-`, or `general` is absent.
    pub fn new(agents: Vec<Agent>, enablement: Arc<dyn EnablementStore>) -> Result<Self> {
        let mut index = HashMap::with_capacity(agents.len());
        for (i, agent) in agents.iter().enumerate() {
            if agent.id.trim().is_empty() {
                return Err(Error::Config(format!("agent #{i} has an empty id")));
            }
            if index.insert(agent.id.clone(), i).is_some() {
                return Err(Error::Config(format!("duplicate agent id '{}'", agent.id)));
            }
        }

        if !index.contains_key(GENERAL_AGENT) {
            return Err(Error::Config(format!("agent '{GENERAL_AGENT}' must be defined")));
        }

        for agent in &agents {
            let Some(parent) = &agent.parent_id else {
                continue;
            };
            if !index.contains_key(parent) {
                return Err(Error::Config(format!(
                    "agent '{}' references unknown parent '{parent}'",
                    agent.id
                )));
            }
            if !agent.id.starts_with(&format!("{parent}-")) {
                return Err(Error::Config(format!(
                    "agent '{}' must be namespaced under its parent ('{parent}-...')",
                    agent.id
                )));
            }
        }

        // A chain longer than the agent count has revisited a node.
        for agent in &agents {
            let mut hops = 0;
            let mut cursor = agent.parent_id.as_deref();
            while let Some(id) = cursor {
                hops += 1;
                if hops > agents.len() {
                    return Err(Error::Config(format!(
                        "agent '{}' is part of a parent cycle",
                        agent.id
                    )));
                }
                cursor = agents[index[id]].parent_id.as_deref();
            }
        }

        tracing::info!(agents = agents.len(), "agent registry loaded");

        Ok(Self {
            agents,
            index,
            enablement,
        })
    }

    fn definition(&self, id: &str) -> Option<&Agent> {
        self.index.get(id).map(|&i| &self.agents[i])
    }

    /// Definition with the live `enabled` flag applied.
    fn effective(&self, agent: &Agent) -> Agent {
        let mut out = agent.clone();
        out.enabled = self.is_enabled(&agent.id);
        out
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All agents in declaration order.
    pub fn list_agents(&self) -> Vec<Agent> {
        self.agents.iter().map(|a| self.effective(a)).collect()
    }

    pub fn get_agent(&self, id: &str) -> Result<Agent> {
        self.definition(id)
            .map(|a| self.effective(a))
            .ok_or_else(|| Error::NotFound(format!("agent '{id}'")))
    }

    /// Direct sub-agents of `id`, in declaration order.
    pub fn children(&self, id: &str) -> Result<Vec<Agent>> {
        if !self.contains(id) {
            return Err(Error::NotFound(format!("agent '{id}'")));
        }
        Ok(self
            .agents
            .iter()
            .filter(|a| a.parent_id.as_deref() == Some(id))
            .map(|a| self.effective(a))
            .collect())
    }

    /// Ids from the parent of `id` up to its root.
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = self.definition(id).and_then(|a| a.parent_id.as_deref());
        while let Some(parent) = cursor {
            out.push(parent.to_owned());
            cursor = self.definition(parent).and_then(|a| a.parent_id.as_deref());
        }
        out
    }

    /// Agents without a parent, i.e. the crime categories.
    pub fn top_level(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| a.parent_id.is_none())
    }

    /// Explicit store flag, else the definition default. Unknown ids are disabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        match self.definition(id) {
            Some(agent) => self.enablement.get(id).unwrap_or(agent.enabled),
            None => false,
        }
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) -> Result<()> {
        if !self.contains(id) {
            return Err(Error::NotFound(format!("agent '{id}'")));
        }
        self.enablement.set(id, enabled)?;
        TraceEvent::AgentToggled {
            agent_id: id.to_owned(),
            enabled,
        }
        .emit();
        Ok(())
    }

    /// Bulk update. Rejected as a whole if any id is unknown.
    pub fn set_enabled_many(&self, flags: &HashMap<String, bool>) -> Result<()> {
        if let Some(unknown) = flags.keys().find(|id| !self.contains(id)) {
            return Err(Error::NotFound(format!("agent '{unknown}'")));
        }
        self.enablement.set_many(flags)?;
        for (id, enabled) in flags {
            TraceEvent::AgentToggled {
                agent_id: id.clone(),
                enabled: *enabled,
            }
            .emit();
        }
        Ok(())
    }

    /// Effective flag for every agent.
    pub fn enablement(&self) -> HashMap<String, bool> {
        self.agents
            .iter()
            .map(|a| (a.id.clone(), self.is_enabled(&a.id)))
            .collect()
    }
}
