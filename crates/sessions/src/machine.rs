//! Session state machine: `IDLE → ACTIVE → COLLECTING → ANALYZING → COMPLETE`.
//!
//! Operates on an owned copy of a session; the manager decides whether the
//! result is committed. The gateway await is the only suspension point and
//! is bounded by `deadline`. Gateway failures never surface as errors.

use std::sync::Arc;
use std::time::Duration;

use ca_agents::resolver::seed_context;
use ca_agents::validation::normalize;
use ca_agents::{AgentResolver, Resolution};
use ca_backend::{
    BackendGateway, BackendRequest, FallbackProvider, GatewayError, HistoryEntry, RequestKind,
};
use ca_domain::error::{Error, Result};
use ca_domain::trace::TraceEvent;
use ca_domain::{Agent, FieldMap, Message};

use crate::session::{Session, SessionState};

/// Messages that restart the conversation instead of answering.
pub const RESET_COMMANDS: &[&str] = &["reset", "restart", "start over"];

pub fn is_reset_command(text: &str) -> bool {
    let t = text.trim().to_lowercase();
    RESET_COMMANDS.contains(&t.as_str())
}

pub struct SessionStateMachine {
    resolver: Arc<AgentResolver>,
    gateway: Arc<dyn BackendGateway>,
    fallback: Arc<FallbackProvider>,
    deadline: Duration,
}

impl SessionStateMachine {
    pub fn new(
        resolver: Arc<AgentResolver>,
        gateway: Arc<dyn BackendGateway>,
        fallback: Arc<FallbackProvider>,
        deadline: Duration,
    ) -> Self {
        Self {
            resolver,
            gateway,
            fallback,
            deadline,
        }
    }

    pub fn resolver(&self) -> &Arc<AgentResolver> {
        &self.resolver
    }

    pub fn fallback(&self) -> &Arc<FallbackProvider> {
        &self.fallback
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Assignment
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Resolve a classification and start the resulting agent.
    pub fn assign(
        &self,
        session: &mut Session,
        classification: &str,
        case_id: Option<&str>,
    ) -> Result<Resolution> {
        require_idle(session)?;
        let resolution = self.resolver.resolve(classification, case_id)?;
        let agent = self.resolver.registry().get_agent(&resolution.agent_id)?;
        self.start(session, &agent, resolution.seed_context.clone());
        Ok(resolution)
    }

    /// Start a specific agent, bypassing classification.
    pub fn assign_direct(&self, session: &mut Session, agent_id: &str) -> Result<()> {
        require_idle(session)?;
        let agent = self.resolver.registry().get_agent(agent_id)?;
        if !self.resolver.registry().is_enabled(agent_id) {
            return Err(Error::Validation(format!("agent {agent_id} is disabled")));
        }
        self.start(session, &agent, seed_context(&agent, None));
        Ok(())
    }

    fn start(&self, session: &mut Session, agent: &Agent, context: FieldMap) {
        session.agent_id = Some(agent.id.clone());
        session.context = context;
        session.state = SessionState::Active;

        let opening = match agent.intake.first() {
            Some(first) if agent.is_interactive() => {
                session.current_step = Some(first.field.clone());
                self.fallback.prompt_for(&agent.id, &first.field)
            }
            _ => self.fallback.greeting_for(&agent.id),
        };
        let msg = session.reply(opening, None);
        session.push(msg);
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Turns
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Apply one user turn. Returns the assistant messages it produced.
    pub async fn submit(&self, session: &mut Session, text: &str) -> Result<Vec<Message>> {
        if !matches!(session.state, SessionState::Active | SessionState::Collecting) {
            return Err(Error::InvalidTransition(format!(
                "cannot submit a turn to a session in state {}",
                session.state
            )));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Validation("message must not be empty".into()));
        }
        let agent_id = session
            .agent_id
            .clone()
            .ok_or_else(|| Error::InvalidTransition("session has no agent".into()))?;
        let agent = self.resolver.registry().get_agent(&agent_id)?;

        session.push(Message::user(text));
        let first_reply = session.messages.len();

        match session.current_step.clone() {
            Some(field) if agent.is_interactive() => {
                self.answer_step(session, &agent, &field, text).await;
            }
            _ => self.free_form(session, &agent, text).await,
        }

        Ok(session.messages[first_reply..].to_vec())
    }

    async fn answer_step(&self, session: &mut Session, agent: &Agent, field: &str, text: &str) {
        session.state = SessionState::Collecting;
        let prompt = self.fallback.prompt_for(&agent.id, field);
        let format = agent.step(field).map(|s| s.format).unwrap_or_default();

        let value = match normalize(format, text) {
            Ok(v) => v,
            Err(reason) => {
                let msg = session.reply(
                    format!("I couldn't process your input: {reason}\n\nPlease try again. {prompt}"),
                    None,
                );
                session.push(msg);
                return;
            }
        };

        session.collected.insert(field, value.clone());
        session.context.insert(field, value);

        let next = agent.next_unanswered(&session.collected).map(|s| s.field.clone());
        TraceEvent::StepAdvanced {
            session_id: session.id.clone(),
            agent_id: agent.id.clone(),
            field: field.to_owned(),
            next_field: next.clone(),
        }
        .emit();

        match next {
            Some(next) => {
                let msg = session.reply(self.fallback.prompt_for(&agent.id, &next), None);
                session.current_step = Some(next);
                session.push(msg);
            }
            None => {
                session.current_step = None;
                session.state = SessionState::Analyzing;
                self.analyze(session, agent).await;
            }
        }
    }

    async fn free_form(&self, session: &mut Session, agent: &Agent, text: &str) {
        let mut payload = BackendRequest::question(&agent.id, text, session.context.clone());
        payload.history = history(&session.messages);
        payload.session_id = session.backend_session_id.clone();

        let msg = match self.gateway.call(payload, self.deadline).await {
            Ok(resp) => {
                if resp.session_id.is_some() {
                    session.backend_session_id = resp.session_id;
                }
                session.reply(resp.text, Some(true))
            }
            Err(e) => {
                self.note_fallback(session, agent, &e);
                let text = self.fallback.respond_to(&agent.id, text, &session.context);
                session.reply(text, Some(false))
            }
        };
        session.push(msg);
    }

    /// Exactly one backend call; always ends in `COMPLETE`.
    async fn analyze(&self, session: &mut Session, agent: &Agent) {
        let question = format!(
            "Analyze this {} case using the collected information and recommend next investigative steps.",
            agent.name
        );
        let payload = BackendRequest {
            question,
            agent_type: agent.id.clone(),
            context: session.context.clone(),
            collected_data: session.collected.clone(),
            history: history(&session.messages),
            session_id: session.backend_session_id.clone(),
            kind: RequestKind::Analysis,
        };

        let msg = match self.gateway.call(payload, self.deadline).await {
            Ok(resp) => {
                if resp.session_id.is_some() {
                    session.backend_session_id = resp.session_id;
                }
                session.reply(resp.text, Some(true))
            }
            Err(e) => {
                self.note_fallback(session, agent, &e);
                let text = self.fallback.degraded_analysis_for(&agent.id, &session.collected);
                session.reply(text, Some(false))
            }
        };
        session.push(msg);
        session.state = SessionState::Complete;
        session.terminal = true;
    }

    fn note_fallback(&self, session: &Session, agent: &Agent, err: &GatewayError) {
        tracing::warn!(
            session_id = %session.id,
            agent_id = %agent.id,
            kind = err.kind(),
            error = %err,
            "backend unavailable; using fallback content"
        );
        TraceEvent::BackendFallback {
            session_id: session.id.clone(),
            agent_id: agent.id.clone(),
            reason: err.kind().to_owned(),
        }
        .emit();
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Reset
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Build the successor of `session`: same agent and case, nothing
    /// collected, no messages. Returns it with the opening prompt, which is
    /// not appended.
    pub fn reset(&self, session: &Session, reason: &str) -> Result<(Session, Option<String>)> {
        let mut next = Session::successor_of(session);
        let mut opening = None;

        if let Some(agent_id) = &session.agent_id {
            let agent = self.resolver.registry().get_agent(agent_id)?;
            next.agent_id = Some(agent.id.clone());
            next.context = seed_context(&agent, session.case_id().as_deref());
            next.state = SessionState::Active;
            opening = Some(match agent.intake.first() {
                Some(first) if agent.is_interactive() => {
                    next.current_step = Some(first.field.clone());
                    self.fallback.prompt_for(&agent.id, &first.field)
                }
                _ => self.fallback.greeting_for(&agent.id),
            });
        }

        TraceEvent::SessionReset {
            old_session_id: session.id.clone(),
            new_session_id: next.id.clone(),
            reason: reason.to_owned(),
        }
        .emit();

        Ok((next, opening))
    }
}

fn require_idle(session: &Session) -> Result<()> {
    if session.state != SessionState::Idle {
        return Err(Error::InvalidTransition(format!(
            "agent can only be assigned to an IDLE session (state is {})",
            session.state
        )));
    }
    Ok(())
}

fn history(messages: &[Message]) -> Vec<HistoryEntry> {
    messages
        .iter()
        .map(|m| HistoryEntry {
            role: m.sender,
            content: m.content.clone(),
        })
        .collect()
}
