//! Session lifecycle front door: locking, commit, transcripts.
//!
//! A turn works on a clone of the session while holding its permit and
//! commits only if the session still exists afterwards, so a reset that
//! lands mid-turn discards the turn.

use serde::Serialize;

use ca_agents::Resolution;
use ca_domain::error::{Error, Result};
use ca_domain::trace::TraceEvent;
use ca_domain::Message;

use crate::lock::SessionLockMap;
use crate::machine::{is_reset_command, SessionStateMachine};
use crate::session::Session;
use crate::store::SessionStore;
use crate::transcript::TranscriptWriter;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub session: Session,
    /// Assistant messages produced by this turn.
    pub replies: Vec<Message>,
    /// Set when the turn was a reset command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_prompt: Option<String>,
    pub reset: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetOutcome {
    pub session: Session,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignOutcome {
    pub session: Session,
    pub resolution: Resolution,
}

pub struct SessionManager {
    store: SessionStore,
    locks: SessionLockMap,
    machine: SessionStateMachine,
    transcripts: Option<TranscriptWriter>,
}

impl SessionManager {
    pub fn new(store: SessionStore, machine: SessionStateMachine, transcripts: bool) -> Self {
        let transcripts = transcripts.then(|| TranscriptWriter::new(&store.dir()));
        Self {
            store,
            locks: SessionLockMap::new(),
            machine,
            transcripts,
        }
    }

    pub fn machine(&self) -> &SessionStateMachine {
        &self.machine
    }

    pub fn get(&self, id: &str) -> Result<Session> {
        self.store.get(id)
    }

    pub fn list(&self) -> Vec<Session> {
        self.store.list()
    }

    pub fn flush(&self) -> Result<()> {
        self.store.flush()
    }

    /// New session, `IDLE` unless an agent is picked up front.
    pub async fn create(&self, agent_id: Option<&str>) -> Result<Session> {
        let mut session = Session::new();
        if let Some(agent_id) = agent_id {
            self.machine.assign_direct(&mut session, agent_id)?;
        }
        self.store.insert(session.clone());

        TraceEvent::SessionCreated {
            session_id: session.id.clone(),
            agent_id: session.agent_id.clone(),
        }
        .emit();
        self.record(&session.id, &session.messages).await;
        Ok(session)
    }

    /// Resolve `classification` and start its agent. A session past `IDLE`
    /// is rejected unless `reset` is set, in which case the agent goes to a
    /// fresh successor session.
    pub async fn assign_agent(
        &self,
        id: &str,
        classification: &str,
        case_id: Option<&str>,
        reset: bool,
    ) -> Result<AssignOutcome> {
        let _permit = self.locks.try_acquire(id)?;
        let current = self.store.get(id)?;

        let (mut session, replaces) = if reset && current.agent_id.is_some() {
            let fresh = Session::successor_of(&current);
            TraceEvent::SessionReset {
                old_session_id: current.id.clone(),
                new_session_id: fresh.id.clone(),
                reason: "reassign".into(),
            }
            .emit();
            (fresh, true)
        } else {
            (current, false)
        };

        let resolution = self.machine.assign(&mut session, classification, case_id)?;

        if replaces {
            self.store.replace(id, session.clone())?;
            self.locks.forget(id);
        } else if !self.store.commit(session.clone()) {
            return Err(reset_mid_turn(id));
        }
        self.record(&session.id, &session.messages).await;

        Ok(AssignOutcome {
            session,
            resolution,
        })
    }

    pub async fn submit_turn(&self, id: &str, text: &str) -> Result<TurnOutcome> {
        let _permit = self.locks.try_acquire(id)?;

        if is_reset_command(text) {
            let outcome = self.reset(id, "user command").await?;
            return Ok(TurnOutcome {
                session: outcome.session,
                replies: Vec::new(),
                opening_prompt: outcome.opening_prompt,
                reset: true,
            });
        }

        let mut session = self.store.get(id)?;
        let before = session.messages.len();
        let replies = self.machine.submit(&mut session, text).await?;

        if !self.store.commit(session.clone()) {
            tracing::info!(session_id = %id, "session reset during turn; discarding result");
            return Err(reset_mid_turn(id));
        }
        self.record(id, &session.messages[before..]).await;

        Ok(TurnOutcome {
            session,
            replies,
            opening_prompt: None,
            reset: false,
        })
    }

    /// Replace the session with a fresh correlated successor. Does not
    /// take the turn lock, so it always succeeds for a known session.
    pub async fn reset(&self, id: &str, reason: &str) -> Result<ResetOutcome> {
        let current = self.store.get(id)?;
        let (session, opening_prompt) = self.machine.reset(&current, reason)?;
        self.store.replace(id, session.clone())?;
        self.locks.forget(id);

        Ok(ResetOutcome {
            session,
            opening_prompt,
        })
    }

    async fn record(&self, session_id: &str, messages: &[Message]) {
        let Some(writer) = &self.transcripts else {
            return;
        };
        if let Err(e) = writer.append(session_id, messages).await {
            tracing::warn!(session_id, error = %e, "transcript append failed");
        }
    }
}

fn reset_mid_turn(id: &str) -> Error {
    Error::InvalidTransition(format!("session {id} was reset while the turn was in flight"))
}
