use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use ca_agents::catalog::builtin_agents;
use ca_agents::{AgentRegistry, AgentResolver, MemoryEnablementStore};
use ca_backend::{
    BackendGateway, BackendRequest, BackendResponse, CachingGateway, FallbackProvider,
    GatewayError, RequestKind,
};
use ca_domain::Error;
use ca_sessions::{SessionManager, SessionState, SessionStateMachine, SessionStore, TranscriptWriter};

#[derive(Clone, Copy)]
enum Mode {
    Echo,
    CaseEcho,
    Fail,
    Slow(Duration),
}

struct ScriptedGateway {
    mode: Mode,
    calls: Mutex<Vec<BackendRequest>>,
}

impl ScriptedGateway {
    fn new(mode: Mode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<BackendRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendGateway for ScriptedGateway {
    async fn call(
        &self,
        payload: BackendRequest,
        deadline: Duration,
    ) -> Result<BackendResponse, GatewayError> {
        self.calls.lock().unwrap().push(payload.clone());
        match self.mode {
            Mode::Echo => Ok(BackendResponse {
                text: format!("live answer for {}", payload.agent_type),
                session_id: Some("backend-42".into()),
            }),
            Mode::CaseEcho => {
                let case = payload.context.get_str("caseId").unwrap_or_default();
                Ok(BackendResponse {
                    text: format!("status of {case}"),
                    session_id: Some(format!("backend-{case}")),
                })
            }
            Mode::Fail => Err(GatewayError::Unreachable("connection refused".into())),
            Mode::Slow(delay) => {
                if tokio::time::timeout(deadline, tokio::time::sleep(delay)).await.is_err() {
                    return Err(GatewayError::Timeout {
                        deadline_ms: deadline.as_millis() as u64,
                    });
                }
                Ok(BackendResponse {
                    text: "slow answer".into(),
                    session_id: None,
                })
            }
        }
    }

    async fn health(&self, _deadline: Duration) -> bool {
        !matches!(self.mode, Mode::Fail)
    }
}

fn manager(gateway: Arc<dyn BackendGateway>, dir: &Path, deadline: Duration) -> SessionManager {
    let agents = builtin_agents();
    let registry = Arc::new(
        AgentRegistry::new(agents.clone(), Arc::new(MemoryEnablementStore::new())).unwrap(),
    );
    let resolver = Arc::new(AgentResolver::new(registry, &HashMap::new()).unwrap());
    let fallback = Arc::new(FallbackProvider::new(&agents));
    let machine = SessionStateMachine::new(resolver, gateway, fallback, deadline);
    SessionManager::new(SessionStore::new(dir).unwrap(), machine, true)
}

const DEADLINE: Duration = Duration::from_secs(2);

#[tokio::test]
async fn murder_intake_collects_answers_in_step_order() {
    let tmp = tempfile::tempdir().unwrap();
    let gateway = ScriptedGateway::new(Mode::Echo);
    let mgr = manager(gateway.clone(), tmp.path(), DEADLINE);

    let session = mgr.create(None).await.unwrap();
    assert_eq!(session.state, SessionState::Idle);

    let assigned = mgr
        .assign_agent(&session.id, "murder", Some("murder-case-1"), false)
        .await
        .unwrap();
    let id = assigned.session.id.clone();
    assert_eq!(assigned.resolution.agent_id, "murder");
    assert_eq!(assigned.session.state, SessionState::Active);
    assert_eq!(assigned.session.current_step.as_deref(), Some("causeOfDeath"));
    assert_eq!(assigned.session.messages.len(), 1);
    assert_eq!(assigned.session.messages[0].content, "What was the cause of death?");

    let t1 = mgr.submit_turn(&id, "blunt trauma").await.unwrap();
    assert_eq!(t1.session.state, SessionState::Collecting);
    assert_eq!(t1.session.current_step.as_deref(), Some("crimeTime"));
    assert_eq!(t1.replies.len(), 1);

    mgr.submit_turn(&id, "2025-05-14 23:30").await.unwrap();
    let done = mgr.submit_turn(&id, "knife").await.unwrap();

    let s = done.session;
    assert_eq!(s.state, SessionState::Complete);
    assert!(s.terminal);
    assert!(s.current_step.is_none());
    assert_eq!(
        s.collected.keys().collect::<Vec<_>>(),
        vec!["causeOfDeath", "crimeTime", "weaponUsed"]
    );
    assert_eq!(s.collected.get_str("causeOfDeath").as_deref(), Some("blunt trauma"));
    assert_eq!(s.collected.get_str("crimeTime").as_deref(), Some("2025-05-14 23:30"));
    assert_eq!(s.collected.get_str("weaponUsed").as_deref(), Some("knife"));
    assert_eq!(s.context.get_str("weaponUsed").as_deref(), Some("knife"));

    let terminal = s.terminal_message().unwrap();
    assert_eq!(terminal.content, "live answer for murder");
    assert!(terminal.is_live());
    assert_eq!(s.backend_session_id.as_deref(), Some("backend-42"));

    // Intake prompts never touch the backend; the analysis is one call.
    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, RequestKind::Analysis);
    assert_eq!(calls[0].collected_data.len(), 3);
    assert!(!calls[0].history.is_empty());

    let transcript = TranscriptWriter::new(&tmp.path().join("sessions")).read(&id).unwrap();
    assert_eq!(transcript.len(), s.messages.len());
}

#[tokio::test]
async fn failing_backend_still_completes_degraded() {
    let tmp = tempfile::tempdir().unwrap();
    let mgr = manager(ScriptedGateway::new(Mode::Fail), tmp.path(), DEADLINE);

    let id = mgr.create(None).await.unwrap().id;
    mgr.assign_agent(&id, "homicide", Some("c-7"), false).await.unwrap();
    for answer in ["blunt trauma", "last night", "bat"] {
        mgr.submit_turn(&id, answer).await.unwrap();
    }

    let s = mgr.get(&id).unwrap();
    assert_eq!(s.state, SessionState::Complete);
    let terminal = s.terminal_message().unwrap();
    assert!(!terminal.is_live());
    assert!(terminal.content.contains("Cause of death: blunt trauma"));
}

#[tokio::test]
async fn slow_backend_is_cut_off_at_deadline() {
    let tmp = tempfile::tempdir().unwrap();
    let mgr = manager(
        ScriptedGateway::new(Mode::Slow(Duration::from_secs(5))),
        tmp.path(),
        Duration::from_millis(100),
    );

    let id = mgr.create(Some("general")).await.unwrap().id;
    let start = Instant::now();
    let turn = mgr.submit_turn(&id, "what evidence should I keep?").await.unwrap();
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(turn.session.state, SessionState::Active);
    assert!(!turn.replies[0].is_live());
    assert!(turn.replies[0].content.contains("Case Details:"));
}

#[tokio::test]
async fn invalid_date_reprompts_without_recording() {
    let tmp = tempfile::tempdir().unwrap();
    let mgr = manager(ScriptedGateway::new(Mode::Echo), tmp.path(), DEADLINE);

    let id = mgr.create(None).await.unwrap().id;
    mgr.assign_agent(&id, "theft", None, false).await.unwrap();

    let bad = mgr.submit_turn(&id, "not a date").await.unwrap();
    assert!(bad.session.collected.is_empty());
    assert_eq!(bad.session.current_step.as_deref(), Some("dateOfTheft"));
    let reply = &bad.replies[0].content;
    assert!(reply.starts_with("I couldn't process your input: "));
    assert!(reply.ends_with("Please try again. When did the theft happen?"));

    let good = mgr.submit_turn(&id, "2024-03-05").await.unwrap();
    assert_eq!(good.session.collected.get_str("dateOfTheft").as_deref(), Some("2024-03-05"));
    assert_eq!(good.session.current_step.as_deref(), Some("location"));
}

#[tokio::test]
async fn free_form_turn_uses_backend_when_live() {
    let tmp = tempfile::tempdir().unwrap();
    let gateway = ScriptedGateway::new(Mode::Echo);
    let mgr = manager(gateway.clone(), tmp.path(), DEADLINE);

    let id = mgr.create(None).await.unwrap().id;
    mgr.assign_agent(&id, "smuggling", None, false).await.unwrap();
    let turn = mgr.submit_turn(&id, "common routes?").await.unwrap();

    assert_eq!(turn.session.state, SessionState::Active);
    assert_eq!(turn.replies[0].content, "live answer for smuggle");
    assert!(turn.replies[0].is_live());
    assert_eq!(gateway.calls()[0].kind, RequestKind::Question);
}

#[tokio::test]
async fn invalid_transitions_are_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let mgr = manager(ScriptedGateway::new(Mode::Echo), tmp.path(), DEADLINE);

    let id = mgr.create(None).await.unwrap().id;
    let idle = mgr.submit_turn(&id, "hello").await.unwrap_err();
    assert!(matches!(idle, Error::InvalidTransition(_)));

    mgr.assign_agent(&id, "murder", None, false).await.unwrap();
    let again = mgr.assign_agent(&id, "theft", None, false).await.unwrap_err();
    assert!(matches!(again, Error::InvalidTransition(_)));

    for answer in ["poison", "noon", "none"] {
        mgr.submit_turn(&id, answer).await.unwrap();
    }
    let complete = mgr.submit_turn(&id, "one more").await.unwrap_err();
    assert!(matches!(complete, Error::InvalidTransition(_)));

    let empty = mgr.create(Some("general")).await.unwrap();
    let err = mgr.submit_turn(&empty.id, "   ").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn reassign_with_reset_moves_to_successor() {
    let tmp = tempfile::tempdir().unwrap();
    let mgr = manager(ScriptedGateway::new(Mode::Echo), tmp.path(), DEADLINE);

    let id = mgr.create(None).await.unwrap().id;
    mgr.assign_agent(&id, "murder", None, false).await.unwrap();
    let moved = mgr.assign_agent(&id, "theft", Some("t-1"), true).await.unwrap();

    assert_ne!(moved.session.id, id);
    assert_eq!(moved.session.previous_session_id.as_deref(), Some(id.as_str()));
    assert_eq!(moved.session.agent_id.as_deref(), Some("theft"));
    assert!(matches!(mgr.get(&id), Err(Error::NotFound(_))));
}

#[tokio::test]
async fn reset_clears_history_and_keeps_agent() {
    let tmp = tempfile::tempdir().unwrap();
    let mgr = manager(ScriptedGateway::new(Mode::Echo), tmp.path(), DEADLINE);

    let id = mgr.create(None).await.unwrap().id;
    mgr.assign_agent(&id, "murder", Some("murder-case-1"), false).await.unwrap();
    mgr.submit_turn(&id, "blunt trauma").await.unwrap();

    let out = mgr.reset(&id, "user request").await.unwrap();
    let s = out.session;
    assert_ne!(s.id, id);
    assert_eq!(s.previous_session_id.as_deref(), Some(id.as_str()));
    assert_eq!(s.state, SessionState::Active);
    assert_eq!(s.agent_id.as_deref(), Some("murder"));
    assert!(s.messages.is_empty());
    assert!(s.collected.is_empty());
    assert_eq!(s.current_step.as_deref(), Some("causeOfDeath"));
    assert_eq!(s.case_id().as_deref(), Some("murder-case-1"));
    assert_eq!(out.opening_prompt.as_deref(), Some("What was the cause of death?"));
}

#[tokio::test]
async fn reset_of_idle_session_stays_idle() {
    let tmp = tempfile::tempdir().unwrap();
    let mgr = manager(ScriptedGateway::new(Mode::Echo), tmp.path(), DEADLINE);

    let id = mgr.create(None).await.unwrap().id;
    let out = mgr.reset(&id, "manual").await.unwrap();
    assert_eq!(out.session.state, SessionState::Idle);
    assert!(out.opening_prompt.is_none());
}

#[tokio::test]
async fn reset_command_in_turn() {
    let tmp = tempfile::tempdir().unwrap();
    let mgr = manager(ScriptedGateway::new(Mode::Echo), tmp.path(), DEADLINE);

    let id = mgr.create(None).await.unwrap().id;
    mgr.assign_agent(&id, "murder", None, false).await.unwrap();
    mgr.submit_turn(&id, "blunt trauma").await.unwrap();

    let turn = mgr.submit_turn(&id, "Start Over").await.unwrap();
    assert!(turn.reset);
    assert!(turn.session.collected.is_empty());
    assert_eq!(turn.session.previous_session_id.as_deref(), Some(id.as_str()));
}

#[tokio::test]
async fn concurrent_turns_one_is_busy() {
    let tmp = tempfile::tempdir().unwrap();
    let mgr = manager(
        ScriptedGateway::new(Mode::Slow(Duration::from_millis(200))),
        tmp.path(),
        DEADLINE,
    );
    let id = mgr.create(Some("general")).await.unwrap().id;

    let (a, b) = tokio::join!(mgr.submit_turn(&id, "first"), mgr.submit_turn(&id, "second"));
    let results = [a, b];
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let busy = results
        .iter()
        .filter(|r| matches!(r, Err(Error::SessionBusy)))
        .count();
    assert_eq!((ok, busy), (1, 1));

    // Lock is released once the winner finishes.
    assert!(mgr.submit_turn(&id, "third").await.is_ok());
}

#[tokio::test]
async fn reset_during_turn_discards_the_turn() {
    let tmp = tempfile::tempdir().unwrap();
    let mgr = manager(
        ScriptedGateway::new(Mode::Slow(Duration::from_millis(300))),
        tmp.path(),
        DEADLINE,
    );
    let id = mgr.create(Some("general")).await.unwrap().id;

    let (turn, reset) = tokio::join!(mgr.submit_turn(&id, "question"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        mgr.reset(&id, "manual").await
    });

    assert!(matches!(turn, Err(Error::InvalidTransition(_))));
    let successor = reset.unwrap().session;
    let stored = mgr.get(&successor.id).unwrap();
    assert!(stored.messages.is_empty());
    assert!(mgr.get(&id).is_err());
}

#[tokio::test]
async fn sessions_survive_flush() {
    let tmp = tempfile::tempdir().unwrap();
    let id = {
        let mgr = manager(ScriptedGateway::new(Mode::Echo), tmp.path(), DEADLINE);
        let id = mgr.create(Some("theft")).await.unwrap().id;
        mgr.flush().unwrap();
        id
    };

    let mgr = manager(ScriptedGateway::new(Mode::Echo), tmp.path(), DEADLINE);
    let s = mgr.get(&id).unwrap();
    assert_eq!(s.agent_id.as_deref(), Some("theft"));
    assert_eq!(mgr.list().len(), 1);
}

#[tokio::test]
async fn cached_answers_stay_within_their_case() {
    let tmp = tempfile::tempdir().unwrap();
    let inner = ScriptedGateway::new(Mode::CaseEcho);
    let cached = Arc::new(CachingGateway::new(inner.clone(), Duration::from_secs(300)));
    let mgr = manager(cached, tmp.path(), DEADLINE);

    let mut ids = Vec::new();
    for case_id in ["CASE-A", "CASE-B"] {
        let s = mgr.create(None).await.unwrap();
        mgr.assign_agent(&s.id, "accident", Some(case_id), false)
            .await
            .unwrap();
        ids.push(s.id);
    }

    let a = mgr.submit_turn(&ids[0], "What is the status?").await.unwrap();
    let b = mgr.submit_turn(&ids[1], "What is the status?").await.unwrap();

    assert_eq!(a.replies[0].content, "status of CASE-A");
    assert_eq!(b.replies[0].content, "status of CASE-B");
    assert_eq!(a.session.backend_session_id.as_deref(), Some("backend-CASE-A"));
    assert_eq!(b.session.backend_session_id.as_deref(), Some("backend-CASE-B"));
    assert_eq!(inner.calls().len(), 2);
}
