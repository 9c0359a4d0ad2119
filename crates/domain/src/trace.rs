use serde::Serialize;

/// Structured trace events emitted across all caseagent crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    AgentResolved {
        classification: String,
        agent_id: String,
        matched: String,
        case_id: Option<String>,
    },
    AgentToggled {
        agent_id: String,
        enabled: bool,
    },
    SessionCreated {
        session_id: String,
        agent_id: Option<String>,
    },
    SessionReset {
        old_session_id: String,
        new_session_id: String,
        reason: String,
    },
    StepAdvanced {
        session_id: String,
        agent_id: String,
        field: String,
        next_field: Option<String>,
    },
    BackendCall {
        endpoint: String,
        agent_id: String,
        status: u16,
        duration_ms: u64,
    },
    BackendFallback {
        session_id: String,
        agent_id: String,
        reason: String,
    },
    ReportSynthesized {
        report_id: String,
        session_id: Option<String>,
        case_id: String,
        degraded: bool,
    },
    TranscriptAppend {
        session_id: String,
        lines: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "ca_event");
    }
}
