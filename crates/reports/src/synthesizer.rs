//! Turns a completed session (or an explicit analysis submission) into a
//! [`Report`].
//!
//! Report ids are `RPT-{millis}-{seq}-{classification}`; `seq` comes from a
//! counter owned by the synthesizer, so one process never repeats an id.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::Deserialize;

use ca_backend::fallback::humanize;
use ca_domain::error::{Error, Result};
use ca_domain::fields::value_text;
use ca_domain::trace::TraceEvent;
use ca_domain::{Agent, FieldMap, Panel, PanelKind, PanelPriority, QuestionAnswer, Report, ReportStatus};
use ca_sessions::{Session, SessionState};

const EVIDENCE_HINTS: &[&str] = &["weapon", "evidence", "witness"];
const TIMELINE_HINTS: &[&str] = &["date", "time"];

/// Analysis posted directly rather than produced by an intake.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSubmission {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub case_id: String,
    #[serde(default)]
    pub classification: String,
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub questions: Vec<QuestionAnswer>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

pub struct ReportSynthesizer {
    seq: AtomicU64,
    author: String,
}

impl ReportSynthesizer {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            seq: AtomicU64::new(0),
            author: author.into(),
        }
    }

    fn next_id(&self, classification: &str) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        format!("RPT-{}-{seq}-{classification}", Utc::now().timestamp_millis())
    }

    /// Report for a `COMPLETE` session driven by `agent`.
    pub fn synthesize(&self, session: &Session, agent: &Agent) -> Result<Report> {
        if session.state != SessionState::Complete {
            return Err(Error::IncompleteSession(session.id.clone()));
        }
        let terminal = session
            .terminal_message()
            .ok_or_else(|| Error::IncompleteSession(session.id.clone()))?;
        let live = terminal.is_live();

        let id = self.next_id(&agent.id);
        let case_id = session.case_id().unwrap_or_else(|| session.id.clone());
        let case_title = session
            .context
            .get_str("caseTitle")
            .unwrap_or_else(|| agent.name.clone());

        let questions = agent
            .intake
            .iter()
            .filter_map(|step| {
                session.collected.get(&step.field).map(|v| QuestionAnswer {
                    question: step.prompt.clone(),
                    answer: value_text(v),
                })
            })
            .collect();

        let mut panels = vec![
            panel(
                PanelKind::Summary,
                "Case Summary",
                summary_text(&case_id, &session.context, &session.collected),
                PanelPriority::Medium,
            ),
            panel(
                PanelKind::Analysis,
                "Analysis",
                terminal.content.clone(),
                PanelPriority::High,
            ),
        ];
        if let Some(text) = facts_matching(&session.collected, EVIDENCE_HINTS) {
            panels.push(panel(PanelKind::Evidence, "Evidence", text, PanelPriority::Medium));
        }
        if let Some(text) = facts_matching(&session.collected, TIMELINE_HINTS) {
            panels.push(panel(PanelKind::Timeline, "Timeline", text, PanelPriority::Medium));
        }

        let (status, degraded) = if live {
            (ReportStatus::Completed, false)
        } else {
            (ReportStatus::Pending, true)
        };

        let report = Report {
            id,
            title: format!("{case_title} Report"),
            case_id,
            session_id: Some(session.id.clone()),
            classification: agent.id.clone(),
            generated_at: Utc::now(),
            author: self.author.clone(),
            status,
            panels,
            questions,
            analysis: terminal.content.clone(),
            degraded,
        };
        announce(&report);
        Ok(report)
    }

    /// Report from an explicit submission; always `completed`.
    pub fn synthesize_submission(&self, sub: AnalysisSubmission) -> Result<Report> {
        let missing: Vec<&str> = [
            ("title", &sub.title),
            ("caseId", &sub.case_id),
            ("classification", &sub.classification),
            ("analysis", &sub.analysis),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let classification = sub.classification.trim().to_lowercase();
        let summary = format!(
            "Case: {}\nClassification: {}\nQuestions answered: {}",
            sub.case_id.trim(),
            classification,
            sub.questions.len()
        );

        let report = Report {
            id: self.next_id(&classification),
            title: sub.title.trim().to_owned(),
            case_id: sub.case_id.trim().to_owned(),
            session_id: sub.session_id,
            classification,
            generated_at: Utc::now(),
            author: sub
                .author
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| self.author.clone()),
            status: ReportStatus::Completed,
            panels: vec![
                panel(PanelKind::Summary, "Case Summary", summary, PanelPriority::Medium),
                panel(PanelKind::Analysis, "Analysis", sub.analysis.clone(), PanelPriority::High),
            ],
            questions: sub.questions,
            analysis: sub.analysis,
            degraded: false,
        };
        announce(&report);
        Ok(report)
    }
}

fn announce(report: &Report) {
    TraceEvent::ReportSynthesized {
        report_id: report.id.clone(),
        session_id: report.session_id.clone(),
        case_id: report.case_id.clone(),
        degraded: report.degraded,
    }
    .emit();
}

fn panel(kind: PanelKind, title: &str, content: String, priority: PanelPriority) -> Panel {
    let slug = serde_json::to_value(kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_else(|| "custom".into());
    Panel {
        id: format!("panel-{slug}"),
        title: title.to_owned(),
        kind,
        content,
        priority,
        assigned_to: None,
    }
}

fn summary_text(case_id: &str, context: &FieldMap, collected: &FieldMap) -> String {
    let mut out = format!("Case ID: {case_id}\n");
    for key in ["caseStatus", "casePriority"] {
        if let Some(v) = context.get_str(key) {
            out.push_str(&format!("{}: {v}\n", humanize(key)));
        }
    }
    for (field, value) in collected.iter() {
        out.push_str(&format!("{}: {}\n", humanize(field), value_text(value)));
    }
    out.trim_end().to_owned()
}

fn facts_matching(collected: &FieldMap, hints: &[&str]) -> Option<String> {
    let lines: Vec<String> = collected
        .iter()
        .filter(|(field, _)| {
            let f = field.to_lowercase();
            hints.iter().any(|h| f.contains(h))
        })
        .map(|(field, value)| format!("{}: {}", humanize(field), value_text(value)))
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}
