//! Append-only report store persisted to `reports/reports.json`.
//!
//! Reports are never edited after insert except for the one status
//! transition `pending → completed | error`. A session yields at most one
//! report. Memory only changes after the file write succeeds.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use ca_domain::error::{Error, Result};
use ca_domain::{Report, ReportStatus};

pub struct ReportStore {
    path: PathBuf,
    reports: RwLock<Vec<Report>>,
}

impl ReportStore {
    /// Load or create the store at `state_path/reports/reports.json`.
    pub fn new(state_path: &Path) -> Result<Self> {
        let dir = state_path.join("reports");
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("reports.json");

        let reports: Vec<Report> = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };
        tracing::info!(reports = reports.len(), path = %path.display(), "report store loaded");

        Ok(Self {
            path,
            reports: RwLock::new(reports),
        })
    }

    pub fn insert(&self, report: Report) -> Result<()> {
        let mut reports = self.reports.write();
        if reports.iter().any(|r| r.id == report.id) {
            return Err(Error::Validation(format!("report {} already exists", report.id)));
        }
        if let Some(session_id) = &report.session_id {
            if let Some(existing) = reports
                .iter()
                .find(|r| r.session_id.as_ref() == Some(session_id))
            {
                return Err(Error::InvalidTransition(format!(
                    "session {session_id} already has report {}",
                    existing.id
                )));
            }
        }

        let mut next = reports.clone();
        next.push(report);
        self.persist(&next)?;
        *reports = next;
        Ok(())
    }

    /// The report synthesized from `session_id`, if any.
    pub fn for_session(&self, session_id: &str) -> Option<Report> {
        self.reports
            .read()
            .iter()
            .find(|r| r.session_id.as_deref() == Some(session_id))
            .cloned()
    }

    pub fn get(&self, id: &str) -> Result<Report> {
        self.reports
            .read()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("report {id}")))
    }

    /// Reports for a case in creation order.
    pub fn by_case(&self, case_id: &str) -> Vec<Report> {
        self.reports
            .read()
            .iter()
            .filter(|r| r.case_id == case_id)
            .cloned()
            .collect()
    }

    pub fn list(&self) -> Vec<Report> {
        self.reports.read().clone()
    }

    pub fn settle(&self, id: &str, status: ReportStatus) -> Result<Report> {
        let mut reports = self.reports.write();
        let idx = reports
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("report {id}")))?;

        let mut next = reports.clone();
        next[idx].settle(status)?;
        self.persist(&next)?;
        let settled = next[idx].clone();
        *reports = next;
        Ok(settled)
    }

    pub fn flush(&self) -> Result<()> {
        let reports = self.reports.read();
        self.persist(&reports)
    }

    fn persist(&self, reports: &[Report]) -> Result<()> {
        let json = serde_json::to_string_pretty(reports)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
