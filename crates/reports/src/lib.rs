//! Investigation reports: synthesis from completed sessions and explicit
//! submissions, plus the append-only report store.

pub mod store;
pub mod synthesizer;

pub use store::ReportStore;
pub use synthesizer::{AnalysisSubmission, ReportSynthesizer};
