//! Shared types for caseagent: agents, sessions messages, reports,
//! configuration, errors and structured trace events.

pub mod agent;
pub mod config;
pub mod error;
pub mod fields;
pub mod message;
pub mod report;
pub mod trace;

pub use agent::{Agent, AnswerFormat, CasePriority, IntakeStep};
pub use error::{Error, Result};
pub use fields::FieldMap;
pub use message::{ContextSnapshot, DeliveryStatus, Message, Sender};
pub use report::{Panel, PanelKind, PanelPriority, QuestionAnswer, Report, ReportStatus};
