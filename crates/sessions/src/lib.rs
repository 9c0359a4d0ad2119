//! Case sessions: the intake state machine, per-session locking,
//! persistence and JSONL transcripts.

pub mod lock;
pub mod machine;
pub mod manager;
pub mod session;
pub mod store;
pub mod transcript;

pub use lock::SessionLockMap;
pub use machine::{is_reset_command, SessionStateMachine, RESET_COMMANDS};
pub use manager::{AssignOutcome, ResetOutcome, SessionManager, TurnOutcome};
pub use session::{Session, SessionState};
pub use store::SessionStore;
pub use transcript::{TranscriptLine, TranscriptWriter};
