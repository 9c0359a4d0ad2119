/// Shared error type used across all caseagent crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid classification: {0}")]
    InvalidClassification(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("session is busy: a turn is already in progress")]
    SessionBusy,

    #[error("session {0} is not complete")]
    IncompleteSession(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
