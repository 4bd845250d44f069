use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitQueryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server responded with status {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Failed to parse project listing: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("git clone failed ({reason}): {output}")]
    Clone { reason: String, output: String },

    #[error("{0}")]
    ReportedCloneFailure(String),

    #[error("Project '{0}' is not part of the last GitLab search")]
    UnknownProject(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Operation timed out after {0:?}")]
    TimedOut(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GitQueryError>;
