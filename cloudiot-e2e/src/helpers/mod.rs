//! Helper utilities for E2E runs

mod exec;
mod matching;

pub use exec::*;
pub use matching::*;

/// Error type for E2E runs
#[derive(Debug, thiserror::Error)]
pub enum E2EError {
    #[error("Setup failed: {0}")]
    Setup(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Missing credentials: {0}")]
    Credentials(String),

    #[error("Exec failed: {0}")]
    Exec(String),

    #[error("Command `{command}` exited with {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Pub/Sub request failed: {0}")]
    PubSub(String),

    #[error("Output did not match /{pattern}/: {output}")]
    Assertion { pattern: String, output: String },

    #[error("Suite failed: {0}")]
    SuiteFailed(String),
}

pub type E2EResult<T> = Result<T, E2EError>;
