//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while invoking a backend command.
///
/// A command that starts and exits non-zero is not an error at this layer;
/// it comes back as an [`ExecutionResult`](crate::ExecutionResult) with its
/// exit code so the caller can decide.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Command not found on PATH: {0}")]
    ProgramNotFound(String),

    #[error("Failed to spawn {program}: {message}")]
    SpawnFailed { program: String, message: String },

    #[error("{program} timed out after {seconds} seconds")]
    Timeout { program: String, seconds: u64 },

    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
