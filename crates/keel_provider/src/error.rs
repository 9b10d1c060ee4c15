//! Error types for providers.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur while selecting or driving a provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Unknown provider: {0} (expected one of docker, kubernetes, openshift)")]
    UnknownProvider(String),

    #[error("Provider {provider} requires configuration key '{key}'")]
    MissingRequiredConfig { provider: String, key: String },

    #[error("Provider {provider} cannot read {path:?}: {message}")]
    UnreadableConfig {
        provider: String,
        path: PathBuf,
        message: String,
    },

    #[error("Provider {provider} needs {program} on PATH")]
    BackendUnavailable { provider: String, program: String },

    #[error("{provider} command failed with exit code {exit_code}: {command}\n{stderr}")]
    BackendInvocationFailed {
        provider: String,
        command: String,
        exit_code: i64,
        stderr: String,
    },

    #[error("Invalid artifact {artifact}: {message}")]
    InvalidArtifact { artifact: String, message: String },

    #[error("Runner error: {0}")]
    Runner(#[from] keel_runner::RunnerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    pub(crate) fn invalid_artifact(artifact: &str, message: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            artifact: artifact.to_string(),
            message: message.into(),
        }
    }
}
