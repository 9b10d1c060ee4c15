//! Error types for the core module.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that abort an operation before any component is processed.
///
/// Failures of individual components are not errors at this level; they
/// are recorded in the [`DeploymentReport`](crate::DeploymentReport).
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Manifest error: {0}")]
    Spec(#[from] keel_spec::SpecError),

    #[error("Provider error: {0}")]
    Provider(#[from] keel_provider::ProviderError),
}
