//! Error types for resolution and rendering.

use thiserror::Error;

/// Result type alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while resolving parameters or rendering artifacts.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Missing required parameter: {0}")]
    MissingRequiredParameter(String),

    #[error("Unresolved placeholder(s) in {artifact}: {}", names.join(", "))]
    UnresolvedPlaceholder { artifact: String, names: Vec<String> },

    #[error("Invalid placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),
}
