//! Error types for the spec module.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors that can occur while loading manifests or answers.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("No Nulecule manifest found in: {0}")]
    NotFound(PathBuf),

    #[error("Invalid format in file {path}: {message}")]
    InvalidFormat { path: PathBuf, message: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Duplicate component name in graph: {0}")]
    DuplicateComponent(String),

    #[error("Artifact {path} of component {component} not found")]
    ArtifactNotFound { component: String, path: String },

    #[error("Component {component} inherits artifacts from unknown provider {provider}")]
    UnknownInherit { component: String, provider: String },

    #[error("Unsupported manifest feature: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}
