//! # keel_spec
//!
//! Application manifest and answers loading for keel.
//!
//! An application is a directory holding a `Nulecule` manifest that lists
//! its components in deployment order, each with declared parameters and
//! per-provider artifacts. User-supplied values live in an answers file.
//!
//! ## Example
//!
//! ```rust,no_run
//! use keel_spec::{Answers, ManifestReader};
//! use std::path::Path;
//!
//! let app = ManifestReader::load(Path::new("./wordpress")).unwrap();
//! let answers = Answers::load(Path::new("./wordpress/answers.toml")).unwrap();
//!
//! for component in &app.components {
//!     println!("{} ({} params)", component.name, component.params.len());
//! }
//! println!("provider: {:?}", answers.provider());
//! ```

pub mod answers;
pub mod error;
pub mod manifest;
pub mod models;

pub use answers::{AnswerValue, Answers, ComponentAnswers, ParamOrigin, ENV_PREFIX, GENERAL_SECTION};
pub use error::{SpecError, SpecResult};
pub use manifest::{ManifestReader, MANIFEST_FILE_NAMES};
pub use models::{Application, Artifact, Component, ParamDecl};
