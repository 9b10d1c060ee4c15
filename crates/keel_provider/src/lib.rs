//! # keel_provider
//!
//! Deployment providers for keel.
//!
//! A provider drives one backend through its own command-line tool:
//!
//! - **docker**: one `docker run` per run specification
//! - **kubernetes**: one `kubectl create -f` per resource manifest
//! - **openshift**: one `oc create -f` per manifest or template object
//!
//! Providers are obtained through [`ProviderSelector::select`], which
//! validates the provider configuration before handing the provider out.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! use keel_provider::{ProviderContext, ProviderSelector};
//! use keel_runner::{CliRunner, CliRunnerOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let context = ProviderContext::new(
//!     Arc::new(CliRunner::new(CliRunnerOptions::default())),
//!     "/tmp/helloapache/.workdir",
//! );
//!
//! let mut general = BTreeMap::new();
//! general.insert("namespace".to_string(), "staging".to_string());
//!
//! let provider = ProviderSelector::select("kubernetes", &general, context)?;
//! assert_eq!(provider.config().namespace(), "staging");
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod config;
pub mod docker;
pub mod error;
pub mod kubernetes;
pub mod openshift;
pub mod provider;
pub mod resource;
pub mod selector;

pub use config::{ConfigKey, ProviderConfig, ProviderKind};
pub use docker::{DockerProvider, DockerRunSpec};
pub use error::{ProviderError, ProviderResult};
pub use kubernetes::KubernetesProvider;
pub use openshift::OpenShiftProvider;
pub use provider::{Provider, ProviderContext};
pub use resource::Resource;
pub use selector::{ProviderSelector, DEFAULT_PROVIDER};
