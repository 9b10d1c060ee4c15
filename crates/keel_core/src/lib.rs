//! # keel_core
//!
//! Lifecycle orchestration for keel.
//!
//! This crate sequences parameter resolution, artifact rendering and
//! provider invocation across the components of an application:
//!
//! - **Orchestrator**: processes components strictly in manifest order
//! - **Lifecycle**: `Init → Resolving → Rendering → Invoking → Done`
//! - **Report**: per-component outcomes and the application-level result
//! - **Deployer**: selects the provider from answers and runs the orchestrator
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use keel_core::{Deployer, Operation};
//! use keel_runner::{CliRunner, CliRunnerOptions};
//! use keel_spec::{Answers, ManifestReader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let deployer = Deployer::new(Arc::new(CliRunner::new(CliRunnerOptions::default())));
//!     let app_dir = Path::new("helloapache");
//!     let app = ManifestReader::load(app_dir)?;
//!     let answers = Answers::load(&app_dir.join("answers.toml"))?;
//!
//!     let report = deployer
//!         .deploy(Operation::Run, &app, &answers, &deployer.workdir_for(app_dir))
//!         .await?;
//!     println!("success: {}", report.success());
//!     Ok(())
//! }
//! ```

pub mod deployer;
pub mod error;
pub mod lifecycle;
pub mod orchestrator;
pub mod result;

pub use deployer::{Deployer, ANSWERS_FILE, SAMPLE_ANSWERS_FILE, WORKDIR_NAME};
pub use error::{CoreError, CoreResult};
pub use lifecycle::{Lifecycle, LifecycleState, Operation, Outcome};
pub use orchestrator::{LifecycleOrchestrator, OrchestratorOptions};
pub use result::{ComponentOutcome, ComponentResult, DeploymentReport, Failure, FailureKind};
