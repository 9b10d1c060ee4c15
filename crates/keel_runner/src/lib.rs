//! # keel_runner
//!
//! Backend command execution wrapper for keel.
//!
//! Every provider drives its backend (docker daemon, kubernetes cluster,
//! OpenShift cluster) through that backend's own command-line tool. This
//! crate owns that boundary.
//!
//! # Features
//!
//! - **CLI Runner**: spawns `docker`, `kubectl`, `oc` with timeout handling
//! - **Dry-Run Mode**: log command lines without executing them
//! - **CI Integration**: timestamped log formatting when `CI` is set
//! - **Mock Runner**: captures invocations for tests without any backend
//!
//! # Example
//!
//! ```rust,no_run
//! use keel_runner::{CliRunner, CliRunnerOptions, CommandRunner, Invocation, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = CliRunner::new(CliRunnerOptions::default());
//!
//!     let invocation = Invocation::new("kubectl")
//!         .arg("create")
//!         .arg("-f")
//!         .arg("service.json")
//!         .arg("--namespace=default");
//!
//!     let result = runner.run(&invocation, &RunConfig::default()).await?;
//!     println!("Exit code: {}", result.exit_code);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod mock;
pub mod runner;

pub use cli::{CliRunner, CliRunnerOptions};
pub use config::{Invocation, RunConfig};
pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedCall, MockResponse, MockRunner};
pub use runner::{CommandRunner, ExecutionResult};
