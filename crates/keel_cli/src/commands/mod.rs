//! CLI command definitions.
//!
//! `install`, `run` and `stop` map one to one onto lifecycle operations;
//! `genanswers` writes a sample answers file for an application.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

pub mod deploy;
pub mod genanswers;

/// keel - deploy Nulecule applications to docker, kubernetes or openshift
#[derive(Parser)]
#[command(name = "keel")]
#[command(version, about = "keel - deploy packaged applications through docker, kubectl or oc")]
#[command(long_about = r#"
keel deploys an application described by a Nulecule manifest onto one of
three providers, driving each through its own command-line tool.

COMMANDS:
  install     → Render and stage artifacts without starting anything
  run         → Render, stage and start every component
  stop        → Stop what run started, from manifest and answers
  genanswers  → Write a sample answers file for an application

EXIT CODES:
  0 - Success
  1 - Deployment failure
  2 - Invalid arguments or configuration
  3 - Manifest error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render and stage artifacts
    Install(deploy::DeployArgs),

    /// Start the application
    Run(deploy::DeployArgs),

    /// Stop the application
    Stop(deploy::DeployArgs),

    /// Generate a sample answers file
    Genanswers(genanswers::GenanswersArgs),
}

/// Errors in user-supplied configuration detected by the CLI itself.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Cannot load answers from {path:?}: {source}")]
    Answers {
        path: PathBuf,
        source: keel_spec::SpecError,
    },

    #[error("Invalid provider: {0}")]
    Provider(#[from] keel_provider::ProviderError),
}
