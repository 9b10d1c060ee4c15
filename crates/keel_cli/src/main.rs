//! keel CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Deployment failure (a component failed)
//! - 2: Invalid arguments, configuration or unknown provider
//! - 3: Manifest error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, CliError, Commands};
use keel_core::{CoreError, Operation};
use keel_provider::ProviderError;
use keel_spec::SpecError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const DEPLOYMENT_FAILURE: u8 = 1;
    pub const INVALID_CONFIG: u8 = 2;
    pub const MANIFEST_ERROR: u8 = 3;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Install(args) => commands::deploy::execute(Operation::Install, args, cli.verbose).await,
        Commands::Run(args) => commands::deploy::execute(Operation::Run, args, cli.verbose).await,
        Commands::Stop(args) => commands::deploy::execute(Operation::Stop, args, cli.verbose).await,
        Commands::Genanswers(args) => commands::genanswers::execute(args).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(categorize_error(&e))
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    // RUST_LOG applies unless a flag asks for a level explicitly.
    let filter = if verbose {
        EnvFilter::new("keel=debug,warn")
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keel=info,warn"))
    };

    // Logging may already be initialized; keep going either way.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Map an error to its exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    if e.downcast_ref::<CliError>().is_some() {
        return ExitCodes::INVALID_CONFIG;
    }
    if let Some(core) = e.downcast_ref::<CoreError>() {
        return match core {
            CoreError::Spec(_) => ExitCodes::MANIFEST_ERROR,
            CoreError::Provider(_) => ExitCodes::INVALID_CONFIG,
            _ => ExitCodes::DEPLOYMENT_FAILURE,
        };
    }
    if e.downcast_ref::<SpecError>().is_some() {
        return ExitCodes::MANIFEST_ERROR;
    }
    if e.downcast_ref::<ProviderError>().is_some() {
        return ExitCodes::INVALID_CONFIG;
    }
    ExitCodes::DEPLOYMENT_FAILURE
}
