//! Install, run and stop commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::{debug, info};

use keel_core::{
    ComponentOutcome, Deployer, DeploymentReport, Operation, OrchestratorOptions, ANSWERS_FILE,
};
use keel_runner::{CliRunner, CliRunnerOptions, RunConfig};
use keel_spec::{Answers, ManifestReader};

use super::CliError;
use crate::ExitCodes;

#[derive(Args)]
pub struct DeployArgs {
    /// Application directory containing the Nulecule manifest
    #[arg(default_value = ".")]
    app: PathBuf,

    /// Answers file (TOML, or YAML/JSON by extension)
    #[arg(short, long)]
    answers: Option<PathBuf>,

    /// Provider to use instead of general.provider
    #[arg(short, long)]
    provider: Option<String>,

    /// Directory for staged artifacts (default: <app>/.workdir)
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// Log backend commands without executing them
    #[arg(long)]
    dry_run: bool,

    /// Continue with later components after a failure
    #[arg(long)]
    keep_going: bool,

    /// Timeout per backend command in seconds (0 = none)
    #[arg(long, default_value_t = 300)]
    timeout: u64,

    /// Print the deployment report as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(operation: Operation, args: DeployArgs, verbose: bool) -> Result<u8> {
    info!("{} {}", operation, args.app.display());

    let app = ManifestReader::load(&args.app)?;

    let mut runner_options = CliRunnerOptions::new();
    if args.dry_run {
        runner_options = runner_options.dry_run();
    }

    let mut deployer = Deployer::new(Arc::new(CliRunner::new(runner_options)))
        .run_config(RunConfig::default().timeout(args.timeout).stream_logs(verbose))
        .options(OrchestratorOptions::new().keep_going(args.keep_going));
    if let Some(provider) = &args.provider {
        deployer = deployer.provider(provider.clone());
    }
    if let Some(destination) = &args.destination {
        deployer = deployer.workdir(destination.clone());
    }

    let workdir = deployer.workdir_for(&args.app);
    let mut answers = load_answers(&args, &workdir, operation)?;
    answers.apply_env_overrides(std::env::vars());

    let kind = deployer.provider_kind(&answers).map_err(|e| match e {
        keel_core::CoreError::Provider(err) => anyhow::Error::from(CliError::Provider(err)),
        other => anyhow::Error::from(other),
    })?;
    answers.set_provider(kind.as_str());

    let report = deployer.deploy(operation, &app, &answers, &workdir).await?;

    if operation != Operation::Stop && !args.dry_run {
        let path = workdir.join(ANSWERS_FILE);
        answers.resolved_for(&app).save(&path)?;
        debug!("Persisted answers to {:?}", path);
    }

    print_report(&report, args.json)?;

    Ok(if report.success() {
        ExitCodes::SUCCESS
    } else {
        ExitCodes::DEPLOYMENT_FAILURE
    })
}

/// `--answers` wins; otherwise the answers persisted in the workdir (for
/// `stop`), then `<app>/answers.toml`, then empty answers.
fn load_answers(args: &DeployArgs, workdir: &Path, operation: Operation) -> Result<Answers> {
    let mut candidates = Vec::new();
    if operation == Operation::Stop {
        candidates.push(workdir.join(ANSWERS_FILE));
    }
    candidates.push(args.app.join(ANSWERS_FILE));

    let path = match &args.answers {
        Some(path) => path.clone(),
        None => match candidates.into_iter().find(|p| p.is_file()) {
            Some(path) => path,
            None => {
                debug!("No answers file found, using defaults");
                return Ok(Answers::new());
            }
        },
    };

    info!("Using answers from {}", path.display());
    Answers::load(&path).map_err(|source| CliError::Answers { path, source }.into())
}

fn print_report(report: &DeploymentReport, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    println!(
        "📦 {} {} on {}",
        report.operation, report.application, report.provider
    );
    for result in &report.results {
        match &result.outcome {
            ComponentOutcome::Success => println!("   ✅ {}", result.component),
            ComponentOutcome::Failed { reason, .. } => {
                println!("   ❌ {}: {}", result.component, reason)
            }
            ComponentOutcome::Skipped { reason } => {
                println!("   ⏭️  {} (skipped: {})", result.component, reason)
            }
        }
    }

    println!();
    match report.first_failure() {
        None if report.success() => println!("✅ {} completed", report.operation),
        None => println!("❌ {} did not complete", report.operation),
        Some(failure) => eprintln!("❌ {}", failure),
    }
    Ok(())
}
