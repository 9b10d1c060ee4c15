//! Genanswers command - write a sample answers file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use keel_core::SAMPLE_ANSWERS_FILE;
use keel_provider::{ProviderKind, DEFAULT_PROVIDER};
use keel_spec::{Answers, ManifestReader};

use super::CliError;
use crate::ExitCodes;

#[derive(Args)]
pub struct GenanswersArgs {
    /// Application directory containing the Nulecule manifest
    #[arg(default_value = ".")]
    app: PathBuf,

    /// Provider recorded in the sample
    #[arg(short, long)]
    provider: Option<String>,

    /// Output path (default: <app>/answers.toml.sample)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn execute(args: GenanswersArgs) -> Result<u8> {
    let kind = match &args.provider {
        Some(name) => name.parse::<ProviderKind>().map_err(CliError::Provider)?,
        None => DEFAULT_PROVIDER,
    };

    let app = ManifestReader::load(&args.app)?;
    let sample = Answers::sample_for(&app, kind.as_str());

    let output = args
        .output
        .unwrap_or_else(|| args.app.join(SAMPLE_ANSWERS_FILE));
    sample.save(&output)?;

    info!("Wrote sample answers for {} to {:?}", app.id, output);
    println!("✅ Sample answers written to {}", output.display());
    Ok(ExitCodes::SUCCESS)
}
