//! Top-level deployment entry point.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use keel_provider::{ProviderContext, ProviderKind, ProviderSelector, DEFAULT_PROVIDER};
use keel_runner::{CommandRunner, RunConfig};
use keel_spec::{Answers, Application};

use crate::error::CoreResult;
use crate::lifecycle::Operation;
use crate::orchestrator::{LifecycleOrchestrator, OrchestratorOptions};
use crate::result::DeploymentReport;

/// Directory under the application holding staged artifacts.
pub const WORKDIR_NAME: &str = ".workdir";

/// Answers persisted next to the staged artifacts.
pub const ANSWERS_FILE: &str = "answers.toml";

/// Sample answers written by `genanswers`.
pub const SAMPLE_ANSWERS_FILE: &str = "answers.toml.sample";

/// Selects the provider from answers and runs the orchestrator.
pub struct Deployer {
    runner: Arc<dyn CommandRunner>,
    run_config: RunConfig,
    options: OrchestratorOptions,
    provider_override: Option<String>,
    workdir: Option<PathBuf>,
}

impl Deployer {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            run_config: RunConfig::default(),
            options: OrchestratorOptions::default(),
            provider_override: None,
            workdir: None,
        }
    }

    pub fn run_config(mut self, run_config: RunConfig) -> Self {
        self.run_config = run_config;
        self
    }

    pub fn options(mut self, options: OrchestratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Use this provider regardless of `general.provider`.
    pub fn provider(mut self, name: impl Into<String>) -> Self {
        self.provider_override = Some(name.into());
        self
    }

    pub fn workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Provider name to select: override, then answers, then the default.
    pub fn provider_name(&self, answers: &Answers) -> String {
        self.provider_override
            .clone()
            .or_else(|| answers.provider().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string())
    }

    pub fn workdir_for(&self, app_dir: &Path) -> PathBuf {
        self.workdir
            .clone()
            .unwrap_or_else(|| app_dir.join(WORKDIR_NAME))
    }

    /// Select and validate the provider, then execute `operation`.
    ///
    /// Selection errors, and a missing backend CLI for `run` or `stop`,
    /// abort before any component is processed and are returned as `Err`;
    /// component failures are recorded in the report.
    pub async fn deploy(
        &self,
        operation: Operation,
        app: &Application,
        answers: &Answers,
        workdir: &Path,
    ) -> CoreResult<DeploymentReport> {
        let name = self.provider_name(answers);
        info!("Deploying {} with provider {}", app.id, name);

        let context = ProviderContext::new(self.runner.clone(), workdir)
            .with_run_config(self.run_config.clone());
        let provider = ProviderSelector::select(&name, &answers.general(), context.clone())?;
        if operation != Operation::Install {
            context.ensure_available(provider.kind()).await?;
        }

        let orchestrator = LifecycleOrchestrator::new(provider, answers.clone()).with_options(self.options);
        Ok(orchestrator.execute(operation, app).await)
    }

    /// Resolve the provider kind without validating its configuration.
    pub fn provider_kind(&self, answers: &Answers) -> CoreResult<ProviderKind> {
        Ok(self.provider_name(answers).parse()?)
    }
}
