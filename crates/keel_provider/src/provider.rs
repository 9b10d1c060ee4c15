//! The provider contract shared by every backend.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use keel_render::{PlaceholderSyntax, RenderedArtifact};
use keel_runner::{CommandRunner, ExecutionResult, Invocation, RunConfig};

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::{ProviderError, ProviderResult};

/// Everything a provider needs besides its configuration.
#[derive(Clone)]
pub struct ProviderContext {
    /// Handle used for every backend command
    pub runner: Arc<dyn CommandRunner>,
    /// Root directory for staged artifacts
    pub workdir: PathBuf,
    /// Per-invocation settings (timeout, log streaming)
    pub run_config: RunConfig,
}

impl ProviderContext {
    pub fn new(runner: Arc<dyn CommandRunner>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            workdir: workdir.into(),
            run_config: RunConfig::default(),
        }
    }

    pub fn with_run_config(mut self, run_config: RunConfig) -> Self {
        self.run_config = run_config;
        self
    }

    /// Directory holding the staged artifacts of one component.
    pub fn component_dir(&self, kind: ProviderKind, component: &str) -> PathBuf {
        self.workdir.join(kind.as_str()).join(component)
    }

    /// Write artifacts to `<workdir>/<provider>/<component>/<name>`.
    ///
    /// Returns one path per artifact, in order. A name already taken within
    /// the component gets its position as prefix (`01-pod.json`).
    pub fn stage(
        &self,
        kind: ProviderKind,
        component: &str,
        artifacts: &[RenderedArtifact],
    ) -> ProviderResult<Vec<PathBuf>> {
        let dir = self.component_dir(kind, component);
        fs::create_dir_all(&dir)?;

        let mut taken = HashSet::new();
        let mut paths = Vec::with_capacity(artifacts.len());
        for (index, artifact) in artifacts.iter().enumerate() {
            let base = file_name(&artifact.name);
            let mut name = base.clone();
            let mut attempt = index;
            while !taken.insert(name.clone()) {
                name = format!("{:02}-{}", attempt, base);
                attempt += 1;
            }

            let path = dir.join(&name);
            fs::write(&path, &artifact.content)?;
            debug!("Staged {} at {:?}", artifact.name, path);
            paths.push(path);
        }
        Ok(paths)
    }

    /// Fail unless the backend CLI of `kind` can be executed.
    pub async fn ensure_available(&self, kind: ProviderKind) -> ProviderResult<()> {
        if self.runner.is_available(kind.program()).await {
            return Ok(());
        }
        error!("{} not found for provider {}", kind.program(), kind);
        Err(ProviderError::BackendUnavailable {
            provider: kind.to_string(),
            program: kind.program().to_string(),
        })
    }

    /// Run a backend command; a non-zero exit becomes `BackendInvocationFailed`.
    pub async fn invoke(&self, kind: ProviderKind, invocation: Invocation) -> ProviderResult<ExecutionResult> {
        debug!("Invoking: {}", invocation.command_line());
        let result = self.runner.run(&invocation, &self.run_config).await?;

        if !result.success() {
            error!(
                "{} exited with code {}: {}",
                result.command,
                result.exit_code,
                result.combined_output().trim()
            );
            return Err(ProviderError::BackendInvocationFailed {
                provider: kind.to_string(),
                command: result.command,
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }

        Ok(result)
    }
}

impl std::fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderContext")
            .field("workdir", &self.workdir)
            .field("run_config", &self.run_config)
            .finish()
    }
}

/// Artifact names come from the manifest; keep only the final path segment.
fn file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.replace(['/', '\\'], "_"))
}

/// A backend-specific implementation of the install/run/stop lifecycle.
///
/// Providers are stateless between operations: `stop` works from the same
/// rendered artifacts `run` received, never from memory of an earlier run.
/// Artifacts without provider affinity must be accepted.
///
/// # Example
///
/// ```rust,ignore
/// let provider = ProviderSelector::select("docker", &general, context)?;
/// provider.run("helloapache", &rendered).await?;
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn config(&self) -> &ProviderConfig;

    /// Placeholder syntax artifacts for this provider are rendered with.
    fn syntax(&self) -> PlaceholderSyntax {
        self.kind().placeholder_syntax()
    }

    /// Check the configuration; called once by the selector.
    fn validate_config(&self) -> ProviderResult<()>;

    /// Stage artifacts for later execution.
    async fn install(&self, component: &str, artifacts: &[RenderedArtifact]) -> ProviderResult<()>;

    /// Start the component. Running twice may create duplicates.
    async fn run(&self, component: &str, artifacts: &[RenderedArtifact]) -> ProviderResult<()>;

    /// Undo `run`, matching what to stop by name.
    async fn stop(&self, component: &str, artifacts: &[RenderedArtifact]) -> ProviderResult<()>;
}
