//! Lifecycle orchestration.
//!
//! Components are processed one at a time in manifest order: resolve the
//! parameters, render the artifacts for the selected provider, then hand
//! them to the provider. Component N+1 is not touched before the result of
//! component N is recorded.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use keel_provider::Provider;
use keel_render::{ParameterResolver, RenderError, RenderedArtifact, TemplateRenderer};
use keel_spec::{Answers, Application, Component};

use crate::lifecycle::{Lifecycle, LifecycleState, Operation, Outcome};
use crate::result::{ComponentResult, DeploymentReport, FailureKind};

/// Knobs for one orchestration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorOptions {
    /// Continue with later components after a failure
    pub keep_going: bool,
}

impl OrchestratorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }
}

/// Sequences resolve, render and invoke across an application.
///
/// Owns the selected provider for the duration of one operation.
pub struct LifecycleOrchestrator {
    provider: Box<dyn Provider>,
    answers: Answers,
    options: OrchestratorOptions,
}

impl LifecycleOrchestrator {
    pub fn new(provider: Box<dyn Provider>, answers: Answers) -> Self {
        Self {
            provider,
            answers,
            options: OrchestratorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: OrchestratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    /// Execute `operation` over every component of `app`.
    pub async fn execute(&self, operation: Operation, app: &Application) -> DeploymentReport {
        let kind = self.provider.kind();
        let mut report = DeploymentReport::new(&app.id, operation, kind);
        let mut lifecycle = Lifecycle::new();

        info!(
            "Starting {} of {} ({} components) on {}",
            operation,
            app.id,
            app.components.len(),
            kind
        );

        let renderer = match TemplateRenderer::new(self.provider.syntax()) {
            Ok(renderer) => renderer,
            Err(e) => {
                error!("Cannot build renderer: {}", e);
                for component in &app.components {
                    report
                        .results
                        .push(ComponentResult::skipped(&component.name, e.to_string()));
                }
                return Self::finish(report, lifecycle, Outcome::Failed);
            }
        };

        let mut failed: Option<String> = None;

        for component in &app.components {
            if let Some(previous) = &failed {
                if !self.options.keep_going {
                    info!("Skipping {}", component.name);
                    report.results.push(ComponentResult::skipped(
                        &component.name,
                        format!("component {} failed", previous),
                    ));
                    continue;
                }
            }

            let result = self
                .process(operation, component, &renderer, &mut lifecycle)
                .await;

            if result.outcome.is_failed() && failed.is_none() {
                failed = Some(component.name.clone());
            }
            report.results.push(result);
        }

        let outcome = if failed.is_none() {
            Outcome::Success
        } else {
            Outcome::Failed
        };
        Self::finish(report, lifecycle, outcome)
    }

    fn finish(mut report: DeploymentReport, mut lifecycle: Lifecycle, outcome: Outcome) -> DeploymentReport {
        lifecycle.finish(outcome);
        report.state = lifecycle.state();
        report.transitions = lifecycle.history().to_vec();
        report.finished_at = Some(Utc::now());

        match outcome {
            Outcome::Success => info!("{} of {} succeeded", report.operation, report.application),
            Outcome::Failed => error!("{} of {} failed", report.operation, report.application),
        }
        report
    }

    async fn process(
        &self,
        operation: Operation,
        component: &Component,
        renderer: &TemplateRenderer,
        lifecycle: &mut Lifecycle,
    ) -> ComponentResult {
        let started_at = Utc::now();
        let name = component.name.as_str();
        let kind = self.provider.kind();

        lifecycle.advance(LifecycleState::Resolving);
        info!("Resolving parameters for {}", name);
        let params = match ParameterResolver::resolve(&component.params, &self.answers.for_component(name)) {
            Ok(params) => params,
            Err(e) => return render_failure(name, started_at, &e),
        };

        lifecycle.advance(LifecycleState::Rendering);
        let artifacts: Vec<_> = component.artifacts_for(kind.as_str()).collect();
        if artifacts.is_empty() {
            warn!("{} has no artifacts for {}", name, kind);
            return ComponentResult::failed(
                name,
                started_at,
                FailureKind::NoArtifacts,
                format!("no artifacts for provider {}", kind),
            );
        }

        let rendered = match artifacts
            .into_iter()
            .map(|artifact| renderer.render_artifact(artifact, &params))
            .collect::<Result<Vec<RenderedArtifact>, RenderError>>()
        {
            Ok(rendered) => rendered,
            Err(e) => return render_failure(name, started_at, &e),
        };
        info!("Rendered {} artifacts for {}", rendered.len(), name);

        lifecycle.advance(LifecycleState::Invoking);
        let invoked = match operation {
            Operation::Install => self.provider.install(name, &rendered).await,
            Operation::Run => self.provider.run(name, &rendered).await,
            Operation::Stop => self.provider.stop(name, &rendered).await,
        };

        match invoked {
            Ok(()) => {
                info!("{} {} on {}", operation, name, kind);
                ComponentResult::success(name, started_at)
            }
            Err(e) => {
                error!("{} of {} failed on {}: {}", operation, name, kind, e);
                ComponentResult::failed(name, started_at, FailureKind::from(&e), e.to_string())
            }
        }
    }
}

fn render_failure(component: &str, started_at: DateTime<Utc>, err: &RenderError) -> ComponentResult {
    error!("Cannot prepare {}: {}", component, err);
    ComponentResult::failed(component, started_at, FailureKind::from(err), err.to_string())
}
