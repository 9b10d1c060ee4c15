//! Per-component results and the application-level report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use keel_provider::{ProviderError, ProviderKind};
use keel_render::RenderError;

use crate::lifecycle::{LifecycleState, Operation, Outcome};

/// Which failure a component ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingRequiredParameter,
    UnresolvedPlaceholder,
    UnknownProvider,
    MissingRequiredConfig,
    UnreadableConfig,
    BackendUnavailable,
    BackendInvocationFailed,
    InvalidArtifact,
    NoArtifacts,
    Runner,
    Io,
}

impl From<&RenderError> for FailureKind {
    fn from(err: &RenderError) -> Self {
        match err {
            RenderError::MissingRequiredParameter(_) => FailureKind::MissingRequiredParameter,
            RenderError::UnresolvedPlaceholder { .. } | RenderError::Pattern(_) => {
                FailureKind::UnresolvedPlaceholder
            }
        }
    }
}

impl From<&ProviderError> for FailureKind {
    fn from(err: &ProviderError) -> Self {
        match err {
            ProviderError::UnknownProvider(_) => FailureKind::UnknownProvider,
            ProviderError::MissingRequiredConfig { .. } => FailureKind::MissingRequiredConfig,
            ProviderError::UnreadableConfig { .. } => FailureKind::UnreadableConfig,
            ProviderError::BackendUnavailable { .. } => FailureKind::BackendUnavailable,
            ProviderError::BackendInvocationFailed { .. } => FailureKind::BackendInvocationFailed,
            ProviderError::InvalidArtifact { .. } => FailureKind::InvalidArtifact,
            ProviderError::Runner(_) => FailureKind::Runner,
            ProviderError::Io(_) => FailureKind::Io,
        }
    }
}

/// Outcome of one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComponentOutcome {
    Success,
    Failed { kind: FailureKind, reason: String },
    Skipped { reason: String },
}

impl ComponentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ComponentOutcome::Success)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ComponentOutcome::Failed { .. })
    }
}

/// Result recorded for one component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentResult {
    pub component: String,
    pub outcome: ComponentOutcome,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ComponentResult {
    pub fn success(component: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            component: component.into(),
            outcome: ComponentOutcome::Success,
            started_at: Some(started_at),
            finished_at: Some(Utc::now()),
        }
    }

    pub fn failed(
        component: impl Into<String>,
        started_at: DateTime<Utc>,
        kind: FailureKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            outcome: ComponentOutcome::Failed {
                kind,
                reason: reason.into(),
            },
            started_at: Some(started_at),
            finished_at: Some(Utc::now()),
        }
    }

    pub fn skipped(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            outcome: ComponentOutcome::Skipped {
                reason: reason.into(),
            },
            started_at: None,
            finished_at: None,
        }
    }
}

/// The first failed component of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub component: String,
    pub provider: ProviderKind,
    pub kind: FailureKind,
    pub reason: String,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "component {} failed on provider {}: {}",
            self.component, self.provider, self.reason
        )
    }
}

/// Aggregated result of one operation over an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub id: Uuid,
    pub application: String,
    pub operation: Operation,
    pub provider: ProviderKind,
    pub state: LifecycleState,
    /// States passed through, in order
    pub transitions: Vec<LifecycleState>,
    pub results: Vec<ComponentResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl DeploymentReport {
    pub fn new(application: impl Into<String>, operation: Operation, provider: ProviderKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            application: application.into(),
            operation,
            provider,
            state: LifecycleState::Init,
            transitions: Vec::new(),
            results: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Success only if every component succeeded.
    pub fn success(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_success())
            && self.state != LifecycleState::Done(Outcome::Failed)
    }

    pub fn first_failure(&self) -> Option<Failure> {
        self.results.iter().find_map(|r| match &r.outcome {
            ComponentOutcome::Failed { kind, reason } => Some(Failure {
                component: r.component.clone(),
                provider: self.provider,
                kind: *kind,
                reason: reason.clone(),
            }),
            _ => None,
        })
    }

    pub fn get(&self, component: &str) -> Option<&ComponentResult> {
        self.results.iter().find(|r| r.component == component)
    }

    pub fn count(&self, predicate: impl Fn(&ComponentOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(&r.outcome)).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
