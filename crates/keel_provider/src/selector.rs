//! Provider selection.

use std::collections::BTreeMap;

use tracing::info;

use crate::config::{ProviderConfig, ProviderKind};
use crate::docker::DockerProvider;
use crate::error::ProviderResult;
use crate::kubernetes::KubernetesProvider;
use crate::openshift::OpenShiftProvider;
use crate::provider::{Provider, ProviderContext};

/// Provider used when the answers do not name one.
pub const DEFAULT_PROVIDER: ProviderKind = ProviderKind::Kubernetes;

/// Looks up providers in the fixed registry of known backends.
pub struct ProviderSelector;

impl ProviderSelector {
    /// Select a provider by name and validate its configuration.
    ///
    /// Unknown names are an error; there is no fallback provider.
    pub fn select(
        name: &str,
        settings: &BTreeMap<String, String>,
        context: ProviderContext,
    ) -> ProviderResult<Box<dyn Provider>> {
        let kind: ProviderKind = name.parse()?;
        Self::select_kind(kind, settings, context)
    }

    pub fn select_kind(
        kind: ProviderKind,
        settings: &BTreeMap<String, String>,
        context: ProviderContext,
    ) -> ProviderResult<Box<dyn Provider>> {
        let config = ProviderConfig::new(kind, settings);

        let provider: Box<dyn Provider> = match kind {
            ProviderKind::Docker => Box::new(DockerProvider::new(config, context)),
            ProviderKind::Kubernetes => Box::new(KubernetesProvider::new(config, context)),
            ProviderKind::Openshift => Box::new(OpenShiftProvider::new(config, context)),
        };

        provider.validate_config()?;
        info!(
            "Selected provider {} (namespace {})",
            kind,
            provider.config().namespace()
        );
        Ok(provider)
    }
}
