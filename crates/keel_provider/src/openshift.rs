//! OpenShift provider.
//!
//! Works like the kubernetes provider through `oc`, authenticated with the
//! required `openshiftconfig` file. Artifacts of kind `Template` are
//! expanded: every entry of `objects` is staged and created on its own.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use keel_render::RenderedArtifact;

use crate::cluster::ClusterCli;
use crate::config::{ProviderConfig, ProviderKind, OPENSHIFT_CONFIG_KEY};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{Provider, ProviderContext};
use crate::resource::Resource;

pub struct OpenShiftProvider {
    config: ProviderConfig,
    cli: ClusterCli,
}

impl OpenShiftProvider {
    pub fn new(config: ProviderConfig, context: ProviderContext) -> Self {
        let mut flags = Vec::new();
        if let Some(path) = config.get(OPENSHIFT_CONFIG_KEY) {
            flags.push(format!("--config={}", path));
        }
        flags.push(format!("--namespace={}", config.namespace()));

        Self {
            cli: ClusterCli::new(ProviderKind::Openshift, context, flags),
            config,
        }
    }

    /// Replace every template by its objects; other manifests pass through.
    pub fn expand_templates(artifacts: &[RenderedArtifact]) -> ProviderResult<Vec<RenderedArtifact>> {
        let mut expanded = Vec::with_capacity(artifacts.len());

        for artifact in artifacts {
            let resource = Resource::parse(&artifact.name, &artifact.content)?;
            if !resource.is_kind("Template") {
                expanded.push(artifact.clone());
                continue;
            }

            let objects = resource
                .document
                .get("objects")
                .and_then(Value::as_array)
                .filter(|objects| !objects.is_empty())
                .ok_or_else(|| ProviderError::invalid_artifact(&artifact.name, "template has no objects"))?;

            let stem = Path::new(&artifact.name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| artifact.name.clone());

            debug!("Expanding template {} into {} objects", resource.name, objects.len());
            for (index, object) in objects.iter().enumerate() {
                let content = serde_json::to_string_pretty(object)
                    .map_err(|e| ProviderError::invalid_artifact(&artifact.name, e.to_string()))?;
                expanded.push(RenderedArtifact {
                    name: format!("{}-{}.json", stem, index),
                    content,
                    provider: artifact.provider.clone(),
                });
            }
        }

        Ok(expanded)
    }
}

#[async_trait]
impl Provider for OpenShiftProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Openshift
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn validate_config(&self) -> ProviderResult<()> {
        self.config.validate()
    }

    async fn install(&self, component: &str, artifacts: &[RenderedArtifact]) -> ProviderResult<()> {
        let manifests = Self::expand_templates(artifacts)?;
        self.cli.stage(component, &manifests)?;
        Ok(())
    }

    async fn run(&self, component: &str, artifacts: &[RenderedArtifact]) -> ProviderResult<()> {
        let manifests = Self::expand_templates(artifacts)?;
        self.cli.create(component, &manifests).await
    }

    async fn stop(&self, component: &str, artifacts: &[RenderedArtifact]) -> ProviderResult<()> {
        let manifests = Self::expand_templates(artifacts)?;
        self.cli.delete(component, &manifests).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use keel_runner::MockRunner;

    const TEMPLATE: &str = r#"{
  "kind": "Template",
  "metadata": {"name": "mariadb"},
  "objects": [
    {"kind": "Pod", "metadata": {"name": "mariadb"}},
    {"kind": "Service", "metadata": {"name": "mariadb"}}
  ]
}"#;

    #[test]
    fn test_expand_templates() {
        let artifacts = vec![
            RenderedArtifact::new("template.json", TEMPLATE),
            RenderedArtifact::new("route.yaml", "kind: Route\nmetadata:\n  name: web\n"),
        ];

        let expanded = OpenShiftProvider::expand_templates(&artifacts).unwrap();
        let names: Vec<_> = expanded.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["template-0.json", "template-1.json", "route.yaml"]);
        assert!(expanded[1].content.contains("Service"));
    }

    #[test]
    fn test_empty_template_is_invalid() {
        let artifacts = vec![RenderedArtifact::new(
            "t.json",
            r#"{"kind": "Template", "metadata": {"name": "t"}, "objects": []}"#,
        )];
        assert!(matches!(
            OpenShiftProvider::expand_templates(&artifacts),
            Err(ProviderError::InvalidArtifact { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_uses_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockRunner::new();
        let mut general = BTreeMap::new();
        general.insert(OPENSHIFT_CONFIG_KEY.to_string(), "/etc/origin/admin.kubeconfig".to_string());

        let openshift = OpenShiftProvider::new(
            ProviderConfig::new(ProviderKind::Openshift, &general),
            ProviderContext::new(Arc::new(mock.clone()), dir.path()),
        );

        openshift
            .run("mariadb", &[RenderedArtifact::new("template.json", TEMPLATE)])
            .await
            .unwrap();

        let calls = mock.calls_to("oc");
        assert_eq!(calls.len(), 2);
        assert!(calls[0].args[2].ends_with("template-1.json"));
        assert!(calls
            .iter()
            .all(|c| c.has_arg("--config=/etc/origin/admin.kubeconfig") && c.has_arg("--namespace=default")));
    }
}
