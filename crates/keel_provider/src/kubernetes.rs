//! Kubernetes provider.

use async_trait::async_trait;
use tracing::info;

use keel_render::RenderedArtifact;

use crate::cluster::ClusterCli;
use crate::config::{ProviderConfig, ProviderKind, PROVIDER_CONFIG_KEY};
use crate::error::ProviderResult;
use crate::provider::{Provider, ProviderContext};

/// Provider submitting resource manifests with `kubectl`, scoped to the
/// configured namespace.
pub struct KubernetesProvider {
    config: ProviderConfig,
    cli: ClusterCli,
}

impl KubernetesProvider {
    pub fn new(config: ProviderConfig, context: ProviderContext) -> Self {
        let mut flags = vec![format!("--namespace={}", config.namespace())];
        if let Some(path) = config.get(PROVIDER_CONFIG_KEY) {
            flags.push(format!("--kubeconfig={}", path));
        }

        Self {
            cli: ClusterCli::new(ProviderKind::Kubernetes, context, flags),
            config,
        }
    }
}

#[async_trait]
impl Provider for KubernetesProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Kubernetes
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn validate_config(&self) -> ProviderResult<()> {
        self.config.validate()
    }

    async fn install(&self, component: &str, artifacts: &[RenderedArtifact]) -> ProviderResult<()> {
        let staged = self.cli.stage(component, artifacts)?;
        info!("Staged {} manifests for {}", staged.len(), component);
        Ok(())
    }

    async fn run(&self, component: &str, artifacts: &[RenderedArtifact]) -> ProviderResult<()> {
        self.cli.create(component, artifacts).await
    }

    async fn stop(&self, component: &str, artifacts: &[RenderedArtifact]) -> ProviderResult<()> {
        self.cli.delete(component, artifacts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use keel_runner::MockRunner;

    const SERVICE: &str = r#"{"kind": "Service", "metadata": {"name": "db"}}"#;
    const RC: &str = "kind: ReplicationController\nmetadata:\n  name: db\n";
    const POD: &str = r#"{"kind": "Pod", "metadata": {"name": "web"}}"#;

    fn artifacts() -> Vec<RenderedArtifact> {
        vec![
            RenderedArtifact::new("pod.json", POD),
            RenderedArtifact::new("rc.yaml", RC),
            RenderedArtifact::new("svc.json", SERVICE),
        ]
    }

    fn provider(mock: &MockRunner, workdir: &std::path::Path, general: BTreeMap<String, String>) -> KubernetesProvider {
        KubernetesProvider::new(
            ProviderConfig::new(ProviderKind::Kubernetes, &general),
            ProviderContext::new(Arc::new(mock.clone()), workdir),
        )
    }

    #[tokio::test]
    async fn test_run_creates_services_first() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockRunner::new();
        let kubernetes = provider(&mock, dir.path(), BTreeMap::new());

        kubernetes.run("db", &artifacts()).await.unwrap();

        let calls = mock.calls_to("kubectl");
        assert_eq!(calls.len(), 3);
        let files: Vec<_> = calls.iter().map(|c| c.args[2].clone()).collect();
        let staged = dir.path().join("kubernetes").join("db");
        assert_eq!(
            files,
            vec![
                staged.join("svc.json").display().to_string(),
                staged.join("rc.yaml").display().to_string(),
                staged.join("pod.json").display().to_string(),
            ]
        );
        assert!(calls.iter().all(|c| c.has_arg("--namespace=default")));
    }

    #[tokio::test]
    async fn test_run_submits_each_same_named_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockRunner::new();
        let kubernetes = provider(&mock, dir.path(), BTreeMap::new());

        let artifacts = vec![
            RenderedArtifact::new("pod.json", r#"{"kind": "Service", "metadata": {"name": "svc"}}"#),
            RenderedArtifact::new("pod.json", r#"{"kind": "Pod", "metadata": {"name": "pod"}}"#),
        ];
        kubernetes.run("web", &artifacts).await.unwrap();

        let calls = mock.calls_to("kubectl");
        assert_eq!(calls.len(), 2);
        let submitted: Vec<_> = calls
            .iter()
            .map(|c| std::fs::read_to_string(&c.args[2]).unwrap())
            .collect();
        assert!(submitted[0].contains("Service"));
        assert!(submitted[1].contains("Pod"));
        assert_ne!(calls[0].args[2], calls[1].args[2]);
    }

    #[tokio::test]
    async fn test_stop_scales_then_deletes_in_reverse() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockRunner::new();
        let mut general = BTreeMap::new();
        general.insert("namespace".to_string(), "prod".to_string());
        let kubernetes = provider(&mock, dir.path(), general);

        kubernetes.stop("db", &artifacts()).await.unwrap();

        let lines: Vec<_> = mock.get_calls().iter().map(|c| c.command_line()).collect();
        assert_eq!(
            lines,
            vec![
                "kubectl delete pod web --namespace=prod",
                "kubectl scale rc db --replicas=0 --namespace=prod",
                "kubectl delete replicationcontroller db --namespace=prod",
                "kubectl delete service db --namespace=prod",
            ]
        );
    }

    #[tokio::test]
    async fn test_install_stages_without_invoking() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockRunner::new();
        let kubernetes = provider(&mock, dir.path(), BTreeMap::new());

        kubernetes.install("db", &artifacts()).await.unwrap();

        assert_eq!(mock.call_count(), 0);
        assert!(dir.path().join("kubernetes/db/rc.yaml").is_file());
    }
}
