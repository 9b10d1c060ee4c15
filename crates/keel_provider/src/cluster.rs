//! Manifest-driven lifecycle shared by the kubernetes and openshift providers.

use std::path::PathBuf;

use tracing::info;

use keel_render::RenderedArtifact;
use keel_runner::Invocation;

use crate::config::ProviderKind;
use crate::error::ProviderResult;
use crate::provider::ProviderContext;
use crate::resource::{sort_for_run, Resource};

/// Drives `kubectl` or `oc` with a fixed set of global flags.
pub struct ClusterCli {
    kind: ProviderKind,
    context: ProviderContext,
    global_flags: Vec<String>,
}

impl ClusterCli {
    pub fn new(kind: ProviderKind, context: ProviderContext, global_flags: Vec<String>) -> Self {
        Self {
            kind,
            context,
            global_flags,
        }
    }

    pub fn global_flags(&self) -> &[String] {
        &self.global_flags
    }

    fn invocation<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new(self.kind.program())
            .args(args)
            .args(self.global_flags.iter().cloned())
    }

    /// Stage manifests and parse them, keeping the staged path of each.
    pub fn stage(&self, component: &str, manifests: &[RenderedArtifact]) -> ProviderResult<Vec<(Resource, PathBuf)>> {
        let resources = manifests
            .iter()
            .map(|m| Resource::parse(&m.name, &m.content))
            .collect::<ProviderResult<Vec<_>>>()?;
        let paths = self.context.stage(self.kind, component, manifests)?;
        Ok(resources.into_iter().zip(paths).collect())
    }

    /// One `create -f` per manifest, services first.
    pub async fn create(&self, component: &str, manifests: &[RenderedArtifact]) -> ProviderResult<()> {
        let mut staged = self.stage(component, manifests)?;
        staged.sort_by_key(|(resource, _)| resource.rank());

        for (resource, path) in &staged {
            info!("Creating {} {} for {}", resource.kind, resource.name, component);
            let invocation = self.invocation(["create".to_string(), "-f".to_string(), path.display().to_string()]);
            self.context.invoke(self.kind, invocation).await?;
        }
        Ok(())
    }

    /// Reverse of `create`: controllers are scaled to zero before deletion.
    pub async fn delete(&self, component: &str, manifests: &[RenderedArtifact]) -> ProviderResult<()> {
        let mut resources = manifests
            .iter()
            .map(|m| Resource::parse(&m.name, &m.content))
            .collect::<ProviderResult<Vec<_>>>()?;
        sort_for_run(&mut resources);

        for resource in resources.iter().rev() {
            if resource.is_replication_controller() {
                info!("Scaling replication controller {} to zero", resource.name);
                let scale = self.invocation(["scale", "rc", resource.name.as_str(), "--replicas=0"]);
                self.context.invoke(self.kind, scale).await?;
            }

            info!("Deleting {} {} for {}", resource.kind, resource.name, component);
            let delete = self.invocation(["delete".to_string(), resource.cli_kind(), resource.name.clone()]);
            self.context.invoke(self.kind, delete).await?;
        }
        Ok(())
    }
}
