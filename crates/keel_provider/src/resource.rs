//! Cluster resource manifests.

use serde_json::Value;

use crate::error::{ProviderError, ProviderResult};

/// A parsed resource manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Name of the artifact the manifest came from
    pub artifact: String,
    pub kind: String,
    pub name: String,
    pub document: Value,
}

impl Resource {
    /// Parse a JSON or YAML manifest and read `kind` and `metadata.name`.
    pub fn parse(artifact: &str, content: &str) -> ProviderResult<Self> {
        let document = parse_document(artifact, content)?;
        Self::from_document(artifact, document)
    }

    pub fn from_document(artifact: &str, document: Value) -> ProviderResult<Self> {
        let kind = document
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::invalid_artifact(artifact, "missing 'kind'"))?
            .to_string();
        let name = document
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::invalid_artifact(artifact, "missing 'metadata.name'"))?
            .to_string();

        Ok(Self {
            artifact: artifact.to_string(),
            kind,
            name,
            document,
        })
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind.eq_ignore_ascii_case(kind)
    }

    pub fn is_replication_controller(&self) -> bool {
        self.is_kind("ReplicationController")
    }

    /// Submission rank: services first, then controllers, then pods.
    pub fn rank(&self) -> u8 {
        match self.kind.to_ascii_lowercase().as_str() {
            "service" => 0,
            "replicationcontroller" | "deployment" | "deploymentconfig" => 1,
            "pod" => 2,
            _ => 3,
        }
    }

    /// Kind as accepted by `kubectl delete` / `oc delete`.
    pub fn cli_kind(&self) -> String {
        self.kind.to_ascii_lowercase()
    }
}

/// Order resources for submission; stable within a kind.
pub fn sort_for_run(resources: &mut [Resource]) {
    resources.sort_by_key(Resource::rank);
}

fn parse_document(artifact: &str, content: &str) -> ProviderResult<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return Ok(value);
    }
    serde_yaml::from_str::<Value>(content)
        .map_err(|e| ProviderError::invalid_artifact(artifact, format!("not JSON or YAML: {}", e)))
}
