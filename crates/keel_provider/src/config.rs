//! Provider kinds and provider configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use keel_render::PlaceholderSyntax;

use crate::error::{ProviderError, ProviderResult};

pub const NAMESPACE_KEY: &str = "namespace";
pub const PROVIDER_CONFIG_KEY: &str = "providerconfig";
pub const OPENSHIFT_CONFIG_KEY: &str = "openshiftconfig";

const DEFAULT_NAMESPACE: &str = "default";

/// The closed set of supported backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Docker,
    Kubernetes,
    Openshift,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Docker => "docker",
            ProviderKind::Kubernetes => "kubernetes",
            ProviderKind::Openshift => "openshift",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            ProviderKind::Docker,
            ProviderKind::Kubernetes,
            ProviderKind::Openshift,
        ]
    }

    /// Command-line tool driving the backend.
    pub fn program(&self) -> &'static str {
        match self {
            ProviderKind::Docker => "docker",
            ProviderKind::Kubernetes => "kubectl",
            ProviderKind::Openshift => "oc",
        }
    }

    pub fn placeholder_syntax(&self) -> PlaceholderSyntax {
        match self {
            ProviderKind::Docker | ProviderKind::Kubernetes => PlaceholderSyntax::Dollar,
            ProviderKind::Openshift => PlaceholderSyntax::Braced,
        }
    }

    /// Keywords this provider understands in the `general` answers section.
    pub fn config_keys(&self) -> &'static [ConfigKey] {
        match self {
            ProviderKind::Docker => DOCKER_KEYS,
            ProviderKind::Kubernetes => KUBERNETES_KEYS,
            ProviderKind::Openshift => OPENSHIFT_KEYS,
        }
    }
}

const DOCKER_KEYS: &[ConfigKey] = &[ConfigKey::optional(NAMESPACE_KEY, Some(DEFAULT_NAMESPACE))];

const KUBERNETES_KEYS: &[ConfigKey] = &[
    ConfigKey::optional(NAMESPACE_KEY, Some(DEFAULT_NAMESPACE)),
    ConfigKey::optional(PROVIDER_CONFIG_KEY, None).file(),
];

const OPENSHIFT_KEYS: &[ConfigKey] = &[
    ConfigKey::required(OPENSHIFT_CONFIG_KEY).file(),
    ConfigKey::optional(NAMESPACE_KEY, Some(DEFAULT_NAMESPACE)),
];

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "docker" => Ok(ProviderKind::Docker),
            "kubernetes" => Ok(ProviderKind::Kubernetes),
            "openshift" => Ok(ProviderKind::Openshift),
            _ => Err(ProviderError::UnknownProvider(s.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata for one provider keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigKey {
    pub name: &'static str,
    pub required: bool,
    pub default: Option<&'static str>,
    /// The value is a path that must point to a readable file
    pub file: bool,
}

impl ConfigKey {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            default: None,
            file: false,
        }
    }

    pub const fn optional(name: &'static str, default: Option<&'static str>) -> Self {
        Self {
            name,
            required: false,
            default,
            file: false,
        }
    }

    pub const fn file(mut self) -> Self {
        self.file = true;
        self
    }
}

/// Resolved configuration of the selected provider.
///
/// Built once at selection time from the `general` answers section and
/// handed to the provider; nothing else reads provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderConfig {
    kind: ProviderKind,
    values: BTreeMap<String, String>,
}

impl ProviderConfig {
    /// Build a configuration, filling declared defaults for absent keys.
    /// Blank values count as absent.
    pub fn new(kind: ProviderKind, supplied: &BTreeMap<String, String>) -> Self {
        let mut values: BTreeMap<String, String> = supplied
            .iter()
            .filter(|(key, value)| key.as_str() != "provider" && !value.trim().is_empty())
            .map(|(key, value)| (key.clone(), value.trim().to_string()))
            .collect();

        for key in kind.config_keys() {
            if let Some(default) = key.default {
                values
                    .entry(key.name.to_string())
                    .or_insert_with(|| default.to_string());
            }
        }

        Self { kind, values }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn namespace(&self) -> &str {
        self.get(NAMESPACE_KEY).unwrap_or(DEFAULT_NAMESPACE)
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Check required keywords and readable config files.
    pub fn validate(&self) -> ProviderResult<()> {
        for key in self.kind.config_keys() {
            let value = match self.get(key.name) {
                Some(value) => value,
                None if key.required => {
                    return Err(ProviderError::MissingRequiredConfig {
                        provider: self.kind.to_string(),
                        key: key.name.to_string(),
                    });
                }
                None => continue,
            };

            if key.file {
                self.check_readable(Path::new(value))?;
            }
        }
        Ok(())
    }

    fn check_readable(&self, path: &Path) -> ProviderResult<()> {
        let unreadable = |message: String| ProviderError::UnreadableConfig {
            provider: self.kind.to_string(),
            path: path.to_path_buf(),
            message,
        };

        if !path.is_file() {
            return Err(unreadable("not a file".to_string()));
        }
        fs::read(path).map_err(|e| unreadable(e.to_string()))?;
        Ok(())
    }
}
