//! Nulecule manifest loading.
//!
//! The manifest lives at the root of an application directory and lists the
//! application graph:
//!
//! ```yaml
//! specversion: 0.0.2
//! id: helloapache-app
//! metadata:
//!   name: Hello Apache App
//! graph:
//!   - name: helloapache-app
//!     params:
//!       - name: image
//!         default: centos/httpd
//!     artifacts:
//!       docker:
//!         - file://artifacts/docker/hello-apache-pod_run
//!       kubernetes:
//!         - file://artifacts/kubernetes/hello-apache-pod.json
//!       openshift:
//!         - inherit:
//!           - kubernetes
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{SpecError, SpecResult};
use crate::models::{Application, Artifact, Component, ParamDecl};

/// File names probed, in order, inside an application directory.
pub const MANIFEST_FILE_NAMES: &[&str] = &["Nulecule", "Nulecule.yaml", "Nulecule.yml", "Nulecule.json"];

const FILE_SCHEME: &str = "file://";

#[derive(Debug, Deserialize)]
struct NuleculeFile {
    #[serde(default)]
    specversion: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    metadata: Option<Metadata>,
    #[serde(default)]
    graph: Vec<GraphEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    appversion: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphEntry {
    name: String,
    #[serde(default)]
    params: Vec<RawParam>,
    #[serde(default)]
    artifacts: Option<ArtifactSet>,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawParam {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    default: Option<serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArtifactSet {
    PerProvider(IndexMap<String, Vec<ArtifactRef>>),
    Shared(Vec<ArtifactRef>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ArtifactRef {
    Path(String),
    Inherit { inherit: Vec<String> },
}

/// Reader for application manifests.
pub struct ManifestReader;

impl ManifestReader {
    /// Locate the manifest file inside an application directory.
    pub fn find(app_dir: &Path) -> SpecResult<PathBuf> {
        MANIFEST_FILE_NAMES
            .iter()
            .map(|name| app_dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| SpecError::NotFound(app_dir.to_path_buf()))
    }

    /// Load an application and all of its artifact contents.
    pub fn load(app_dir: &Path) -> SpecResult<Application> {
        let path = Self::find(app_dir)?;
        debug!("Reading manifest from {:?}", path);

        let content = fs::read_to_string(&path)?;
        let app = Self::parse(&content, app_dir).map_err(|e| match e {
            SpecError::Yaml(err) => SpecError::InvalidFormat {
                path: path.clone(),
                message: err.to_string(),
            },
            other => other,
        })?;

        info!(
            "Loaded application {} with {} components",
            app.id,
            app.components.len()
        );
        Ok(app)
    }

    /// Parse manifest content; artifact paths resolve against `base_dir`.
    pub fn parse(content: &str, base_dir: &Path) -> SpecResult<Application> {
        let file: NuleculeFile = serde_yaml::from_str(content)?;

        if let Some(version) = &file.specversion {
            debug!("Nulecule specversion {}", version);
        }

        let metadata = file.metadata.unwrap_or_default();
        let id = file
            .id
            .or_else(|| metadata.name.clone())
            .ok_or_else(|| SpecError::MissingField("id".to_string()))?;

        let mut seen = HashSet::new();
        let mut components = Vec::with_capacity(file.graph.len());

        for entry in file.graph {
            if !seen.insert(entry.name.clone()) {
                return Err(SpecError::DuplicateComponent(entry.name));
            }
            if let Some(source) = &entry.source {
                return Err(SpecError::Unsupported(format!(
                    "component {} references external source {}",
                    entry.name, source
                )));
            }
            components.push(Self::build_component(entry, base_dir)?);
        }

        Ok(Application {
            id,
            name: metadata.name,
            version: metadata.appversion,
            components,
        })
    }

    fn build_component(entry: GraphEntry, base_dir: &Path) -> SpecResult<Component> {
        let params = entry
            .params
            .into_iter()
            .map(|p| ParamDecl {
                name: p.name,
                description: p.description,
                default: p.default.as_ref().and_then(scalar_to_string),
            })
            .collect();

        let mut artifacts = Vec::new();
        match entry.artifacts {
            None => {}
            Some(ArtifactSet::Shared(refs)) => {
                for reference in &refs {
                    let path = Self::expect_path(&entry.name, reference)?;
                    artifacts.extend(Self::read_artifacts(&entry.name, path, base_dir, None)?);
                }
            }
            Some(ArtifactSet::PerProvider(map)) => {
                for (provider, refs) in &map {
                    for path in Self::expand_refs(&entry.name, &map, refs)? {
                        artifacts.extend(Self::read_artifacts(
                            &entry.name,
                            &path,
                            base_dir,
                            Some(provider.as_str()),
                        )?);
                    }
                }
            }
        }

        Ok(Component {
            name: entry.name,
            params,
            artifacts,
        })
    }

    /// Flatten a provider's references, following one level of `inherit`.
    fn expand_refs(
        component: &str,
        map: &IndexMap<String, Vec<ArtifactRef>>,
        refs: &[ArtifactRef],
    ) -> SpecResult<Vec<String>> {
        let mut paths = Vec::new();
        for reference in refs {
            match reference {
                ArtifactRef::Path(path) => paths.push(path.clone()),
                ArtifactRef::Inherit { inherit } => {
                    for provider in inherit {
                        let inherited = map.get(provider).ok_or_else(|| SpecError::UnknownInherit {
                            component: component.to_string(),
                            provider: provider.clone(),
                        })?;
                        for inner in inherited {
                            paths.push(Self::expect_path(component, inner)?.to_string());
                        }
                    }
                }
            }
        }
        Ok(paths)
    }

    fn expect_path<'a>(component: &str, reference: &'a ArtifactRef) -> SpecResult<&'a str> {
        match reference {
            ArtifactRef::Path(path) => Ok(path),
            ArtifactRef::Inherit { .. } => Err(SpecError::Unsupported(format!(
                "nested inherit in component {}",
                component
            ))),
        }
    }

    /// Read one artifact reference; a directory yields each file in name order.
    fn read_artifacts(
        component: &str,
        reference: &str,
        base_dir: &Path,
        provider: Option<&str>,
    ) -> SpecResult<Vec<Artifact>> {
        let relative = match reference.strip_prefix(FILE_SCHEME) {
            Some(rest) => rest,
            None if reference.contains("://") => {
                return Err(SpecError::Unsupported(format!(
                    "artifact location {} in component {}",
                    reference, component
                )));
            }
            None => reference,
        };

        let path = base_dir.join(relative);
        if !path.exists() {
            return Err(SpecError::ArtifactNotFound {
                component: component.to_string(),
                path: relative.to_string(),
            });
        }

        let mut files = if path.is_dir() {
            fs::read_dir(&path)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .filter(|p| p.is_file())
                .collect::<Vec<_>>()
        } else {
            vec![path]
        };
        files.sort();

        files
            .into_iter()
            .map(|file| -> SpecResult<Artifact> {
                let name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| relative.to_string());
                let content = fs::read_to_string(&file)?;
                debug!("Loaded artifact {} for component {}", name, component);
                Ok(Artifact {
                    name,
                    content,
                    provider: provider.map(str::to_string),
                })
            })
            .collect()
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
