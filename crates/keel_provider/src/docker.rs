//! Docker provider.
//!
//! Each artifact is a single `docker run` command line. Containers started
//! without an explicit `--name` are named `<namespace>_<component>_<12 hex>`
//! so `stop` can find them again from a fresh process.

use async_trait::async_trait;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use keel_render::RenderedArtifact;
use keel_runner::Invocation;

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{Provider, ProviderContext};

const NAME_FLAG: &str = "--name";

/// A parsed `docker run` specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerRunSpec {
    /// Arguments after the leading `docker`
    pub args: Vec<String>,
    run_index: usize,
    /// Container name given in the specification, if any
    pub name: Option<String>,
}

impl DockerRunSpec {
    /// Tokenise a run specification. Backslash line continuations are
    /// joined; quoting is not interpreted.
    pub fn parse(artifact: &str, content: &str) -> ProviderResult<Self> {
        let joined = content.replace("\\\r\n", " ").replace("\\\n", " ");
        let mut tokens = joined.split_whitespace().map(str::to_string);

        match tokens.next() {
            Some(first) if first == "docker" => {}
            Some(first) => {
                return Err(ProviderError::invalid_artifact(
                    artifact,
                    format!("expected a docker command, found '{}'", first),
                ));
            }
            None => return Err(ProviderError::invalid_artifact(artifact, "empty run specification")),
        }

        let args: Vec<String> = tokens.collect();
        let run_index = args
            .iter()
            .position(|arg| arg == "run")
            .ok_or_else(|| ProviderError::invalid_artifact(artifact, "missing 'run' subcommand"))?;

        let name = explicit_name(&args[run_index + 1..]);

        Ok(Self {
            args,
            run_index,
            name,
        })
    }

    /// Arguments with `--name=<name>` inserted right after `run`.
    pub fn named_args(&self, name: &str) -> Vec<String> {
        let mut args = self.args.clone();
        args.insert(self.run_index + 1, format!("{}={}", NAME_FLAG, name));
        args
    }
}

fn explicit_name(args: &[String]) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == NAME_FLAG {
            return iter.next().cloned();
        }
        if let Some(value) = arg.strip_prefix("--name=") {
            return Some(value.to_string());
        }
    }
    None
}

/// Container names allow `[a-zA-Z0-9_.-]`; anything else becomes `_`.
fn docker_safe(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Provider driving the local docker daemon.
pub struct DockerProvider {
    config: ProviderConfig,
    context: ProviderContext,
}

impl DockerProvider {
    pub fn new(config: ProviderConfig, context: ProviderContext) -> Self {
        Self { config, context }
    }

    /// Generated name for a container of `component`.
    pub fn container_name(&self, component: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("{}_{}", self.name_prefix(component), &id[..12])
    }

    fn name_prefix(&self, component: &str) -> String {
        format!(
            "{}_{}",
            docker_safe(self.config.namespace()),
            docker_safe(component)
        )
    }

    fn name_pattern(&self, component: &str) -> ProviderResult<Regex> {
        let pattern = format!(
            "^{}_[0-9a-f]{{12}}$",
            regex::escape(&self.name_prefix(component))
        );
        Regex::new(&pattern).map_err(|e| ProviderError::invalid_artifact(component, e.to_string()))
    }

    async fn docker(&self, args: Vec<String>) -> ProviderResult<String> {
        let invocation = Invocation::new(ProviderKind::Docker.program()).args(args);
        let result = self.context.invoke(ProviderKind::Docker, invocation).await?;
        Ok(result.stdout)
    }

    async fn list_containers(&self) -> ProviderResult<Vec<String>> {
        let stdout = self
            .docker(vec![
                "ps".to_string(),
                "-a".to_string(),
                "--format".to_string(),
                "{{.Names}}".to_string(),
            ])
            .await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[async_trait]
impl Provider for DockerProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Docker
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn validate_config(&self) -> ProviderResult<()> {
        self.config.validate()
    }

    async fn install(&self, component: &str, artifacts: &[RenderedArtifact]) -> ProviderResult<()> {
        for artifact in artifacts {
            DockerRunSpec::parse(&artifact.name, &artifact.content)?;
        }
        self.context.stage(ProviderKind::Docker, component, artifacts)?;
        Ok(())
    }

    async fn run(&self, component: &str, artifacts: &[RenderedArtifact]) -> ProviderResult<()> {
        let specs = artifacts
            .iter()
            .map(|a| DockerRunSpec::parse(&a.name, &a.content))
            .collect::<ProviderResult<Vec<_>>>()?;
        self.context.stage(ProviderKind::Docker, component, artifacts)?;

        for spec in specs {
            let args = match &spec.name {
                Some(name) => {
                    warn!(
                        "Run specification for {} sets --name={}; stop will match it by that name",
                        component, name
                    );
                    spec.args.clone()
                }
                None => spec.named_args(&self.container_name(component)),
            };
            self.docker(args).await?;
        }

        info!("Started docker containers for {}", component);
        Ok(())
    }

    async fn stop(&self, component: &str, artifacts: &[RenderedArtifact]) -> ProviderResult<()> {
        let specs = artifacts
            .iter()
            .map(|a| DockerRunSpec::parse(&a.name, &a.content))
            .collect::<ProviderResult<Vec<_>>>()?;

        let mut names: Vec<String> = specs.iter().filter_map(|s| s.name.clone()).collect();

        if specs.iter().any(|s| s.name.is_none()) {
            let pattern = self.name_pattern(component)?;
            names.extend(
                self.list_containers()
                    .await?
                    .into_iter()
                    .filter(|name| pattern.is_match(name)),
            );
        }

        if names.is_empty() {
            warn!("No containers found for {}", component);
            return Ok(());
        }

        for name in names {
            info!("Stopping container {}", name);
            self.docker(vec!["stop".to_string(), name]).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use keel_runner::{MockResponse, MockRunner};

    fn provider(mock: &MockRunner, workdir: &std::path::Path) -> DockerProvider {
        let mut general = BTreeMap::new();
        general.insert("namespace".to_string(), "demo".to_string());
        DockerProvider::new(
            ProviderConfig::new(ProviderKind::Docker, &general),
            ProviderContext::new(Arc::new(mock.clone()), workdir),
        )
    }

    #[test]
    fn test_parse_with_continuations() {
        let spec = DockerRunSpec::parse(
            "web_run",
            "docker run -d \\\n  -p 80:80 \\\n  centos/httpd\n",
        )
        .unwrap();
        assert_eq!(spec.args, vec!["run", "-d", "-p", "80:80", "centos/httpd"]);
        assert_eq!(spec.name, None);
        assert_eq!(
            spec.named_args("demo_web_0123456789ab"),
            vec!["run", "--name=demo_web_0123456789ab", "-d", "-p", "80:80", "centos/httpd"]
        );
    }

    #[test]
    fn test_parse_explicit_name() {
        let spec = DockerRunSpec::parse("a", "docker run --name web -d httpd").unwrap();
        assert_eq!(spec.name.as_deref(), Some("web"));

        let spec = DockerRunSpec::parse("a", "docker run --name=web httpd").unwrap();
        assert_eq!(spec.name.as_deref(), Some("web"));
    }

    #[test]
    fn test_parse_rejects_non_docker() {
        assert!(matches!(
            DockerRunSpec::parse("a", "podman run httpd"),
            Err(ProviderError::InvalidArtifact { .. })
        ));
        assert!(matches!(
            DockerRunSpec::parse("a", "docker pull httpd"),
            Err(ProviderError::InvalidArtifact { .. })
        ));
        assert!(matches!(
            DockerRunSpec::parse("a", "   \n"),
            Err(ProviderError::InvalidArtifact { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_inserts_generated_name() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockRunner::new();
        let docker = provider(&mock, dir.path());

        docker
            .run("web", &[RenderedArtifact::new("web_run", "docker run -d centos/httpd")])
            .await
            .unwrap();

        let calls = mock.calls_to("docker");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args[0], "run");
        let name = calls[0].args[1].strip_prefix("--name=").unwrap();
        assert!(docker.name_pattern("web").unwrap().is_match(name));
        assert!(dir.path().join("docker/web/web_run").is_file());
    }

    #[tokio::test]
    async fn test_generated_name_replaces_invalid_characters() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockRunner::new().respond_to(
            "docker ps",
            MockResponse::success("my_team_web_ui_0123456789ab\n"),
        );
        let mut general = BTreeMap::new();
        general.insert("namespace".to_string(), "my/team".to_string());
        let docker = DockerProvider::new(
            ProviderConfig::new(ProviderKind::Docker, &general),
            ProviderContext::new(Arc::new(mock.clone()), dir.path()),
        );

        let name = docker.container_name("web ui");
        assert!(name.starts_with("my_team_web_ui_"));
        assert!(name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')));

        let artifact = RenderedArtifact::new("web_run", "docker run -d centos/httpd");
        docker.stop("web ui", &[artifact]).await.unwrap();

        let lines: Vec<_> = mock.get_calls().iter().map(|c| c.command_line()).collect();
        assert_eq!(lines[1], "docker stop my_team_web_ui_0123456789ab");
    }

    #[tokio::test]
    async fn test_stop_matches_generated_names() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockRunner::new().respond_to(
            "docker ps",
            MockResponse::success("demo_web_0123456789ab\ndemo_webapp_0123456789ab\nother\n"),
        );
        let docker = provider(&mock, dir.path());

        docker
            .stop("web", &[RenderedArtifact::new("web_run", "docker run -d centos/httpd")])
            .await
            .unwrap();

        let lines: Vec<_> = mock.get_calls().iter().map(|c| c.command_line()).collect();
        assert_eq!(
            lines,
            vec![
                "docker ps -a --format {{.Names}}",
                "docker stop demo_web_0123456789ab",
            ]
        );
    }

    #[tokio::test]
    async fn test_stop_explicit_name_skips_listing() {
        let dir = tempfile::tempdir().unwrap();
        let mock = MockRunner::new();
        let docker = provider(&mock, dir.path());

        docker
            .stop("web", &[RenderedArtifact::new("web_run", "docker run --name web httpd")])
            .await
            .unwrap();

        let lines: Vec<_> = mock.get_calls().iter().map(|c| c.command_line()).collect();
        assert_eq!(lines, vec!["docker stop web"]);
    }
}
