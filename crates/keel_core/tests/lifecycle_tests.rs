//! Integration tests for the lifecycle orchestrator.
//!
//! All backend commands go to a `MockRunner`, so invocation counts and
//! arguments are observable.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use keel_core::{
    ComponentOutcome, CoreError, Deployer, FailureKind, LifecycleState, Operation,
    OrchestratorOptions, Outcome,
};
use keel_provider::ProviderError;
use keel_runner::{MockResponse, MockRunner};
use keel_spec::{Answers, Application, Artifact, Component, ParamDecl};
use tempfile::tempdir;

fn pod(name: &str, image: &str) -> String {
    format!(
        r#"{{"kind": "Pod", "metadata": {{"name": "{}"}}, "spec": {{"containers": [{{"image": "{}"}}]}}}}"#,
        name, image
    )
}

/// A renders, B references an undeclared parameter, C follows.
fn abc_application() -> Application {
    Application::new("abc")
        .component(
            Component::new("a")
                .param(ParamDecl::new("image").with_default("centos/httpd"))
                .artifact(Artifact::new("a.json", pod("a", "$image")).for_provider("kubernetes")),
        )
        .component(
            Component::new("b")
                .param(ParamDecl::new("image").with_default("mariadb"))
                .artifact(Artifact::new("b.json", pod("b", "$undeclared")).for_provider("kubernetes")),
        )
        .component(
            Component::new("c")
                .artifact(Artifact::new("c.json", pod("c", "nginx")).for_provider("kubernetes")),
        )
}

fn deployer(mock: &MockRunner) -> Deployer {
    Deployer::new(Arc::new(mock.clone()))
}

#[tokio::test]
async fn test_failure_stops_later_components() {
    let dir = tempdir().unwrap();
    let mock = MockRunner::new();
    let answers = Answers::new().with("general", "provider", "kubernetes");

    let report = deployer(&mock)
        .deploy(Operation::Run, &abc_application(), &answers, dir.path())
        .await
        .unwrap();

    assert!(!report.success());
    assert_eq!(report.state, LifecycleState::Done(Outcome::Failed));
    assert_eq!(report.get("a").unwrap().outcome, ComponentOutcome::Success);
    assert!(matches!(
        &report.get("b").unwrap().outcome,
        ComponentOutcome::Failed { kind: FailureKind::UnresolvedPlaceholder, reason } if reason.contains("undeclared")
    ));
    assert!(matches!(report.get("c").unwrap().outcome, ComponentOutcome::Skipped { .. }));

    let calls = mock.calls_to("kubectl");
    assert_eq!(calls.len(), 1);
    assert!(calls[0].args[2].ends_with("a.json"));
    assert!(!dir.path().join("kubernetes").join("b").exists());

    let failure = report.first_failure().unwrap();
    assert_eq!(failure.component, "b");
    assert_eq!(failure.provider.as_str(), "kubernetes");
}

#[tokio::test]
async fn test_keep_going_continues_after_failure() {
    let dir = tempdir().unwrap();
    let mock = MockRunner::new();
    let answers = Answers::new().with("general", "provider", "kubernetes");

    let report = deployer(&mock)
        .options(OrchestratorOptions::new().keep_going(true))
        .deploy(Operation::Run, &abc_application(), &answers, dir.path())
        .await
        .unwrap();

    assert!(!report.success());
    assert_eq!(report.get("c").unwrap().outcome, ComponentOutcome::Success);
    assert_eq!(mock.calls_to("kubectl").len(), 2);
}

#[tokio::test]
async fn test_docker_single_component_single_invocation() {
    let dir = tempdir().unwrap();
    let mock = MockRunner::new();
    let app = Application::new("helloapache").component(
        Component::new("helloapache")
            .artifact(Artifact::new("hello-apache-pod_run", "docker run -d -p 80:80 centos/httpd").for_provider("docker")),
    );
    let answers = Answers::new().with("general", "provider", "docker");

    let report = deployer(&mock)
        .deploy(Operation::Run, &app, &answers, dir.path())
        .await
        .unwrap();

    assert!(report.success());
    assert_eq!(mock.call_count(), 1);
    assert_eq!(mock.calls_to("docker")[0].args[0], "run");
    assert_eq!(
        report.transitions,
        vec![
            LifecycleState::Init,
            LifecycleState::Resolving,
            LifecycleState::Rendering,
            LifecycleState::Invoking,
            LifecycleState::Done(Outcome::Success),
        ]
    );
}

#[tokio::test]
async fn test_openshift_without_config_never_invokes() {
    let dir = tempdir().unwrap();
    let mock = MockRunner::new();
    let answers = Answers::new().with("general", "provider", "openshift");

    let result = deployer(&mock)
        .deploy(Operation::Run, &abc_application(), &answers, dir.path())
        .await;

    assert!(matches!(
        result,
        Err(CoreError::Provider(ProviderError::MissingRequiredConfig { .. }))
    ));
    assert_eq!(mock.call_count(), 0);
    assert!(!dir.path().join("openshift").exists());
}

#[tokio::test]
async fn test_unreadable_openshift_config_never_invokes() {
    let dir = tempdir().unwrap();
    let mock = MockRunner::new();
    let missing = dir.path().join("nope.kubeconfig");
    let answers = Answers::new()
        .with("general", "provider", "openshift")
        .with("general", "openshiftconfig", missing.to_str().unwrap());

    let result = deployer(&mock)
        .deploy(Operation::Run, &abc_application(), &answers, dir.path())
        .await;

    assert!(matches!(
        result,
        Err(CoreError::Provider(ProviderError::UnreadableConfig { .. }))
    ));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_missing_backend_cli_blocks_run_but_not_install() {
    let dir = tempdir().unwrap();
    let mock = MockRunner::new().set_available(false);
    let answers = Answers::new().with("general", "provider", "kubernetes");

    let result = deployer(&mock)
        .deploy(Operation::Run, &abc_application(), &answers, dir.path())
        .await;
    assert!(matches!(
        result,
        Err(CoreError::Provider(ProviderError::BackendUnavailable { .. }))
    ));
    assert_eq!(mock.call_count(), 0);
    assert!(!dir.path().join("kubernetes").exists());

    let report = deployer(&mock)
        .deploy(Operation::Install, &abc_application(), &answers, dir.path())
        .await
        .unwrap();
    assert_eq!(report.get("a").unwrap().outcome, ComponentOutcome::Success);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_provider() {
    let mock = MockRunner::new();
    let answers = Answers::new().with("general", "provider", "mesos");

    let result = deployer(&mock)
        .deploy(Operation::Run, &abc_application(), &answers, Path::new("/tmp/keel"))
        .await;

    assert!(matches!(result, Err(CoreError::Provider(ProviderError::UnknownProvider(_)))));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_kubernetes_is_default_with_default_namespace() {
    let dir = tempdir().unwrap();
    let mock = MockRunner::new();
    let app = Application::new("web").component(
        Component::new("web").artifact(Artifact::new("web.json", pod("web", "nginx"))),
    );

    let report = deployer(&mock)
        .deploy(Operation::Run, &app, &Answers::new(), dir.path())
        .await
        .unwrap();

    assert!(report.success());
    let calls = mock.calls_to("kubectl");
    assert_eq!(calls.len(), 1);
    assert!(calls[0].has_arg("--namespace=default"));
}

#[tokio::test]
async fn test_missing_required_parameter() {
    let dir = tempdir().unwrap();
    let mock = MockRunner::new();
    let app = Application::new("db").component(
        Component::new("mariadb")
            .param(ParamDecl::new("db_pass"))
            .artifact(Artifact::new("run", "docker run -e PASS=$db_pass mariadb")),
    );
    let answers = Answers::new().with("general", "provider", "docker");

    let report = deployer(&mock)
        .deploy(Operation::Run, &app, &answers, dir.path())
        .await
        .unwrap();

    let failure = report.first_failure().unwrap();
    assert_eq!(failure.kind, FailureKind::MissingRequiredParameter);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_component_without_artifacts_fails() {
    let dir = tempdir().unwrap();
    let mock = MockRunner::new();
    let app = Application::new("db").component(
        Component::new("mariadb").artifact(Artifact::new("pod.json", pod("db", "mariadb")).for_provider("kubernetes")),
    );
    let answers = Answers::new().with("general", "provider", "docker");

    let report = deployer(&mock)
        .deploy(Operation::Run, &app, &answers, dir.path())
        .await
        .unwrap();

    assert_eq!(report.first_failure().unwrap().kind, FailureKind::NoArtifacts);
}

#[tokio::test]
async fn test_backend_failure_is_recorded() {
    let dir = tempdir().unwrap();
    let mock = MockRunner::new().add_response(MockResponse::failure(125, "port is already allocated"));
    let app = Application::new("two")
        .component(Component::new("first").artifact(Artifact::new("run", "docker run -d httpd")))
        .component(Component::new("second").artifact(Artifact::new("run", "docker run -d nginx")));
    let answers = Answers::new().with("general", "provider", "docker");

    let report = deployer(&mock)
        .deploy(Operation::Run, &app, &answers, dir.path())
        .await
        .unwrap();

    let failure = report.first_failure().unwrap();
    assert_eq!(failure.component, "first");
    assert_eq!(failure.kind, FailureKind::BackendInvocationFailed);
    assert!(failure.reason.contains("port is already allocated"));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_resolution_is_deterministic_across_runs() {
    let app = abc_application();
    let answers = Answers::new()
        .with("general", "provider", "kubernetes")
        .with("a", "image", "httpd:2.4");

    let mut seen = Vec::new();
    for _ in 0..3 {
        let dir = tempdir().unwrap();
        let mock = MockRunner::new();
        deployer(&mock)
            .deploy(Operation::Install, &app, &answers, dir.path())
            .await
            .unwrap();
        seen.push(fs::read_to_string(dir.path().join("kubernetes/a/a.json")).unwrap());
    }

    assert!(seen[0].contains("httpd:2.4"));
    assert!(seen.iter().all(|content| content == &seen[0]));
}

#[tokio::test]
async fn test_stop_from_fresh_deployer() {
    let dir = tempdir().unwrap();
    let app = Application::new("db").component(
        Component::new("db")
            .artifact(Artifact::new("svc.json", r#"{"kind": "Service", "metadata": {"name": "db"}}"#))
            .artifact(Artifact::new("rc.json", r#"{"kind": "ReplicationController", "metadata": {"name": "db"}}"#)),
    );
    let answers = Answers::new()
        .with("general", "provider", "kubernetes")
        .with("general", "namespace", "prod");

    let run_mock = MockRunner::new();
    let report = deployer(&run_mock)
        .deploy(Operation::Run, &app, &answers, dir.path())
        .await
        .unwrap();
    assert!(report.success());

    let stop_mock = MockRunner::new();
    let report = deployer(&stop_mock)
        .deploy(Operation::Stop, &app, &answers, dir.path())
        .await
        .unwrap();
    assert!(report.success());

    let lines: Vec<_> = stop_mock.get_calls().iter().map(|c| c.command_line()).collect();
    assert_eq!(
        lines,
        vec![
            "kubectl scale rc db --replicas=0 --namespace=prod",
            "kubectl delete replicationcontroller db --namespace=prod",
            "kubectl delete service db --namespace=prod",
        ]
    );
}
