//! Integration tests for provider selection and invocation.

use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use keel_provider::{ProviderContext, ProviderError, ProviderKind, ProviderSelector};
use keel_render::{PlaceholderSyntax, RenderedArtifact};
use keel_runner::{MockResponse, MockRunner};
use tempfile::tempdir;

fn settings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_unknown_provider_is_rejected() {
    let mock = MockRunner::new();
    let context = ProviderContext::new(Arc::new(mock.clone()), "/tmp/keel");

    let result = ProviderSelector::select("marathon", &BTreeMap::new(), context);
    assert!(matches!(result, Err(ProviderError::UnknownProvider(_))));
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn test_openshift_without_config_fails_selection() {
    let mock = MockRunner::new();
    let context = ProviderContext::new(Arc::new(mock.clone()), "/tmp/keel");

    let result = ProviderSelector::select("openshift", &settings(&[("namespace", "apps")]), context);
    assert!(matches!(result, Err(ProviderError::MissingRequiredConfig { .. })));
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn test_selected_provider_reports_syntax() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("admin.kubeconfig");
    fs::write(&config_path, "apiVersion: v1\n").unwrap();

    let context = ProviderContext::new(Arc::new(MockRunner::new()), dir.path());
    let openshift = ProviderSelector::select(
        "openshift",
        &settings(&[("openshiftconfig", config_path.to_str().unwrap())]),
        context.clone(),
    )
    .unwrap();
    assert_eq!(openshift.kind(), ProviderKind::Openshift);
    assert_eq!(openshift.syntax(), PlaceholderSyntax::Braced);

    let docker = ProviderSelector::select("docker", &BTreeMap::new(), context).unwrap();
    assert_eq!(docker.syntax(), PlaceholderSyntax::Dollar);
}

#[tokio::test]
async fn test_kubernetes_default_namespace_in_invocation() {
    let dir = tempdir().unwrap();
    let mock = MockRunner::new();
    let context = ProviderContext::new(Arc::new(mock.clone()), dir.path());

    let provider = ProviderSelector::select("kubernetes", &BTreeMap::new(), context).unwrap();
    provider
        .run(
            "helloapache",
            &[RenderedArtifact::new(
                "hello-apache-pod.json",
                r#"{"kind": "Pod", "metadata": {"name": "helloapache"}}"#,
            )],
        )
        .await
        .unwrap();

    let calls = mock.calls_to("kubectl");
    assert_eq!(calls.len(), 1);
    assert!(calls[0].has_arg("--namespace=default"));
}

#[tokio::test]
async fn test_backend_failure_carries_exit_code() {
    let dir = tempdir().unwrap();
    let mock = MockRunner::new().respond_to(
        "kubectl create",
        MockResponse::failure(1, "Error from server (AlreadyExists)"),
    );
    let context = ProviderContext::new(Arc::new(mock.clone()), dir.path());
    let provider = ProviderSelector::select("kubernetes", &BTreeMap::new(), context).unwrap();

    let err = provider
        .run(
            "db",
            &[
                RenderedArtifact::new("svc.json", r#"{"kind": "Service", "metadata": {"name": "db"}}"#),
                RenderedArtifact::new("pod.json", r#"{"kind": "Pod", "metadata": {"name": "db"}}"#),
            ],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::BackendInvocationFailed { exit_code: 1, .. }));
    assert_eq!(mock.call_count(), 1);
}
