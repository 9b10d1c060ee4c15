//! Integration tests for the command execution layer.
//!
//! These tests use the mock runner through the trait object the providers
//! hold, so no backend tool needs to be installed.

use std::sync::Arc;

use keel_runner::{
    CliRunner, CliRunnerOptions, CommandRunner, Invocation, MockResponse, MockRunner, RunConfig,
};

/// Calls made through a shared trait object are visible on the mock.
#[tokio::test]
async fn test_mock_runner_through_trait_object() {
    let mock = MockRunner::new();
    let runner: Arc<dyn CommandRunner> = Arc::new(mock.clone());

    runner
        .run(
            &Invocation::new("oc").args(["create", "-f", "dc.json", "--config=/tmp/kubeconfig"]),
            &RunConfig::default(),
        )
        .await
        .unwrap();

    assert_eq!(mock.call_count(), 1);
    assert_eq!(mock.calls_to("oc")[0].args[0], "create");
}

/// Non-zero exits come back as results, not errors.
#[tokio::test]
async fn test_failure_is_a_result() {
    let runner = MockRunner::new().add_response(MockResponse::failure(1, "Error from server (AlreadyExists)"));

    let result = runner
        .run(&Invocation::new("kubectl").arg("create"), &RunConfig::default())
        .await
        .unwrap();

    assert!(!result.success());
    assert_eq!(result.exit_code, 1);
    assert!(result.combined_output().contains("AlreadyExists"));
}

/// Dry-run produces a successful result for any command.
#[tokio::test]
async fn test_cli_runner_dry_run() {
    let runner = CliRunner::new(CliRunnerOptions::new().dry_run());
    let invocation = Invocation::new("docker").args(["run", "-d", "centos/httpd"]);

    let result = runner.run(&invocation, &RunConfig::default()).await.unwrap();

    assert!(result.success());
    assert_eq!(result.command, "docker run -d centos/httpd");
    assert!(result.stdout.is_empty());
}
