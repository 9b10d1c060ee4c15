//! Command runner trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Invocation, RunConfig};
use crate::error::RunnerResult;

/// Result of a backend command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// The command line that was executed
    pub command: String,
    /// Exit code of the process (-1 when killed by a signal)
    pub exit_code: i64,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Get combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Executes backend commands on behalf of a provider.
///
/// Implementations block the caller until the command has exited; success,
/// failure and timeout are all terminal.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Check whether a program can be executed.
    async fn is_available(&self, program: &str) -> bool;

    /// Run a command to completion.
    async fn run(&self, invocation: &Invocation, run_config: &RunConfig)
        -> RunnerResult<ExecutionResult>;
}
