//! CLI-based command runner.
//!
//! Spawns the backend tools (`docker`, `kubectl`, `oc`) as child processes,
//! collects their output and enforces the configured timeout.

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info};

use crate::config::{Invocation, RunConfig};
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};

/// Output stream of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogStream {
    Stdout,
    Stderr,
}

impl std::fmt::Display for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// CLI-based runner options.
#[derive(Debug, Clone)]
pub struct CliRunnerOptions {
    /// Dry-run mode (log commands without executing)
    pub dry_run: bool,
    /// CI mode (timestamped log lines)
    pub ci_mode: bool,
}

impl Default for CliRunnerOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            ci_mode: std::env::var("CI").is_ok(),
        }
    }
}

impl CliRunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Runner that executes invocations as local child processes.
#[derive(Debug, Clone, Default)]
pub struct CliRunner {
    options: CliRunnerOptions,
}

impl CliRunner {
    pub fn new(options: CliRunnerOptions) -> Self {
        Self { options }
    }

    /// Check if dry-run mode is enabled.
    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    fn spawn(&self, invocation: &Invocation) -> RunnerResult<Child> {
        let program = which::which(&invocation.program)
            .map_err(|_| RunnerError::ProgramNotFound(invocation.program.clone()))?;

        let mut cmd = Command::new(program);
        cmd.args(&invocation.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        cmd.spawn().map_err(|e| RunnerError::SpawnFailed {
            program: invocation.program.clone(),
            message: e.to_string(),
        })
    }

    /// Drain a child stream on a dedicated thread, echoing lines when asked.
    fn collect<R>(&self, reader: R, stream: LogStream, echo: bool) -> JoinHandle<String>
    where
        R: Read + Send + 'static,
    {
        let ci_mode = self.options.ci_mode;
        std::thread::spawn(move || {
            let mut output = String::new();
            for line in BufReader::new(reader).lines().map_while(Result::ok) {
                if echo {
                    if ci_mode {
                        println!(
                            "[{}] [{}] {}",
                            Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                            stream,
                            line
                        );
                    } else if stream == LogStream::Stderr {
                        eprintln!("{}", line);
                    } else {
                        println!("{}", line);
                    }
                }
                output.push_str(&line);
                output.push('\n');
            }
            output
        })
    }

    fn wait(child: &mut Child, invocation: &Invocation, timeout_seconds: u64) -> RunnerResult<ExitStatus> {
        if timeout_seconds == 0 {
            return child
                .wait()
                .map_err(|e| RunnerError::ExecutionFailed(format!("Failed to wait for process: {}", e)));
        }

        let timeout = Duration::from_secs(timeout_seconds);
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if start.elapsed() > timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(RunnerError::Timeout {
                            program: invocation.program.clone(),
                            seconds: timeout_seconds,
                        });
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    return Err(RunnerError::ExecutionFailed(format!(
                        "Failed to wait for process: {}",
                        e
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl CommandRunner for CliRunner {
    async fn is_available(&self, program: &str) -> bool {
        self.options.dry_run || which::which(program).is_ok()
    }

    async fn run(
        &self,
        invocation: &Invocation,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult> {
        let command = invocation.command_line();

        if self.options.dry_run {
            info!("[DRY-RUN] Would execute: {}", command);
            let now = Utc::now();
            return Ok(ExecutionResult {
                command,
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
                started_at: now,
                finished_at: now,
                duration_ms: 0,
            });
        }

        debug!("Executing: {}", command);

        let started_at = Utc::now();
        let mut child = self.spawn(invocation)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stderr was not captured".to_string()))?;

        let stdout_handle = self.collect(stdout, LogStream::Stdout, run_config.stream_logs);
        let stderr_handle = self.collect(stderr, LogStream::Stderr, run_config.stream_logs);

        let status = Self::wait(&mut child, invocation, run_config.timeout_seconds)?;

        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();
        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;
        let exit_code = status.code().map_or(-1, i64::from);

        if exit_code == 0 {
            debug!("{} completed in {}ms", invocation.program, duration_ms);
        } else {
            error!(
                "{} failed with exit code {} after {}ms",
                invocation.program, exit_code, duration_ms
            );
        }

        Ok(ExecutionResult {
            command,
            exit_code,
            stdout,
            stderr,
            started_at,
            finished_at,
            duration_ms,
        })
    }
}
