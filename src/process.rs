//! Package manager subprocess execution
//!
//! This module provides:
//! - A runner trait so the core can be driven by fake processes in tests
//! - The system runner built on tokio::process with an optional timeout

use crate::error::ProcessError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// The command line that was executed
    pub command: String,
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl ProcessOutput {
    /// Create a new output record
    pub fn new(
        command: impl Into<String>,
        code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Whether the process exited with status 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        let mut combined = String::with_capacity(self.stdout.len() + self.stderr.len());
        combined.push_str(&self.stdout);
        combined.push_str(&self.stderr);
        combined
    }

    /// Turn an unsuccessful exit into a [`ProcessError::NonZeroExit`]
    pub fn into_checked(self) -> Result<Self, ProcessError> {
        if self.success() {
            Ok(self)
        } else {
            let output = self.combined();
            Err(ProcessError::non_zero_exit(self.command, self.code, output))
        }
    }
}

/// Render a program and its arguments as a single command line
pub fn command_line<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg.as_ref());
    }
    line
}

/// Convert a static argument template into owned arguments
pub fn to_args(template: &[&str]) -> Vec<String> {
    template.iter().map(|arg| arg.to_string()).collect()
}

/// Trait for running package manager commands
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args` in `working_dir` and capture its output.
    ///
    /// A non-zero exit is returned as `Ok`; only failures to run the
    /// program at all (spawn errors, timeouts) are errors.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        working_dir: &Path,
    ) -> Result<ProcessOutput, ProcessError>;
}

/// Default runner that executes real commands
#[derive(Debug, Default, Clone)]
pub struct SystemProcessRunner {
    timeout: Option<Duration>,
}

impl SystemProcessRunner {
    /// Create a runner without a timeout
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Kill commands that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Configured timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        working_dir: &Path,
    ) -> Result<ProcessOutput, ProcessError> {
        let line = command_line(program, args);
        tracing::debug!(command = %line, dir = %working_dir.display(), "running");

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, command.output())
                .await
                .map_err(|_| ProcessError::timeout(&line, timeout))?,
            None => command.output().await,
        }
        .map_err(|e| ProcessError::spawn(&line, e))?;

        let result = ProcessOutput::new(
            line,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        tracing::debug!(command = %result.command, code = ?result.code, "finished");
        Ok(result)
    }
}
