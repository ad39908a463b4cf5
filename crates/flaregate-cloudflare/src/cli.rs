//! Command-line backend
//!
//! Runs the provider's command-line tool once per operation. Credentials are
//! passed through the child's environment, never on the command line. Worker
//! scripts are staged in a temporary file that is removed on every exit path.

use crate::operation::Operation;
use crate::provider::Gateway;
use async_trait::async_trait;
use flaregate_cloud::{
    AccountSummary, CredentialVerifier, Credentials, GatewayError, Reply, Result,
};
use serde_json::{Value, json};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::process::Command;

pub const DEFAULT_CLI_PROGRAM: &str = "cfm";
pub const DEFAULT_CLI_TIMEOUT: Duration = Duration::from_secs(30);

pub const EMAIL_ENV: &str = "CLOUDFLARE_EMAIL";
pub const API_KEY_ENV: &str = "CLOUDFLARE_API_KEY";

/// Captured output of one successful invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs the command-line tool with a bounded wall-clock time
#[derive(Debug, Clone)]
pub struct CliExecutor {
    program: PathBuf,
    leading_args: Vec<String>,
    timeout: Duration,
}

impl Default for CliExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_CLI_PROGRAM, DEFAULT_CLI_TIMEOUT)
    }
}

impl CliExecutor {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            timeout,
        }
    }

    /// Arguments placed before every operation's own arguments
    /// (e.g. `npx` + `["cfm"]`)
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the tool once.
    ///
    /// Non-zero exit becomes `CommandFailed(stderr)`; exceeding the timeout
    /// kills the child and becomes `Timeout`.
    pub async fn run(&self, credentials: &Credentials, args: &[String]) -> Result<CliOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(args)
            .env(EMAIL_ENV, credentials.identity())
            .env(API_KEY_ENV, credentials.secret())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!("Running: {} {}", self.program.display(), args.join(" "));

        let child = cmd.spawn()?;
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Command timed out"
                );
                return Err(GatewayError::Timeout("Command timeout".to_string()));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::warn!(status = %output.status, "Command failed");
            return Err(GatewayError::CommandFailed(stderr));
        }

        Ok(CliOutput { stdout, stderr })
    }
}

/// Gateway backed by the command-line tool
#[derive(Debug, Clone)]
pub struct CliGateway {
    executor: CliExecutor,
    scratch_dir: PathBuf,
}

impl CliGateway {
    pub fn new(executor: CliExecutor) -> Self {
        Self::with_scratch_dir(executor, std::env::temp_dir())
    }

    /// Stage worker scripts under `scratch_dir` instead of the OS temp dir
    pub fn with_scratch_dir(executor: CliExecutor, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            executor,
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn executor(&self) -> &CliExecutor {
        &self.executor
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    fn stage_script(&self, script: &str) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("flaregate-worker-")
            .suffix(".js")
            .tempfile_in(&self.scratch_dir)?;
        file.write_all(script.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    async fn run_operation(
        &self,
        credentials: &Credentials,
        operation: &Operation,
        staged: Option<&Path>,
    ) -> Result<Reply> {
        let args = operation.cli_args(staged)?;
        let output = self.executor.run(credentials, &args).await?;
        Ok(Reply::Output {
            output: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[async_trait]
impl CredentialVerifier for CliGateway {
    async fn verify(&self, credentials: &Credentials) -> Result<AccountSummary> {
        let args = Operation::CurrentAccount.cli_args(None)?;
        let output = self.executor.run(credentials, &args).await?;

        let summary = serde_json::from_str::<Value>(output.stdout.trim())
            .unwrap_or_else(|_| json!({ "output": output.stdout }));
        Ok(AccountSummary(summary))
    }
}

#[async_trait]
impl Gateway for CliGateway {
    fn backend(&self) -> &'static str {
        "cli"
    }

    async fn dispatch(&self, credentials: &Credentials, operation: Operation) -> Result<Reply> {
        let Operation::DeployWorker(worker) = &operation else {
            return self.run_operation(credentials, &operation, None).await;
        };

        let staged = self.stage_script(&worker.script)?;
        let result = self
            .run_operation(credentials, &operation, Some(staged.path()))
            .await;

        if let Err(err) = staged.close() {
            tracing::warn!(error = %err, "Failed to remove staged script");
        }
        result
    }
}
