//! The external Python ETL process, behind a narrow runner interface.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::process::Command;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Argument that switches the ETL entry point into human-in-the-loop mode.
pub const HUMAN_IN_THE_LOOP: &str = "human_in_the_loop";

/// Captured result of one script run.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ScriptOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl ScriptOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Turn a non-zero exit into an error carrying the captured stderr.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Script` unless the exit code is 0.
    pub fn into_result(self) -> AppResult<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(AppError::Script {
                code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }
}

#[async_trait]
pub trait EtlRunner: Send + Sync {
    /// Run the ETL entry point with `args` and wait for it to exit.
    ///
    /// A non-zero exit is not an error here; see [`ScriptOutput::into_result`].
    async fn run(&self, args: &[String]) -> AppResult<ScriptOutput>;
}

/// Runs `<interpreter> <script> [args..]` as a child process.
#[derive(Debug, Clone)]
pub struct PythonEtl {
    interpreter: String,
    script_path: PathBuf,
}

impl PythonEtl {
    #[must_use]
    pub fn new(interpreter: &str, script_path: &Path) -> Self {
        Self {
            interpreter: interpreter.to_string(),
            script_path: script_path.to_path_buf(),
        }
    }

    #[must_use]
    pub fn script_path(&self) -> &Path {
        &self.script_path
    }
}

#[async_trait]
impl EtlRunner for PythonEtl {
    async fn run(&self, args: &[String]) -> AppResult<ScriptOutput> {
        if !tokio::fs::try_exists(&self.script_path).await.unwrap_or(false) {
            return Err(AppError::NotFound(format!(
                "ETL script not found at {}",
                self.script_path.display()
            )));
        }

        tracing::info!(
            interpreter = %self.interpreter,
            script = %self.script_path.display(),
            ?args,
            "Starting ETL script"
        );
        let started = std::time::Instant::now();

        let output = Command::new(&self.interpreter)
            .arg(&self.script_path)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to spawn {}: {e}", self.interpreter)))?;

        let result = ScriptOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            exit_code: output.status.code(),
        };

        if result.success() {
            tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "ETL script finished");
        } else {
            tracing::error!(
                exit_code = ?result.exit_code,
                stderr = %result.stderr,
                "ETL script failed"
            );
        }
        Ok(result)
    }
}
