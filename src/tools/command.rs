//! Builder for running Windows SDK tools

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::time::timeout;

use crate::core::ModelpackError;

/// Captured result of a finished tool process
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    /// Whether the process exited successfully
    pub success: bool,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl ToolOutput {
    fn from_output(output: std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    /// Best available description of a failure
    #[must_use]
    pub fn failure_reason(&self) -> String {
        let detail = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        let code = self.code.map_or_else(|| "signal".to_string(), |c| c.to_string());
        if detail.is_empty() {
            format!("exit code {code}")
        } else {
            format!("exit code {code}: {detail}")
        }
    }
}

/// A single invocation of an external tool
///
/// Arguments added with [`ToolCommand::secret_arg`] are masked in logs.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<(String, bool)>,
    timeout_duration: Option<Duration>,
}

impl ToolCommand {
    /// Start a command for `program`
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            // Signing talks to timestamp servers; give it room
            timeout_duration: Some(Duration::from_secs(300)),
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push((arg.into(), false));
        self
    }

    /// Append a path argument
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.display().to_string())
    }

    /// Append an argument that must not appear in logs
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push((arg.into(), true));
        self
    }

    /// Set or clear the timeout used by [`ToolCommand::run`]
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Command line as shown in logs
    #[must_use]
    pub fn display_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for (arg, secret) in &self.args {
            line.push(' ');
            line.push_str(if *secret { "****" } else { arg });
        }
        line
    }

    fn tool_name(&self) -> String {
        self.program
            .file_stem()
            .map_or_else(|| self.program.display().to_string(), |s| s.to_string_lossy().into_owned())
    }

    fn plain_args(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(|(arg, _)| arg.as_str())
    }

    /// Run the tool and wait for it, blocking the current thread
    ///
    /// # Errors
    ///
    /// Fails only when the process cannot be started. A non-zero exit is reported
    /// through [`ToolOutput::success`].
    pub fn run_blocking(&self) -> Result<ToolOutput, ModelpackError> {
        tracing::debug!(target: "tools", "Executing command: {}", self.display_line());

        let output = std::process::Command::new(&self.program)
            .args(self.plain_args())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ModelpackError::Other {
                message: format!("Failed to execute {}: {e}", self.tool_name()),
            })?;

        let output = ToolOutput::from_output(output);
        log_result(&output);
        Ok(output)
    }

    /// Run the tool asynchronously, honoring the timeout
    ///
    /// # Errors
    ///
    /// Fails when the process cannot be started or does not finish in time.
    pub async fn run(&self) -> Result<ToolOutput, ModelpackError> {
        tracing::debug!(target: "tools", "Executing command: {}", self.display_line());

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(self.plain_args()).stdin(Stdio::null()).kill_on_drop(true);

        let output_future = cmd.output();
        let result = if let Some(duration) = self.timeout_duration {
            match timeout(duration, output_future).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        target: "tools",
                        "Command timed out after {} seconds: {}",
                        duration.as_secs(),
                        self.display_line()
                    );
                    return Err(ModelpackError::Other {
                        message: format!(
                            "{} timed out after {} seconds",
                            self.tool_name(),
                            duration.as_secs()
                        ),
                    });
                }
            }
        } else {
            output_future.await
        };
        let output = result.map_err(|e| ModelpackError::Other {
            message: format!("Failed to execute {}: {e}", self.tool_name()),
        })?;

        let output = ToolOutput::from_output(output);
        log_result(&output);
        Ok(output)
    }
}

fn log_result(output: &ToolOutput) {
    if output.success {
        tracing::trace!(target: "tools", "Command succeeded");
    } else {
        tracing::debug!(target: "tools", "Command failed with exit code: {:?}", output.code);
        if !output.stderr.is_empty() {
            tracing::debug!(target: "tools", "Error: {}", output.stderr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_display_line_masks_secrets() {
        let cmd = ToolCommand::new("signtool")
            .arg("sign")
            .arg("/p")
            .secret_arg("hunter2")
            .path_arg(Path::new("cert.pfx"));
        let line = cmd.display_line();
        assert_eq!(line, "signtool sign /p **** cert.pfx");
        assert!(!line.contains("hunter2"));
    }

    #[test]
    fn test_failure_reason_prefers_stderr() {
        let output = ToolOutput {
            code: Some(1),
            success: false,
            stdout: "some output".to_string(),
            stderr: "bad manifest".to_string(),
        };
        assert_eq!(output.failure_reason(), "exit code 1: bad manifest");

        let output = ToolOutput {
            code: None,
            success: false,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert_eq!(output.failure_reason(), "exit code signal");
    }

    #[test]
    #[serial]
    fn test_missing_program_fails_to_start() {
        let result = ToolCommand::new("/definitely/not/a/real/tool").run_blocking();
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial]
    async fn test_run_reports_exit_status() {
        let ok = ToolCommand::new("sh").arg("-c").arg("exit 0").run().await.unwrap();
        assert!(ok.success);

        let failed = ToolCommand::new("sh").arg("-c").arg("echo oops >&2; exit 3").run().await.unwrap();
        assert!(!failed.success);
        assert_eq!(failed.code, Some(3));
        assert_eq!(failed.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial]
    async fn test_run_times_out() {
        let result = ToolCommand::new("sh")
            .arg("-c")
            .arg("sleep 5")
            .with_timeout(Some(Duration::from_millis(100)))
            .run()
            .await;
        assert!(result.is_err());
    }
}
