//! Common test utilities for modelpack integration tests
//!
//! [`TestProject`] owns a temporary working directory and an isolated global config
//! file, and runs the compiled `modelpack` binary against them.

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Isolated working area for one test
pub struct TestProject {
    _temp_dir: TempDir,
    work_dir: PathBuf,
    config_path: PathBuf,
}

impl TestProject {
    /// Create a new project with an empty config location
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let work_dir = temp_dir.path().join("work");
        fs::create_dir_all(&work_dir)?;
        let config_path = temp_dir.path().join("config").join("config.toml");

        Ok(Self {
            _temp_dir: temp_dir,
            work_dir,
            config_path,
        })
    }

    /// Working directory commands run in
    pub fn work_path(&self) -> &Path {
        &self.work_dir
    }

    /// Global config file passed through `MODELPACK_CONFIG`
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Write the global config file
    pub fn write_config(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.config_path, content)
            .with_context(|| format!("Failed to write config to {:?}", self.config_path))?;
        Ok(())
    }

    /// Config pointing every host at a mock server
    pub fn write_mock_config(&self, base_url: &str) -> Result<()> {
        self.write_config(&format!(
            "huggingface_endpoint = \"{base_url}\"\n\
             github_api_endpoint = \"{base_url}\"\n\
             github_raw_endpoint = \"{base_url}\"\n"
        ))
    }

    /// Run modelpack in the working directory
    pub fn run_modelpack(&self, args: &[&str]) -> Result<CommandOutput> {
        let binary = env!("CARGO_BIN_EXE_modelpack");
        let output = Command::new(binary)
            .args(args)
            .current_dir(&self.work_dir)
            .env("MODELPACK_CONFIG", &self.config_path)
            .env("MODELPACK_NO_PROGRESS", "1")
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            // Keep real SDK tools out of the way
            .env("MODELPACK_MAKEAPPX", self.work_dir.join("no-makeappx"))
            .env("MODELPACK_SIGNTOOL", self.work_dir.join("no-signtool"))
            .output()
            .context("Failed to run modelpack command")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStdout: {}\nStderr: {}",
            self.code, self.stdout, self.stderr
        );
        self
    }

    /// Assert the command failed with exit code 1
    pub fn assert_failure(&self) -> &Self {
        assert!(!self.success, "Command unexpectedly succeeded\nStdout: {}", self.stdout);
        assert_eq!(self.code, Some(1), "Stderr: {}", self.stderr);
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

/// File assertion helpers
pub struct FileAssert;

impl FileAssert {
    /// Assert a file exists
    pub fn exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert a file does not exist
    pub fn not_exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(!path.exists(), "Expected file to not exist: {}", path.display());
    }

    /// Assert a file contains specific content
    pub fn contains(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
        assert!(
            content.contains(expected),
            "Expected file {} to contain '{}'\nActual content: {}",
            path.display(),
            expected,
            content
        );
    }
}
