//! Command-line interface for modelpack.
//!
//! Each subcommand lives in its own module with its argument struct and an
//! `execute` method taking the shared [`CliConfig`].
//!
//! # Available Commands
//!
//! - `pack` - Package a local model folder into an `.msix` file
//! - `download` - Download a model folder or file from HuggingFace or GitHub
//! - `download-and-pack` - Download a model and package it in one step
//! - `config` - Manage the global configuration file
//!
//! # Examples
//!
//! ```bash
//! # Package a local folder
//! modelpack pack ./phi-3 -o ./out --publisher Contoso
//!
//! # Download an ONNX folder and package it, signing the result
//! modelpack download-and-pack https://huggingface.co/openai-community/gpt2/tree/main/onnx \
//!     -o ./out --sign ./cert.pfx --password secret
//!
//! # Only download
//! modelpack download https://github.com/microsoft/onnxruntime/tree/main/docs -o ./docs
//! ```
//!
//! # Output
//!
//! Status lines go to stdout. Diagnostics go through `tracing` to stderr; their
//! level is chosen with `--verbose` / `--quiet` and can always be overridden with
//! `RUST_LOG`.

mod config;
mod download;
mod download_and_pack;
mod pack;


use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::GlobalConfig;
use crate::utils::progress::is_progress_disabled;

/// Runtime configuration for CLI execution.
///
/// Built from the global flags and handed to every command. Nothing here is written
/// back into the process environment.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Default log filter when `RUST_LOG` is not set
    pub log_level: Option<String>,

    /// Disable progress bars
    pub no_progress: bool,

    /// Global configuration file to use instead of the default location
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the tracing subscriber
    ///
    /// `RUST_LOG` wins over [`CliConfig::log_level`]. Calling this more than once
    /// is harmless; later calls are ignored.
    pub fn init_logging(&self) {
        let default_level = self.log_level.as_deref().unwrap_or("warn");
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Whether progress bars should be drawn
    #[must_use]
    pub fn show_progress(&self) -> bool {
        !self.no_progress && !is_progress_disabled()
    }

    /// Load the global configuration this run should use
    pub async fn load_global(&self) -> Result<GlobalConfig> {
        GlobalConfig::load_with_optional(self.config_path.clone()).await
    }
}

/// Package AI model folders into MSIX containers.
#[derive(Parser)]
#[command(
    name = "modelpack",
    about = "Package AI models from local folders, HuggingFace or GitHub into MSIX containers",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global configuration file
    ///
    /// Defaults to `MODELPACK_CONFIG`, then `~/.modelpack/config.toml`.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable progress bars
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Package a local folder into an MSIX file.
    ///
    /// A manifest and placeholder images are created in the folder when missing.
    Pack(pack::PackCommand),

    /// Download a model folder or file without packaging it.
    Download(download::DownloadCommand),

    /// Download a model from HuggingFace or GitHub and package it.
    DownloadAndPack(download_and_pack::DownloadAndPackCommand),

    /// Manage the global configuration file.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Execute the parsed command line
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`]
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit configuration
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Pack(cmd) => cmd.execute(&config).await,
            Commands::Download(cmd) => cmd.execute(&config).await,
            Commands::DownloadAndPack(cmd) => cmd.execute(&config).await,
            Commands::Config(cmd) => cmd.execute(config.config_path.clone()).await,
        }
    }
}
