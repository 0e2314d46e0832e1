//! Download a model and package it in one step.
//!
//! ```bash
//! modelpack download-and-pack https://huggingface.co/openai-community/gpt2/tree/main/onnx -o ./out
//! modelpack download-and-pack https://github.com/owner/repo -o ./out --download-dir ./repo --sign cert.pfx
//! ```
//!
//! Files are downloaded into a temporary directory that is removed afterwards,
//! unless `--download-dir` names a directory to keep. A partial download is still
//! packaged; a cancelled or failed one is not.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use super::download::{download_with_interrupt, report_outcome};
use super::pack::{PackageOptions, package_folder};
use crate::core::ModelpackError;
use crate::manifest::PackageIdentity;
use crate::provider::ProviderEndpoints;
use crate::source::resolve;

/// Command to download a model and package it.
#[derive(Args)]
pub struct DownloadAndPackCommand {
    /// HuggingFace or GitHub URL of a repository, folder or file
    uri: String,

    /// Output file, or directory to place `{publisher}_{name}.msix` in
    #[arg(short, long)]
    output: PathBuf,

    /// Keep the downloaded files in this directory
    #[arg(long)]
    download_dir: Option<PathBuf>,

    #[command(flatten)]
    options: PackageOptions,
}

impl DownloadAndPackCommand {
    /// Execute the download-and-pack command
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        self.options.validate_certificate()?;

        let descriptor = resolve(&self.uri);
        if !descriptor.is_supported() {
            return Err(ModelpackError::UnsupportedUri {
                uri: self.uri.clone(),
            }
            .into());
        }

        let global = cli.load_global().await?;
        let endpoints = ProviderEndpoints::from_config(&global);

        let (workspace, _temp_dir) = match &self.download_dir {
            Some(dir) => (dir.clone(), None),
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("modelpack-")
                    .tempdir()
                    .context("Failed to create temporary download directory")?;
                (temp.path().to_path_buf(), Some(temp))
            }
        };
        tracing::debug!(target: "acquire", "Downloading {} into {}", descriptor, workspace.display());

        let outcome = download_with_interrupt(&self.uri, &workspace, endpoints, cli).await;
        let partial = matches!(outcome, crate::acquire::AcquisitionOutcome::PartialFailure { .. });
        report_outcome(outcome, &workspace)?;
        if partial {
            println!("{} Packaging the files that were downloaded", "!".yellow());
        }

        let publisher = self.options.publisher.clone().or_else(|| global.default_publisher.clone());
        let identity = PackageIdentity::for_repository(&descriptor, self.options.name.clone(), publisher);

        package_folder(&workspace, &self.output, &identity, &self.options, &global).await?;

        if self.download_dir.is_some() {
            println!("Downloaded files kept in {}", workspace.display());
        }
        Ok(())
    }
}
