//! Download a model without packaging it.
//!
//! ```bash
//! modelpack download https://huggingface.co/openai-community/gpt2/tree/main/onnx -o ./gpt2-onnx
//! modelpack download https://github.com/owner/repo/blob/main/model.onnx -o ./model
//! ```
//!
//! Ctrl-C stops the download after the chunk in flight; files already written are
//! kept.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use crate::acquire::{AcquisitionOutcome, Acquirer};
use crate::provider::{CancellationToken, DownloadProgress, ProviderEndpoints};
use crate::utils::DownloadReporter;

/// Command to download a folder or single file.
#[derive(Args)]
pub struct DownloadCommand {
    /// HuggingFace or GitHub URL of a repository, folder or file
    uri: String,

    /// Directory the files are written to
    #[arg(short, long)]
    output: PathBuf,
}

impl DownloadCommand {
    /// Execute the download command
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        let global = cli.load_global().await?;
        let endpoints = ProviderEndpoints::from_config(&global);

        let outcome = download_with_interrupt(&self.uri, &self.output, endpoints, cli).await;
        report_outcome(outcome, &self.output)?;
        Ok(())
    }
}

/// Run one acquisition with progress bars, cancelling it on Ctrl-C
pub(super) async fn download_with_interrupt(
    uri: &str,
    destination: &Path,
    endpoints: ProviderEndpoints,
    cli: &CliConfig,
) -> AcquisitionOutcome {
    let acquirer = Acquirer::new(endpoints);
    let token = CancellationToken::new();

    let interrupt = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!(target: "acquire", "Interrupted, stopping download");
                token.cancel();
            }
        })
    };

    println!("{} {}", "Downloading".cyan(), uri);
    let mut reporter = DownloadReporter::new(cli.show_progress());
    let outcome = acquirer
        .acquire_with_token(
            uri,
            destination,
            &mut |progress: &DownloadProgress| reporter.update(progress),
            token,
        )
        .await;
    reporter.finish();
    interrupt.abort();
    tracing::debug!(target: "acquire", "Progress reported for {} file(s)", reporter.files_seen());

    outcome
}

/// Print the outcome and turn the unusable ones into errors
///
/// Returns the downloaded files for completed and partial runs.
pub(super) fn report_outcome(outcome: AcquisitionOutcome, destination: &Path) -> Result<Vec<PathBuf>> {
    match outcome {
        AcquisitionOutcome::Completed {
            files,
        } => {
            println!(
                "{} Downloaded {} file(s) to {}",
                "✓".green(),
                files.len(),
                destination.display()
            );
            Ok(files)
        }
        AcquisitionOutcome::PartialFailure {
            files,
            failed,
        } => {
            println!(
                "{} Downloaded {} file(s) to {}, {} failed:",
                "!".yellow(),
                files.len(),
                destination.display(),
                failed.len()
            );
            for failure in &failed {
                println!("  {} {}: {}", "✗".red(), failure.path, failure.error);
            }
            Ok(files)
        }
        AcquisitionOutcome::Aborted {
            files,
        } => {
            bail!("Download cancelled after {} file(s)", files.len())
        }
        AcquisitionOutcome::Failed {
            phase,
            error,
        } => {
            tracing::debug!(target: "acquire", "Acquisition failed while {}", phase);
            Err(error.into())
        }
    }
}
