//! Package a local folder into an MSIX file.
//!
//! # Examples
//!
//! ```bash
//! modelpack pack ./models/phi-3 -o ./out
//! modelpack pack ./models/phi-3 -o ./out/phi3.msix --name Phi3 --publisher Contoso
//! modelpack pack ./models/phi-3 -o ./out --sign ./cert.pfx --password secret
//! modelpack pack ./runtime -o ./out --framework
//! ```
//!
//! Names that are not given are inferred: the package from the folder name and the
//! publisher from `default_publisher` in the global config, else the parent
//! folder name.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use crate::config::GlobalConfig;
use crate::core::ModelpackError;
use crate::manifest::{ManifestKind, PackageIdentity};
use crate::package::{Assembler, AssemblyReport, resolve_output_path};
use crate::signing::{PackageSigner, SignTool};
use crate::tools::SdkToolLocator;

/// Options shared by every command that produces a package
#[derive(Args, Debug, Clone, Default)]
pub(super) struct PackageOptions {
    /// Package name (defaults to the model name)
    #[arg(long)]
    pub name: Option<String>,

    /// Publisher name
    #[arg(long)]
    pub publisher: Option<String>,

    /// Synthesize a framework package manifest instead of an application one
    #[arg(long)]
    pub framework: bool,

    /// Sign the package with this PFX certificate
    #[arg(long, value_name = "CERT")]
    pub sign: Option<PathBuf>,

    /// Password for the signing certificate
    #[arg(long, requires = "sign")]
    pub password: Option<String>,
}

impl PackageOptions {
    pub(super) const fn manifest_kind(&self) -> ManifestKind {
        if self.framework {
            ManifestKind::Framework
        } else {
            ManifestKind::Standard
        }
    }

    /// Reject a missing certificate before any work starts
    pub(super) fn validate_certificate(&self) -> Result<()> {
        if let Some(cert) = &self.sign {
            if !cert.is_file() {
                return Err(ModelpackError::CertificateNotFound {
                    path: cert.display().to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Command to package a local folder.
#[derive(Args)]
pub struct PackCommand {
    /// Folder containing the model files
    input: PathBuf,

    /// Output file, or directory to place `{publisher}_{name}.msix` in
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    options: PackageOptions,
}

impl PackCommand {
    /// Execute the pack command
    pub async fn execute(self, cli: &CliConfig) -> Result<()> {
        self.options.validate_certificate()?;
        if !self.input.is_dir() {
            return Err(ModelpackError::InvalidSourceFolder {
                path: self.input.display().to_string(),
            }
            .into());
        }

        let global = cli.load_global().await?;
        let publisher = self.options.publisher.clone().or_else(|| global.default_publisher.clone());
        let identity = PackageIdentity::for_folder(&self.input, self.options.name.clone(), publisher);

        package_folder(&self.input, &self.output, &identity, &self.options, &global).await?;
        Ok(())
    }
}

/// Assemble `source` into a package and sign it when requested
///
/// Returns the artifact path. On signing failure the unsigned artifact is kept and
/// its path printed before the error is returned.
pub(super) async fn package_folder(
    source: &Path,
    output: &Path,
    identity: &PackageIdentity,
    options: &PackageOptions,
    global: &GlobalConfig,
) -> Result<PathBuf> {
    let output = resolve_output_path(output, identity)
        .with_context(|| format!("Failed to prepare output location {}", output.display()))?;

    println!(
        "{} {} as {} (publisher {})",
        "Packaging".cyan(),
        source.display(),
        identity.package_name,
        identity.publisher_name
    );

    let locator = Arc::new(SdkToolLocator::from_config(global));
    let assembler = Assembler::standard(locator.clone()).with_manifest_kind(options.manifest_kind());
    let report = {
        let source = source.to_path_buf();
        let output = output.clone();
        let identity = identity.clone();
        tokio::task::spawn_blocking(move || assembler.assemble(&source, &output, &identity))
            .await
            .context("Packaging task panicked")??
    };
    print_report(&report);

    if let Some(cert) = &options.sign {
        let signer = SignTool::locate(locator.as_ref())?;
        tracing::debug!(target: "signing", "Signing {} with {}", report.output.display(), signer.path().display());
        if let Err(e) = signer.sign(&report.output, cert, options.password.as_deref()).await {
            println!("{} Unsigned package left at {}", "!".yellow(), report.output.display());
            return Err(e.into());
        }
        println!("{} Signed {}", "✓".green(), report.output.display());
    }

    Ok(report.output)
}

fn print_report(report: &AssemblyReport) {
    if report.manifest_synthesized {
        println!("  Created AppxManifest.xml");
    }
    for asset in &report.assets_created {
        println!("  Created {}", asset.display());
    }
    println!(
        "{} Created {} ({} entries, {} assembly)",
        "✓".green(),
        report.output.display(),
        report.entry_count,
        report.strategy
    );
}
