//! Container assembly
//!
//! [`Assembler::assemble`] turns a local folder into a single `.msix` artifact:
//!
//! 1. Make sure `AppxManifest.xml` exists at the folder root, synthesizing it when
//!    absent. A manifest supplied by the user is never modified.
//! 2. Write any missing placeholder images.
//! 3. Build an [`AssemblyPlan`]: the manifest first, then every other regular file in
//!    depth-first order, sorted by name within each directory.
//! 4. Try each [`AssemblyStrategy`] in order until one succeeds. A failed strategy
//!    is logged, its partial output removed, and the next one starts from scratch.
//!
//! The default chain is [`ProgrammaticStrategy`] (deflated zip written in-process),
//! [`ExternalToolStrategy`] (`makeappx pack`) and [`DegradedStrategy`] (stored zip with
//! explicit directory entries).

mod archive;
mod assets;
mod degraded;
mod external;
mod programmatic;

pub use assets::{PLACEHOLDER_ASSETS, PLACEHOLDER_PNG, ensure_placeholder_assets};
pub use degraded::DegradedStrategy;
pub use external::ExternalToolStrategy;
pub use programmatic::ProgrammaticStrategy;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::core::ModelpackError;
use crate::manifest::{MANIFEST_FILE_NAME, ManifestKind, PackageIdentity, synthesize};
use crate::tools::ToolLocator;
use crate::utils::platform::container_path;

/// Extension of the produced artifact
pub const PACKAGE_EXTENSION: &str = "msix";

/// One file placed in the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEntry {
    /// Path inside the container, forward-slash separated
    pub relative_path: String,
    /// File on disk
    pub source: PathBuf,
}

/// Everything a strategy needs to build the artifact
#[derive(Debug, Clone)]
pub struct AssemblyPlan {
    /// Root of the source tree
    pub source_folder: PathBuf,
    /// The manifest, always written first
    pub manifest: ContainerEntry,
    /// Every other regular file, in deterministic depth-first order
    pub files: Vec<ContainerEntry>,
}

impl AssemblyPlan {
    /// Walk `source_folder` and plan the container
    ///
    /// `exclude` (normally the output artifact) is skipped if it lies inside the
    /// tree. The root manifest must already exist.
    ///
    /// # Errors
    ///
    /// Fails when the tree cannot be walked.
    pub fn collect(source_folder: &Path, exclude: Option<&Path>) -> Result<Self, ModelpackError> {
        let source_folder =
            std::path::absolute(source_folder).unwrap_or_else(|_| source_folder.to_path_buf());
        let exclude = exclude.map(|p| std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf()));
        let manifest_path = source_folder.join(MANIFEST_FILE_NAME);

        let mut files = Vec::new();
        for entry in WalkDir::new(&source_folder).sort_by_file_name() {
            let entry = entry.map_err(|e| ModelpackError::Other {
                message: format!("Failed to read {}: {e}", source_folder.display()),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path == manifest_path || exclude.as_deref() == Some(path) {
                continue;
            }
            let Ok(relative) = path.strip_prefix(&source_folder) else {
                continue;
            };
            files.push(ContainerEntry {
                relative_path: container_path(relative),
                source: path.to_path_buf(),
            });
        }

        Ok(Self {
            manifest: ContainerEntry {
                relative_path: MANIFEST_FILE_NAME.to_string(),
                source: manifest_path,
            },
            source_folder,
            files,
        })
    }

    /// All entries in write order, manifest first
    pub fn entries(&self) -> impl Iterator<Item = &ContainerEntry> {
        std::iter::once(&self.manifest).chain(self.files.iter())
    }
}

/// Names of the available strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// In-process compressed writer
    Programmatic,
    /// External packaging executable
    ExternalTool,
    /// Uncompressed fallback writer
    Degraded,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Programmatic => write!(f, "Programmatic"),
            Self::ExternalTool => write!(f, "ExternalTool"),
            Self::Degraded => write!(f, "Degraded"),
        }
    }
}

/// One way of producing the artifact from a plan
pub trait AssemblyStrategy: Send + Sync {
    /// Strategy name
    fn kind(&self) -> StrategyKind;

    /// Write the complete artifact to `output`
    ///
    /// # Errors
    ///
    /// Any error moves the assembler on to the next strategy.
    fn try_assemble(&self, plan: &AssemblyPlan, output: &Path) -> Result<(), ModelpackError>;
}

/// What a successful assembly produced
#[derive(Debug, Clone)]
pub struct AssemblyReport {
    /// The artifact
    pub output: PathBuf,
    /// Strategy that produced it
    pub strategy: StrategyKind,
    /// Whether the manifest was synthesized for this run
    pub manifest_synthesized: bool,
    /// Placeholder assets created for this run
    pub assets_created: Vec<PathBuf>,
    /// Number of container entries, manifest included
    pub entry_count: usize,
}

/// Ordered chain of assembly strategies
///
/// # Examples
///
/// ```rust,no_run
/// use modelpack_cli::manifest::PackageIdentity;
/// use modelpack_cli::package::{Assembler, DegradedStrategy, ProgrammaticStrategy};
/// use std::path::Path;
///
/// let assembler = Assembler::new()
///     .with_strategy(ProgrammaticStrategy)
///     .with_strategy(DegradedStrategy);
/// let identity = PackageIdentity::new("MyModel", "Contoso");
/// let report = assembler.assemble(Path::new("model"), Path::new("out.msix"), &identity)?;
/// println!("built with {}", report.strategy);
/// # Ok::<(), modelpack_cli::core::ModelpackError>(())
/// ```
#[derive(Default)]
pub struct Assembler {
    strategies: Vec<Box<dyn AssemblyStrategy>>,
    manifest_kind: ManifestKind,
}

impl fmt::Debug for Assembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<StrategyKind> = self.strategies.iter().map(|s| s.kind()).collect();
        f.debug_struct("Assembler")
            .field("strategies", &kinds)
            .field("manifest_kind", &self.manifest_kind)
            .finish()
    }
}

impl Assembler {
    /// Assembler with no strategies
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard chain: programmatic, external tool, degraded
    #[must_use]
    pub fn standard(locator: Arc<dyn ToolLocator>) -> Self {
        Self::new()
            .with_strategy(ProgrammaticStrategy)
            .with_strategy(ExternalToolStrategy::new(locator))
            .with_strategy(DegradedStrategy)
    }

    /// Append a strategy to the chain
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl AssemblyStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Template used when the manifest has to be synthesized
    #[must_use]
    pub const fn with_manifest_kind(mut self, kind: ManifestKind) -> Self {
        self.manifest_kind = kind;
        self
    }

    /// Strategies in the order they will be tried
    #[must_use]
    pub fn strategies(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Build the artifact for `source_folder` at `output`
    ///
    /// # Errors
    ///
    /// - [`ModelpackError::InvalidSourceFolder`] if the folder does not exist
    /// - [`ModelpackError::ManifestWriteFailed`] if the manifest or assets cannot be written
    /// - [`ModelpackError::AssemblyFailed`] if every strategy failed
    pub fn assemble(
        &self,
        source_folder: &Path,
        output: &Path,
        identity: &PackageIdentity,
    ) -> Result<AssemblyReport, ModelpackError> {
        if !source_folder.is_dir() {
            return Err(ModelpackError::InvalidSourceFolder {
                path: source_folder.display().to_string(),
            });
        }

        let manifest_synthesized = self.ensure_manifest(source_folder, identity)?;
        let assets_created = ensure_placeholder_assets(source_folder).map_err(|e| {
            ModelpackError::ManifestWriteFailed {
                path: source_folder.join("Images").display().to_string(),
                reason: e.to_string(),
            }
        })?;

        remove_output(output);
        let plan = AssemblyPlan::collect(source_folder, Some(output))?;
        let entry_count = plan.files.len() + 1;
        tracing::info!(
            target: "package",
            "Packaging {} files from {} into {}",
            entry_count,
            plan.source_folder.display(),
            output.display()
        );

        let mut attempted = Vec::new();
        for strategy in &self.strategies {
            let kind = strategy.kind();
            tracing::debug!(target: "package", "Trying {} assembly", kind);

            match strategy.try_assemble(&plan, output) {
                Ok(()) => {
                    tracing::info!(target: "package", "Created {} using {} assembly", output.display(), kind);
                    return Ok(AssemblyReport {
                        output: output.to_path_buf(),
                        strategy: kind,
                        manifest_synthesized,
                        assets_created,
                        entry_count,
                    });
                }
                Err(error) => {
                    tracing::warn!(target: "package", "{} assembly failed: {}", kind, error);
                    remove_output(output);
                    attempted.push(format!("{kind}: {error}"));
                }
            }
        }

        Err(ModelpackError::AssemblyFailed {
            output: output.display().to_string(),
            attempted,
        })
    }

    fn ensure_manifest(
        &self,
        source_folder: &Path,
        identity: &PackageIdentity,
    ) -> Result<bool, ModelpackError> {
        let manifest_path = source_folder.join(MANIFEST_FILE_NAME);
        if manifest_path.exists() {
            tracing::info!(
                target: "package",
                "Using existing {} from {}",
                MANIFEST_FILE_NAME,
                source_folder.display()
            );
            return Ok(false);
        }

        let content = synthesize(identity, self.manifest_kind)?;
        std::fs::write(&manifest_path, content).map_err(|e| ModelpackError::ManifestWriteFailed {
            path: manifest_path.display().to_string(),
            reason: e.to_string(),
        })?;
        tracing::info!(target: "package", "Created {}", manifest_path.display());
        Ok(true)
    }
}

fn remove_output(output: &Path) {
    if output.is_file() {
        if let Err(e) = std::fs::remove_file(output) {
            tracing::warn!(target: "package", "Failed to remove {}: {}", output.display(), e);
        }
    }
}

/// Work out where the artifact goes
///
/// An existing directory, or a path without an extension, is treated as a
/// directory: it is created if needed and the artifact is named
/// `{publisher}_{package}.msix` from the sanitized identity. Otherwise the path is
/// the artifact itself and its parent directory is created.
///
/// # Errors
///
/// Fails when a directory cannot be created.
pub fn resolve_output_path(
    output: &Path,
    identity: &PackageIdentity,
) -> Result<PathBuf, ModelpackError> {
    if output.is_dir() || output.extension().is_none() {
        std::fs::create_dir_all(output)?;
        let file_name = format!(
            "{}_{}.{PACKAGE_EXTENSION}",
            identity.publisher_name, identity.package_name
        );
        return Ok(output.join(file_name));
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(output.to_path_buf())
}
