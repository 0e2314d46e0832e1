use std::path::Path;

use zip::CompressionMethod;

use super::archive::{ArchiveLayout, write_archive};
use super::{AssemblyPlan, AssemblyStrategy, StrategyKind};
use crate::core::ModelpackError;

/// Last-resort writer producing an uncompressed container
///
/// Every subdirectory gets its own directory entry (`tokenizer/`, `Images/`)
/// ahead of its files, which is how this writer renders nested storages inside
/// the container. Unlike the other strategies, the entries after the manifest
/// are therefore the regular files plus one trailing-slash entry per
/// subdirectory. File entries still mirror the source tree exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct DegradedStrategy;

impl AssemblyStrategy for DegradedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Degraded
    }

    fn try_assemble(&self, plan: &AssemblyPlan, output: &Path) -> Result<(), ModelpackError> {
        tracing::warn!(
            target: "package",
            "Building {} without compression",
            output.display()
        );
        write_archive(
            plan,
            output,
            ArchiveLayout {
                compression: CompressionMethod::Stored,
                directory_entries: true,
            },
        )
        .map_err(|reason| ModelpackError::StrategyFailed {
            strategy: self.kind().to_string(),
            reason,
        })
    }
}
