use std::path::Path;

use zip::CompressionMethod;

use super::archive::{ArchiveLayout, write_archive};
use super::{AssemblyPlan, AssemblyStrategy, StrategyKind};
use crate::core::ModelpackError;

/// Builds the package in-process as a deflated zip container
///
/// Entries are written in plan order, so the manifest is always first and the rest
/// mirror the source tree with forward-slash paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgrammaticStrategy;

impl AssemblyStrategy for ProgrammaticStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Programmatic
    }

    fn try_assemble(&self, plan: &AssemblyPlan, output: &Path) -> Result<(), ModelpackError> {
        write_archive(
            plan,
            output,
            ArchiveLayout {
                compression: CompressionMethod::Deflated,
                directory_entries: false,
            },
        )
        .map_err(|reason| ModelpackError::StrategyFailed {
            strategy: self.kind().to_string(),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::MANIFEST_FILE_NAME;
    use std::collections::BTreeSet;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_writes_manifest_first_and_every_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        std::fs::create_dir_all(source.join("onnx/sub")).unwrap();
        std::fs::write(source.join(MANIFEST_FILE_NAME), b"<Package/>").unwrap();
        std::fs::write(source.join("onnx/model.onnx"), b"weights").unwrap();
        std::fs::write(source.join("onnx/sub/extra.bin"), b"extra").unwrap();
        std::fs::write(source.join("config.json"), b"{}").unwrap();

        let plan = AssemblyPlan::collect(&source, None).unwrap();
        let output = temp.path().join("out.msix");
        ProgrammaticStrategy.try_assemble(&plan, &output).unwrap();

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&output).unwrap()).unwrap();
        assert_eq!(archive.by_index(0).unwrap().name(), MANIFEST_FILE_NAME);

        let names: BTreeSet<String> = (1..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        let expected: BTreeSet<String> = ["config.json", "onnx/model.onnx", "onnx/sub/extra.bin"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, expected);

        let mut content = String::new();
        archive.by_name("onnx/model.onnx").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "weights");
        assert_eq!(
            archive.by_name("onnx/model.onnx").unwrap().compression(),
            CompressionMethod::Deflated
        );
    }

    #[test]
    fn test_unwritable_output_fails() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(MANIFEST_FILE_NAME), b"<Package/>").unwrap();
        let plan = AssemblyPlan::collect(temp.path(), None).unwrap();

        let err = ProgrammaticStrategy
            .try_assemble(&plan, &temp.path().join("missing-dir").join("out.msix"))
            .unwrap_err();
        assert!(matches!(err, ModelpackError::StrategyFailed { .. }));
    }
}
