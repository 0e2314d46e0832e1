//! Assembly of local folders through the library API

use std::path::Path;
use std::sync::Arc;

use modelpack_cli::core::ModelpackError;
use modelpack_cli::manifest::{MANIFEST_FILE_NAME, ManifestKind, PackageIdentity};
use modelpack_cli::package::{
    Assembler, AssemblyPlan, AssemblyStrategy, DegradedStrategy, ProgrammaticStrategy,
    StrategyKind,
};
use modelpack_cli::test_utils::{ModelFolderFixture, package_entry, package_entry_names};
use modelpack_cli::tools::ToolLocator;
use tempfile::TempDir;

/// Locator that never finds anything
struct NoTools;

impl ToolLocator for NoTools {
    fn find_assembly_tool(&self) -> Option<std::path::PathBuf> {
        None
    }

    fn find_signing_tool(&self) -> Option<std::path::PathBuf> {
        None
    }
}

/// Strategy that always fails
struct Broken(StrategyKind);

impl AssemblyStrategy for Broken {
    fn kind(&self) -> StrategyKind {
        self.0
    }

    fn try_assemble(&self, _plan: &AssemblyPlan, output: &Path) -> Result<(), ModelpackError> {
        std::fs::write(output, b"garbage").unwrap();
        Err(ModelpackError::StrategyFailed {
            strategy: self.0.to_string(),
            reason: "simulated".to_string(),
        })
    }
}

#[test]
fn test_standard_chain_packages_model_folder() {
    let temp = TempDir::new().unwrap();
    let source = ModelFolderFixture::onnx_model("gpt2").write_to(temp.path()).unwrap();
    let output = temp.path().join("gpt2.msix");
    let identity = PackageIdentity::new("gpt2", "openai community");

    let report = Assembler::standard(Arc::new(NoTools)).assemble(&source, &output, &identity).unwrap();

    assert_eq!(report.strategy, StrategyKind::Programmatic);
    assert!(report.manifest_synthesized);
    assert_eq!(report.assets_created.len(), 3);

    let names = package_entry_names(&output).unwrap();
    assert_eq!(names[0], MANIFEST_FILE_NAME);
    for expected in [
        "model.onnx",
        "config.json",
        "tokenizer/vocab.json",
        "Images/StoreLogo.png",
        "Images/MedTile.png",
        "Images/AppList.png",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {expected} in {names:?}");
    }
    assert_eq!(report.entry_count, names.len());

    let manifest = String::from_utf8(package_entry(&output, MANIFEST_FILE_NAME).unwrap()).unwrap();
    assert!(manifest.contains("Name=\"gpt2ModelPackage\""));
    assert!(manifest.contains("Publisher=\"CN=openai_community\""));
    assert!(manifest.contains("\r\n"));
}

#[test]
fn test_existing_manifest_is_kept_verbatim() {
    let temp = TempDir::new().unwrap();
    let manifest = "<Package>custom</Package>";
    let source = ModelFolderFixture::onnx_model("custom")
        .with_manifest(manifest)
        .write_to(temp.path())
        .unwrap();
    let output = temp.path().join("custom.msix");

    let report = Assembler::new()
        .with_strategy(ProgrammaticStrategy)
        .assemble(&source, &output, &PackageIdentity::new("ignored", "ignored"))
        .unwrap();

    assert!(!report.manifest_synthesized);
    assert_eq!(std::fs::read_to_string(source.join(MANIFEST_FILE_NAME)).unwrap(), manifest);
    assert_eq!(package_entry(&output, MANIFEST_FILE_NAME).unwrap(), manifest.as_bytes());
}

#[test]
fn test_falls_back_to_degraded_container() {
    let temp = TempDir::new().unwrap();
    let source = ModelFolderFixture::onnx_model("fallback").write_to(temp.path()).unwrap();
    let output = temp.path().join("fallback.msix");

    let report = Assembler::new()
        .with_strategy(Broken(StrategyKind::Programmatic))
        .with_strategy(Broken(StrategyKind::ExternalTool))
        .with_strategy(DegradedStrategy)
        .assemble(&source, &output, &PackageIdentity::new("fallback", "Contoso"))
        .unwrap();

    assert_eq!(report.strategy, StrategyKind::Degraded);
    let names = package_entry_names(&output).unwrap();
    assert_eq!(names[0], MANIFEST_FILE_NAME);
    assert!(names.iter().any(|n| n == "tokenizer/"));
    assert!(names.iter().any(|n| n == "tokenizer/vocab.json"));
}

#[test]
fn test_all_strategies_failing_reports_each_attempt() {
    let temp = TempDir::new().unwrap();
    let source = ModelFolderFixture::onnx_model("broken").write_to(temp.path()).unwrap();
    let output = temp.path().join("broken.msix");

    let err = Assembler::new()
        .with_strategy(Broken(StrategyKind::Programmatic))
        .with_strategy(Broken(StrategyKind::ExternalTool))
        .with_strategy(Broken(StrategyKind::Degraded))
        .assemble(&source, &output, &PackageIdentity::new("broken", "Contoso"))
        .unwrap_err();

    match err {
        ModelpackError::AssemblyFailed {
            attempted,
            ..
        } => {
            assert_eq!(attempted.len(), 3);
            assert!(attempted[0].starts_with("Programmatic"));
            assert!(attempted[1].starts_with("ExternalTool"));
            assert!(attempted[2].starts_with("Degraded"));
        }
        other => panic!("Expected AssemblyFailed, got {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_output_inside_source_is_not_packaged() {
    let temp = TempDir::new().unwrap();
    let source = ModelFolderFixture::onnx_model("selfref").write_to(temp.path()).unwrap();
    let output = source.join("selfref.msix");
    std::fs::write(&output, b"stale artifact").unwrap();

    Assembler::new()
        .with_strategy(ProgrammaticStrategy)
        .assemble(&source, &output, &PackageIdentity::new("selfref", "Contoso"))
        .unwrap();

    let names = package_entry_names(&output).unwrap();
    assert!(!names.iter().any(|n| n.ends_with(".msix")), "{names:?}");
}

#[test]
fn test_framework_manifest() {
    let temp = TempDir::new().unwrap();
    let source = ModelFolderFixture::new("runtime")
        .with_file("bin/runtime.dll", b"dll")
        .write_to(temp.path())
        .unwrap();
    let output = temp.path().join("runtime.msix");

    Assembler::new()
        .with_strategy(ProgrammaticStrategy)
        .with_manifest_kind(ManifestKind::Framework)
        .assemble(&source, &output, &PackageIdentity::new("runtime", "Contoso"))
        .unwrap();

    let manifest = std::fs::read_to_string(source.join(MANIFEST_FILE_NAME)).unwrap();
    assert!(manifest.contains("<Framework>true</Framework>"));
    assert!(!manifest.contains("<Applications>"));
}
