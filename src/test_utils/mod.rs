//! Test utilities for modelpack
//!
//! Helpers shared by unit tests and the integration test target: log setup, model
//! folder fixtures and a reader for produced packages.
//!
//! # Example
//!
//! ```rust,no_run
//! use modelpack_cli::test_utils::{ModelFolderFixture, package_entry_names};
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! let folder = ModelFolderFixture::onnx_model("gpt2").write_to(temp.path()).unwrap();
//! // ... assemble folder into out.msix ...
//! let names = package_entry_names(&temp.path().join("out.msix")).unwrap();
//! assert_eq!(names[0], "AppxManifest.xml");
//! ```

pub mod fixtures;

pub use fixtures::ModelFolderFixture;

use std::path::Path;
use std::sync::Once;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, else `RUST_LOG`;
/// with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Entry names of a produced package, in archive order
pub fn package_entry_names(package: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(package)
        .with_context(|| format!("Failed to open {}", package.display()))?;
    let mut archive = zip::ZipArchive::new(file).context("Not a zip container")?;
    (0..archive.len())
        .map(|i| Ok(archive.by_index(i)?.name().to_string()))
        .collect()
}

/// Content of one entry of a produced package
pub fn package_entry(package: &Path, name: &str) -> Result<Vec<u8>> {
    use std::io::Read;

    let file = std::fs::File::open(package)
        .with_context(|| format!("Failed to open {}", package.display()))?;
    let mut archive = zip::ZipArchive::new(file).context("Not a zip container")?;
    let mut entry = archive.by_name(name).with_context(|| format!("No entry {name}"))?;
    let mut content = Vec::new();
    entry.read_to_end(&mut content)?;
    Ok(content)
}

/// Write an executable shell script standing in for an SDK tool
///
/// The file is synced and closed before its mode changes so that executing it
/// right away cannot hit `ETXTBSY`.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(format!("#!/bin/sh\n{body}\n").as_bytes())?;
        file.sync_all()?;
    }
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
}
