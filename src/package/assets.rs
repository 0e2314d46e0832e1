//! Placeholder visual assets
//!
//! The standard manifest references three images. Packages built from model folders
//! rarely ship them, so a 1x1 PNG is written for each one that is missing. Existing
//! files are never touched.

use std::path::{Path, PathBuf};

use crate::core::ModelpackError;
use crate::manifest::{APP_LIST_LOGO, MEDIUM_TILE, STORE_LOGO};

/// Assets written by [`ensure_placeholder_assets`], relative to the package root
pub const PLACEHOLDER_ASSETS: [&str; 3] = [STORE_LOGO, MEDIUM_TILE, APP_LIST_LOGO];

/// A valid 1x1 RGBA PNG
pub const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0x60, 0xa8, 0xb8, 0xf2,
    0x1f, 0x00, 0x04, 0x14, 0x02, 0x4c, 0x8e, 0x45, 0x4d, 0x4d, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45,
    0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Write any missing placeholder asset under `source_folder`
///
/// Returns the paths that were created.
pub fn ensure_placeholder_assets(source_folder: &Path) -> Result<Vec<PathBuf>, ModelpackError> {
    let mut created = Vec::new();

    for relative in PLACEHOLDER_ASSETS {
        let path = source_folder.join(relative);
        if path.exists() {
            continue;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, PLACEHOLDER_PNG)?;
        tracing::debug!(target: "package", "Created placeholder asset {}", path.display());
        created.push(path);
    }

    Ok(created)
}
