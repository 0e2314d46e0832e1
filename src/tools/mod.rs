//! Locating and running Windows SDK tools
//!
//! Two external tools are used: `makeappx.exe` for the external assembly strategy
//! and `signtool.exe` for signing. [`ToolLocator`] is the seam the rest of the crate
//! depends on; [`SdkToolLocator`] is the real implementation.
//!
//! # Search Order
//!
//! 1. Path configured in the global config (`makeappx_path` / `signtool_path`)
//! 2. `MODELPACK_MAKEAPPX` / `MODELPACK_SIGNTOOL` environment variables
//! 3. The tool on `PATH`
//! 4. The newest `Windows Kits\10\bin\<version>\x64` directory

mod command;

pub use command::{ToolCommand, ToolOutput};

use std::path::{Path, PathBuf};

use crate::config::GlobalConfig;

/// Environment variable overriding the makeappx location
pub const MAKEAPPX_ENV: &str = "MODELPACK_MAKEAPPX";

/// Environment variable overriding the signtool location
pub const SIGNTOOL_ENV: &str = "MODELPACK_SIGNTOOL";

/// Finds external tools on the local machine
pub trait ToolLocator: Send + Sync {
    /// Path to the packaging tool, if installed
    fn find_assembly_tool(&self) -> Option<PathBuf>;

    /// Path to the signing tool, if installed
    fn find_signing_tool(&self) -> Option<PathBuf>;
}

/// One tool the locator knows how to find
#[derive(Debug, Clone, Copy)]
struct ToolSpec {
    name: &'static str,
    env: &'static str,
}

const MAKEAPPX: ToolSpec = ToolSpec {
    name: "makeappx",
    env: MAKEAPPX_ENV,
};

const SIGNTOOL: ToolSpec = ToolSpec {
    name: "signtool",
    env: SIGNTOOL_ENV,
};

/// Locator that searches configuration, environment, `PATH` and the Windows SDK
#[derive(Debug, Clone, Default)]
pub struct SdkToolLocator {
    makeappx_override: Option<PathBuf>,
    signtool_override: Option<PathBuf>,
    kits_root: Option<PathBuf>,
}

impl SdkToolLocator {
    /// Locator with no configured overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator using the tool paths from the global configuration
    #[must_use]
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            makeappx_override: config.makeappx_path.clone(),
            signtool_override: config.signtool_path.clone(),
            kits_root: None,
        }
    }

    /// Search a specific `Windows Kits\10\bin` directory instead of the default
    #[must_use]
    pub fn with_kits_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.kits_root = Some(root.into());
        self
    }

    fn find(&self, spec: ToolSpec, configured: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = configured {
            if path.is_file() {
                tracing::debug!(target: "tools", "Using configured {}: {}", spec.name, path.display());
                return Some(path.to_path_buf());
            }
            tracing::warn!(
                target: "tools",
                "Configured {} does not exist: {}",
                spec.name,
                path.display()
            );
        }

        if let Some(path) = std::env::var_os(spec.env).map(PathBuf::from) {
            if path.is_file() {
                tracing::debug!(target: "tools", "Using {} from {}: {}", spec.name, spec.env, path.display());
                return Some(path);
            }
            tracing::warn!(target: "tools", "{} points to a missing file: {}", spec.env, path.display());
        }

        if let Ok(path) = which::which(spec.name) {
            tracing::debug!(target: "tools", "Found {} on PATH: {}", spec.name, path.display());
            return Some(path);
        }

        let root = self.kits_root.clone().or_else(default_kits_root)?;
        let found = scan_windows_kits(&root, &format!("{}.exe", spec.name));
        match &found {
            Some(path) => {
                tracing::debug!(target: "tools", "Found {} in Windows SDK: {}", spec.name, path.display());
            }
            None => tracing::debug!(target: "tools", "{} not found", spec.name),
        }
        found
    }
}

impl ToolLocator for SdkToolLocator {
    fn find_assembly_tool(&self) -> Option<PathBuf> {
        self.find(MAKEAPPX, self.makeappx_override.as_deref())
    }

    fn find_signing_tool(&self) -> Option<PathBuf> {
        self.find(SIGNTOOL, self.signtool_override.as_deref())
    }
}

fn default_kits_root() -> Option<PathBuf> {
    if !crate::utils::platform::is_windows() {
        return None;
    }
    let program_files = std::env::var_os("ProgramFiles(x86)")
        .map_or_else(|| PathBuf::from(r"C:\Program Files (x86)"), PathBuf::from);
    Some(program_files.join("Windows Kits").join("10").join("bin"))
}

/// Find `exe` under `<root>/<version>/x64`, newest version first
///
/// Only directories named like a dotted version (`10.0.22621.0`) are considered.
#[must_use]
pub fn scan_windows_kits(root: &Path, exe: &str) -> Option<PathBuf> {
    let mut versions: Vec<(Vec<u32>, PathBuf)> = std::fs::read_dir(root)
        .ok()?
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            parse_version(&name).map(|version| (version, entry.path()))
        })
        .collect();

    versions.sort_by(|a, b| b.0.cmp(&a.0));

    versions
        .into_iter()
        .map(|(_, dir)| dir.join("x64").join(exe))
        .find(|candidate| candidate.is_file())
}

fn parse_version(name: &str) -> Option<Vec<u32>> {
    let parts: Option<Vec<u32>> = name.split('.').map(|p| p.parse().ok()).collect();
    parts.filter(|p| p.len() >= 2)
}
