//! Global configuration for modelpack
//!
//! The configuration file is optional. When present it lives at:
//!
//! - **Unix/macOS**: `~/.modelpack/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\modelpack\config.toml`
//!
//! The location can be overridden with `--config` or the `MODELPACK_CONFIG`
//! environment variable.
//!
//! # File Format
//!
//! ```toml
//! # Hosts (useful behind a mirror)
//! huggingface_endpoint = "https://huggingface.co"
//! github_api_endpoint = "https://api.github.com"
//! github_raw_endpoint = "https://raw.githubusercontent.com"
//! user_agent = "ModelPackagingTool/1.0"
//!
//! # Windows SDK tools, when not on PATH
//! makeappx_path = 'C:\Program Files (x86)\Windows Kits\10\bin\10.0.22621.0\x64\makeappx.exe'
//! signtool_path = 'C:\Program Files (x86)\Windows Kits\10\bin\10.0.22621.0\x64\signtool.exe'
//!
//! # Publisher used when none is given and none can be inferred
//! default_publisher = "Contoso"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::ModelpackError;

/// Environment variable overriding the configuration file location
pub const CONFIG_ENV: &str = "MODELPACK_CONFIG";

/// User-wide settings, every key optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Base URL for huggingface.co
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub huggingface_endpoint: Option<String>,

    /// Base URL for the GitHub REST API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_api_endpoint: Option<String>,

    /// Base URL for raw GitHub content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_raw_endpoint: Option<String>,

    /// User-Agent header sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Explicit path to makeappx.exe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub makeappx_path: Option<PathBuf>,

    /// Explicit path to signtool.exe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signtool_path: Option<PathBuf>,

    /// Publisher used when the command line gives none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_publisher: Option<String>,
}

impl GlobalConfig {
    /// Load from the default location, or defaults if the file does not exist
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path`, else `MODELPACK_CONFIG`, else the default location
    ///
    /// A missing file yields the default configuration.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::resolve_path()?,
        };

        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config = toml::from_str(&content).map_err(|e| ModelpackError::ConfigError {
            message: format!("{}: {e}", path.display()),
        })?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the configuration to `path`, creating parent directories
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    /// Location used when no path is given: `MODELPACK_CONFIG` or [`Self::default_path`]
    pub fn resolve_path() -> Result<PathBuf> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Self::default_path(),
        }
    }

    /// Platform default location of the configuration file
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("modelpack")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".modelpack")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Example configuration written by `modelpack config init`
    #[must_use]
    pub fn init_example() -> Self {
        Self {
            huggingface_endpoint: Some(crate::provider::DEFAULT_HUGGINGFACE_ENDPOINT.to_string()),
            github_api_endpoint: Some(crate::provider::DEFAULT_GITHUB_API_ENDPOINT.to_string()),
            github_raw_endpoint: Some(crate::provider::DEFAULT_GITHUB_RAW_ENDPOINT.to_string()),
            user_agent: Some(crate::provider::DEFAULT_USER_AGENT.to_string()),
            ..Self::default()
        }
    }
}
