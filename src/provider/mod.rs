//! Remote repository providers
//!
//! A provider knows how to list a folder and stream a single file for one hosting
//! ecosystem. Two are supported:
//!
//! - [`HuggingFaceProvider`] - model repositories on huggingface.co
//! - [`GitHubProvider`] - repositories on github.com
//!
//! Both implement [`RepositoryProvider`]. The concrete provider is chosen once, from
//! the descriptor's [`ProviderKind`], by [`ProviderClient::for_descriptor`]; the
//! acquisition code only ever talks to the trait.
//!
//! # Listing
//!
//! Hosts return listings in incompatible shapes (HuggingFace's tree API, GitHub's
//! git trees API). Each provider maps its listing to [`RemoteEntry`] values, keeps
//! files only, then applies the shared [`direct_children`] filter so that a folder
//! listing never contains nested descendants.
//!
//! # Cancellation
//!
//! Every call takes a [`CancellationToken`] scoped to one acquisition run. A download
//! checks the token before each chunk is written; when it fires the partial file is
//! removed and [`DownloadStatus::Cancelled`] is returned instead of an error.

mod github;
mod huggingface;
mod transfer;

pub use github::GitHubProvider;
pub use huggingface::HuggingFaceProvider;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::GlobalConfig;
use crate::core::ModelpackError;
use crate::source::{ProviderKind, RepositoryDescriptor};

/// User-Agent sent with every request unless configured otherwise
pub const DEFAULT_USER_AGENT: &str = "ModelPackagingTool/1.0";

/// Default HuggingFace endpoint
pub const DEFAULT_HUGGINGFACE_ENDPOINT: &str = "https://huggingface.co";

/// Default GitHub REST API endpoint
pub const DEFAULT_GITHUB_API_ENDPOINT: &str = "https://api.github.com";

/// Default GitHub raw content endpoint
pub const DEFAULT_GITHUB_RAW_ENDPOINT: &str = "https://raw.githubusercontent.com";

/// A file in a remote folder listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Provider-relative path, forward-slash separated
    pub path: String,
}

impl RemoteEntry {
    /// Create an entry from a provider-relative path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Last path component
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Progress of a single file transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Name of the file being transferred
    pub file_name: String,
    /// Bytes written so far
    pub bytes_received: u64,
    /// Total size, or 0 when the host did not report one
    pub total_bytes: u64,
}

/// Result of a download that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    /// The file was written completely
    Completed {
        /// Number of bytes written
        bytes: u64,
    },
    /// The run was cancelled and the partial file removed
    Cancelled,
}

/// Cancellation signal shared by the calls of one acquisition run
///
/// Cloning yields a handle to the same signal. Cancelling is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that has not been cancelled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the signal has been raised
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Endpoints and client settings used to reach the hosts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    /// Base URL of the HuggingFace site and API
    pub huggingface: String,
    /// Base URL of the GitHub REST API
    pub github_api: String,
    /// Base URL serving raw GitHub file contents
    pub github_raw: String,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            huggingface: DEFAULT_HUGGINGFACE_ENDPOINT.to_string(),
            github_api: DEFAULT_GITHUB_API_ENDPOINT.to_string(),
            github_raw: DEFAULT_GITHUB_RAW_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ProviderEndpoints {
    /// Build endpoints from the global configuration, falling back to defaults
    #[must_use]
    pub fn from_config(config: &GlobalConfig) -> Self {
        let defaults = Self::default();
        Self {
            huggingface: config.huggingface_endpoint.clone().unwrap_or(defaults.huggingface),
            github_api: config.github_api_endpoint.clone().unwrap_or(defaults.github_api),
            github_raw: config.github_raw_endpoint.clone().unwrap_or(defaults.github_raw),
            user_agent: config.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }

    /// Point every endpoint at one base URL, used with a local mock server
    pub fn with_base_url(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            huggingface: base.clone(),
            github_api: base.clone(),
            github_raw: base,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Capability set every hosting provider implements
pub trait RepositoryProvider {
    /// Which host this provider talks to
    fn kind(&self) -> ProviderKind;

    /// List the files that are direct children of `folder`
    ///
    /// An empty folder means the repository root. Any failure is fatal for the
    /// listing and reported as [`ModelpackError::ListingFailed`].
    fn list_folder(
        &self,
        descriptor: &RepositoryDescriptor,
        folder: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Vec<RemoteEntry>, ModelpackError>> + Send;

    /// Stream one file to `destination`, creating parent directories as needed
    ///
    /// `on_progress` is invoked as data arrives. Cancellation is not an error: it
    /// yields [`DownloadStatus::Cancelled`].
    fn download_file(
        &self,
        descriptor: &RepositoryDescriptor,
        file_path: &str,
        destination: &Path,
        on_progress: &mut (dyn FnMut(&DownloadProgress) + Send),
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<DownloadStatus, ModelpackError>> + Send;
}

/// Provider selected for a descriptor
#[derive(Debug, Clone)]
pub enum ProviderClient {
    /// huggingface.co
    HuggingFace(HuggingFaceProvider),
    /// github.com
    GitHub(GitHubProvider),
}

impl ProviderClient {
    /// Select the provider for a descriptor
    ///
    /// # Errors
    ///
    /// Returns [`ModelpackError::Unsupported`] for [`ProviderKind::Unknown`], or
    /// [`ModelpackError::Other`] when the HTTP client cannot be built.
    pub fn for_descriptor(
        descriptor: &RepositoryDescriptor,
        endpoints: &ProviderEndpoints,
    ) -> Result<Self, ModelpackError> {
        match descriptor.provider {
            ProviderKind::HuggingFace => Ok(Self::HuggingFace(HuggingFaceProvider::new(endpoints)?)),
            ProviderKind::GitHub => Ok(Self::GitHub(GitHubProvider::new(endpoints)?)),
            ProviderKind::Unknown => Err(ModelpackError::Unsupported {
                operation: "downloading from an unrecognized host".to_string(),
            }),
        }
    }
}

impl RepositoryProvider for ProviderClient {
    fn kind(&self) -> ProviderKind {
        match self {
            Self::HuggingFace(p) => p.kind(),
            Self::GitHub(p) => p.kind(),
        }
    }

    async fn list_folder(
        &self,
        descriptor: &RepositoryDescriptor,
        folder: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteEntry>, ModelpackError> {
        match self {
            Self::HuggingFace(p) => p.list_folder(descriptor, folder, cancel).await,
            Self::GitHub(p) => p.list_folder(descriptor, folder, cancel).await,
        }
    }

    async fn download_file(
        &self,
        descriptor: &RepositoryDescriptor,
        file_path: &str,
        destination: &Path,
        on_progress: &mut (dyn FnMut(&DownloadProgress) + Send),
        cancel: &CancellationToken,
    ) -> Result<DownloadStatus, ModelpackError> {
        match self {
            Self::HuggingFace(p) => {
                p.download_file(descriptor, file_path, destination, on_progress, cancel).await
            }
            Self::GitHub(p) => {
                p.download_file(descriptor, file_path, destination, on_progress, cancel).await
            }
        }
    }
}

/// Keep only entries that are direct children of `folder`
///
/// An entry qualifies when its path, after stripping the `folder/` prefix, contains
/// no further separator. An empty folder keeps the top-level entries. Leading and
/// trailing separators on `folder` are ignored. Listing order is preserved.
#[must_use]
pub fn direct_children(entries: Vec<RemoteEntry>, folder: &str) -> Vec<RemoteEntry> {
    let folder = folder.trim_matches('/');
    let prefix = format!("{folder}/");

    entries
        .into_iter()
        .filter(|entry| {
            let relative = if folder.is_empty() {
                Some(entry.path.as_str())
            } else {
                entry.path.strip_prefix(&prefix)
            };
            relative.is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
        })
        .collect()
}
