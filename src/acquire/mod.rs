//! Acquisition of remote repository content
//!
//! An acquisition run moves through
//! `Resolving -> Listing -> Downloading` and ends in one of the
//! [`AcquisitionOutcome`] variants:
//!
//! - **Completed** - every file was written
//! - **PartialFailure** - at least one file failed but the run carried on
//! - **Aborted** - the run was cancelled; this is not an error
//! - **Failed** - resolution, listing or the single requested file failed
//!
//! # Modes
//!
//! A descriptor whose path is a folder (see [`RepositoryDescriptor::is_folder`]) is
//! listed and every direct child is downloaded, one at a time in listing order, into
//! `destination/<file name>`. Any other path downloads exactly that file.
//!
//! Per-file failures in folder mode are logged and skipped. Cancellation is checked
//! before each file starts; once raised the remaining files are skipped.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::core::ModelpackError;
use crate::provider::{
    CancellationToken, DownloadProgress, DownloadStatus, ProviderClient, ProviderEndpoints,
    RemoteEntry, RepositoryProvider,
};
use crate::source::{RepositoryDescriptor, resolve};

/// Phase of an acquisition run, used to report where a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionPhase {
    /// Turning the URI into a descriptor and selecting a provider
    Resolving,
    /// Listing the remote folder
    Listing,
    /// Downloading files
    Downloading,
}

impl std::fmt::Display for AcquisitionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolving => write!(f, "resolving"),
            Self::Listing => write!(f, "listing"),
            Self::Downloading => write!(f, "downloading"),
        }
    }
}

/// A file that could not be downloaded during a folder run
#[derive(Debug, Clone)]
pub struct FailedFile {
    /// Provider-relative path
    pub path: String,
    /// Why it failed
    pub error: ModelpackError,
}

/// Final state of an acquisition run
#[derive(Debug, Clone)]
pub enum AcquisitionOutcome {
    /// Every file was downloaded
    Completed {
        /// Local paths written
        files: Vec<PathBuf>,
    },
    /// Some files failed, the rest were downloaded
    PartialFailure {
        /// Local paths written
        files: Vec<PathBuf>,
        /// Files that failed
        failed: Vec<FailedFile>,
    },
    /// The run was cancelled
    Aborted {
        /// Local paths written before cancellation
        files: Vec<PathBuf>,
    },
    /// The run failed
    Failed {
        /// Phase the failure happened in
        phase: AcquisitionPhase,
        /// The failure
        error: ModelpackError,
    },
}

impl AcquisitionOutcome {
    /// Local files written by the run
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        match self {
            Self::Completed {
                files,
            }
            | Self::PartialFailure {
                files,
                ..
            }
            | Self::Aborted {
                files,
            } => files,
            Self::Failed {
                ..
            } => &[],
        }
    }

    /// Whether the downloaded content is usable for packaging
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(
            self,
            Self::Completed {
                ..
            } | Self::PartialFailure {
                ..
            }
        )
    }
}

/// Drives acquisition runs against the configured hosts
///
/// Each call to [`Acquirer::acquire`] uses a fresh [`CancellationToken`];
/// [`Acquirer::cancel`] raises the token of the run in progress.
#[derive(Debug, Default)]
pub struct Acquirer {
    endpoints: ProviderEndpoints,
    current: Mutex<Option<CancellationToken>>,
}

impl Acquirer {
    /// Create an acquirer for the given endpoints
    #[must_use]
    pub fn new(endpoints: ProviderEndpoints) -> Self {
        Self {
            endpoints,
            current: Mutex::new(None),
        }
    }

    /// Acquire `uri` into `destination` with a fresh cancellation token
    pub async fn acquire(
        &self,
        uri: &str,
        destination: &Path,
        on_progress: &mut (dyn FnMut(&DownloadProgress) + Send),
    ) -> AcquisitionOutcome {
        self.acquire_with_token(uri, destination, on_progress, CancellationToken::new()).await
    }

    /// Acquire `uri` into `destination` using a caller-supplied token
    ///
    /// The token becomes the current run's token, so [`Acquirer::cancel`] and the
    /// caller's own handle raise the same signal.
    pub async fn acquire_with_token(
        &self,
        uri: &str,
        destination: &Path,
        on_progress: &mut (dyn FnMut(&DownloadProgress) + Send),
        cancel: CancellationToken,
    ) -> AcquisitionOutcome {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(cancel.clone());
        }

        debug!(target: "acquire", "Resolving {}", uri);
        let descriptor = resolve(uri);
        if !descriptor.is_supported() {
            warn!(target: "acquire", "Unsupported repository URI: {}", uri);
            return AcquisitionOutcome::Failed {
                phase: AcquisitionPhase::Resolving,
                error: ModelpackError::UnsupportedUri {
                    uri: uri.to_string(),
                },
            };
        }

        let provider = match ProviderClient::for_descriptor(&descriptor, &self.endpoints) {
            Ok(provider) => provider,
            Err(error) => {
                return AcquisitionOutcome::Failed {
                    phase: AcquisitionPhase::Resolving,
                    error,
                };
            }
        };

        acquire_from(&provider, &descriptor, destination, on_progress, &cancel).await
    }

    /// Cancel the run in progress, if any
    pub fn cancel(&self) {
        if let Ok(current) = self.current.lock() {
            if let Some(token) = current.as_ref() {
                token.cancel();
            }
        }
    }
}

/// Acquire the content a descriptor points at through `provider`
///
/// This is the provider-agnostic core of a run; [`Acquirer`] resolves the URI and
/// picks the provider before delegating here.
pub async fn acquire_from<P: RepositoryProvider>(
    provider: &P,
    descriptor: &RepositoryDescriptor,
    destination: &Path,
    on_progress: &mut (dyn FnMut(&DownloadProgress) + Send),
    cancel: &CancellationToken,
) -> AcquisitionOutcome {
    if descriptor.is_folder() {
        acquire_folder(provider, descriptor, destination, on_progress, cancel).await
    } else {
        acquire_file(provider, descriptor, destination, on_progress, cancel).await
    }
}

async fn acquire_folder<P: RepositoryProvider>(
    provider: &P,
    descriptor: &RepositoryDescriptor,
    destination: &Path,
    on_progress: &mut (dyn FnMut(&DownloadProgress) + Send),
    cancel: &CancellationToken,
) -> AcquisitionOutcome {
    let folder = descriptor.normalized_path();
    if cancel.is_cancelled() {
        return AcquisitionOutcome::Aborted {
            files: Vec::new(),
        };
    }
    info!(
        target: "acquire",
        "Listing '{}' in {} repository {}",
        folder,
        provider.kind(),
        descriptor
    );

    let entries = match provider.list_folder(descriptor, folder, cancel).await {
        Ok(entries) => entries,
        Err(error) => {
            warn!(target: "acquire", "Listing failed: {}", error);
            return AcquisitionOutcome::Failed {
                phase: AcquisitionPhase::Listing,
                error,
            };
        }
    };

    // Providers return an empty listing when cancelled mid-request
    if cancel.is_cancelled() {
        return AcquisitionOutcome::Aborted {
            files: Vec::new(),
        };
    }

    if entries.is_empty() {
        warn!(target: "acquire", "No files found in '{}' of {}", folder, descriptor);
    }

    let mut files = Vec::new();
    let mut failed = Vec::new();

    for entry in &entries {
        if cancel.is_cancelled() {
            info!(
                target: "acquire",
                "Acquisition cancelled, skipping remaining {} files",
                entries.len() - files.len() - failed.len()
            );
            return AcquisitionOutcome::Aborted {
                files,
            };
        }

        let target = destination.join(entry.file_name());
        match provider.download_file(descriptor, &entry.path, &target, on_progress, cancel).await {
            Ok(DownloadStatus::Completed {
                ..
            }) => files.push(target),
            Ok(DownloadStatus::Cancelled) => {
                return AcquisitionOutcome::Aborted {
                    files,
                };
            }
            Err(error) => {
                warn!(target: "acquire", "Skipping {}: {}", entry.path, error);
                failed.push(FailedFile {
                    path: entry.path.clone(),
                    error,
                });
            }
        }
    }

    if failed.is_empty() {
        info!(target: "acquire", "Downloaded {} files from {}", files.len(), descriptor);
        AcquisitionOutcome::Completed {
            files,
        }
    } else {
        warn!(
            target: "acquire",
            "Downloaded {} files from {}, {} failed",
            files.len(),
            descriptor,
            failed.len()
        );
        AcquisitionOutcome::PartialFailure {
            files,
            failed,
        }
    }
}

async fn acquire_file<P: RepositoryProvider>(
    provider: &P,
    descriptor: &RepositoryDescriptor,
    destination: &Path,
    on_progress: &mut (dyn FnMut(&DownloadProgress) + Send),
    cancel: &CancellationToken,
) -> AcquisitionOutcome {
    let entry = RemoteEntry::new(descriptor.normalized_path());
    if cancel.is_cancelled() {
        return AcquisitionOutcome::Aborted {
            files: Vec::new(),
        };
    }

    let target = destination.join(entry.file_name());
    info!(target: "acquire", "Downloading {} from {}", entry.path, descriptor);

    match provider.download_file(descriptor, &entry.path, &target, on_progress, cancel).await {
        Ok(DownloadStatus::Completed {
            ..
        }) => AcquisitionOutcome::Completed {
            files: vec![target],
        },
        Ok(DownloadStatus::Cancelled) => AcquisitionOutcome::Aborted {
            files: Vec::new(),
        },
        Err(error) => {
            warn!(target: "acquire", "Download failed: {}", error);
            AcquisitionOutcome::Failed {
                phase: AcquisitionPhase::Downloading,
                error,
            }
        }
    }
}
