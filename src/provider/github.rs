//! github.com repositories
//!
//! The git trees API (`GET {api}/repos/{owner}/{name}/git/trees/{branch}?recursive=1`)
//! returns the whole tree in one response, so the folder is carved out of it with
//! [`direct_children`]. Contents come from the raw host.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use super::transfer::{build_client, fetch_json, stream_to_file};
use super::{
    CancellationToken, DownloadProgress, DownloadStatus, ProviderEndpoints, RemoteEntry,
    RepositoryProvider, direct_children,
};
use crate::core::ModelpackError;
use crate::source::{ProviderKind, RepositoryDescriptor};

#[derive(Debug, Deserialize)]
struct GitTree {
    tree: Vec<GitTreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct GitTreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Provider for github.com
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    client: reqwest::Client,
    api_endpoint: String,
    raw_endpoint: String,
}

impl GitHubProvider {
    /// Create a provider talking to the configured GitHub endpoints
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built.
    pub fn new(endpoints: &ProviderEndpoints) -> Result<Self, ModelpackError> {
        Ok(Self {
            client: build_client(&endpoints.user_agent)?,
            api_endpoint: endpoints.github_api.trim_end_matches('/').to_string(),
            raw_endpoint: endpoints.github_raw.trim_end_matches('/').to_string(),
        })
    }

    fn listing_url(&self, descriptor: &RepositoryDescriptor) -> String {
        format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.api_endpoint, descriptor.owner, descriptor.name, descriptor.branch
        )
    }

    fn download_url(&self, descriptor: &RepositoryDescriptor, file_path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.raw_endpoint,
            descriptor.owner,
            descriptor.name,
            descriptor.branch,
            file_path.trim_start_matches('/')
        )
    }
}

impl RepositoryProvider for GitHubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    async fn list_folder(
        &self,
        descriptor: &RepositoryDescriptor,
        folder: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteEntry>, ModelpackError> {
        let folder = folder.trim_matches('/');
        if cancel.is_cancelled() {
            return Ok(Vec::new());
        }

        let url = self.listing_url(descriptor);
        let tree: GitTree =
            fetch_json(&self.client, &url).await.map_err(|reason| ModelpackError::ListingFailed {
                repository: descriptor.to_string(),
                folder: folder.to_string(),
                reason,
            })?;

        if tree.truncated {
            warn!(
                target: "provider",
                "GitHub returned a truncated tree for {}; some files may be missing",
                descriptor
            );
        }

        let files: Vec<RemoteEntry> = tree
            .tree
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .map(|entry| RemoteEntry::new(entry.path))
            .collect();

        let children = direct_children(files, folder);
        debug!(
            target: "provider",
            "GitHub listing of '{}' in {}: {} files",
            folder,
            descriptor,
            children.len()
        );
        Ok(children)
    }

    async fn download_file(
        &self,
        descriptor: &RepositoryDescriptor,
        file_path: &str,
        destination: &Path,
        on_progress: &mut (dyn FnMut(&DownloadProgress) + Send),
        cancel: &CancellationToken,
    ) -> Result<DownloadStatus, ModelpackError> {
        let url = self.download_url(descriptor, file_path);
        stream_to_file(&self.client, &url, file_path, destination, on_progress, cancel).await
    }
}
