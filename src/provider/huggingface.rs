//! huggingface.co model repositories
//!
//! Listing uses the Hub tree API, `GET {endpoint}/api/models/{owner}/{name}/tree/{branch}[/{folder}]`,
//! which returns a JSON array of `{ "type": "file" | "directory", "path": ..., "size": ... }`.
//! Files are fetched from `{endpoint}/{owner}/{name}/resolve/{branch}/{path}`.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::transfer::{build_client, fetch_json, stream_to_file};
use super::{
    CancellationToken, DownloadProgress, DownloadStatus, ProviderEndpoints, RemoteEntry,
    RepositoryProvider, direct_children,
};
use crate::core::ModelpackError;
use crate::source::{ProviderKind, RepositoryDescriptor};

#[derive(Debug, Deserialize)]
struct TreeEntry {
    #[serde(rename = "type")]
    kind: String,
    path: String,
}

/// Provider for huggingface.co
#[derive(Debug, Clone)]
pub struct HuggingFaceProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HuggingFaceProvider {
    /// Create a provider talking to the configured HuggingFace endpoint
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built.
    pub fn new(endpoints: &ProviderEndpoints) -> Result<Self, ModelpackError> {
        Ok(Self {
            client: build_client(&endpoints.user_agent)?,
            endpoint: endpoints.huggingface.trim_end_matches('/').to_string(),
        })
    }

    fn listing_url(&self, descriptor: &RepositoryDescriptor, folder: &str) -> String {
        let mut url = format!(
            "{}/api/models/{}/{}/tree/{}",
            self.endpoint, descriptor.owner, descriptor.name, descriptor.branch
        );
        if !folder.is_empty() {
            url.push('/');
            url.push_str(folder);
        }
        url
    }

    fn download_url(&self, descriptor: &RepositoryDescriptor, file_path: &str) -> String {
        format!(
            "{}/{}/{}/resolve/{}/{}",
            self.endpoint,
            descriptor.owner,
            descriptor.name,
            descriptor.branch,
            file_path.trim_start_matches('/')
        )
    }
}

impl RepositoryProvider for HuggingFaceProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::HuggingFace
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

        let url = self.listing_url(descriptor, folder);
        let tree: Vec<TreeEntry> =
            fetch_json(&self.client, &url).await.map_err(|reason| ModelpackError::ListingFailed {
                repository: descriptor.to_string(),
                folder: folder.to_string(),
                reason,
            })?;

        let files: Vec<RemoteEntry> = tree
            .into_iter()
            .filter(|entry| entry.kind == "file")
            .map(|entry| RemoteEntry::new(entry.path))
            .collect();

        let children = direct_children(files, folder);
        debug!(
            target: "provider",
            "HuggingFace listing of '{}' in {}: {} files",
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
