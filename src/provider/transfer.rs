//! HTTP plumbing shared by the providers

use std::path::Path;

use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::{CancellationToken, DownloadProgress, DownloadStatus};
use crate::core::ModelpackError;

/// Build the HTTP client used by a provider
pub(super) fn build_client(user_agent: &str) -> Result<reqwest::Client, ModelpackError> {
    reqwest::Client::builder().user_agent(user_agent).build().map_err(|e| {
        ModelpackError::Other {
            message: format!("Failed to create HTTP client: {e}"),
        }
    })
}

/// GET a JSON document, returning a plain reason string on failure
pub(super) async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, String> {
    debug!(target: "provider", "GET {}", url);

    let response = client.get(url).send().await.map_err(|e| format!("request failed: {e}"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {status} from {url}"));
    }

    response.json::<T>().await.map_err(|e| format!("invalid listing response: {e}"))
}

/// Stream `url` into `destination`, reporting progress and honoring cancellation
///
/// Progress is reported after every chunk. `bytes_received` never decreases, and
/// if the host under-reported the length the total is reported as unknown (0)
/// rather than letting received bytes exceed it. Cancellation is observed when the
/// next chunk arrives; that chunk is discarded and the partial file removed. A body
/// that has already ended is kept even if the token was raised meanwhile. The
/// partial file is also removed on failure.
pub(super) async fn stream_to_file(
    client: &reqwest::Client,
    url: &str,
    file_path: &str,
    destination: &Path,
    on_progress: &mut (dyn FnMut(&DownloadProgress) + Send),
    cancel: &CancellationToken,
) -> Result<DownloadStatus, ModelpackError> {
    let failed = |reason: String| ModelpackError::DownloadFailed {
        file: file_path.to_string(),
        reason,
    };

    if cancel.is_cancelled() {
        return Ok(DownloadStatus::Cancelled);
    }

    debug!(target: "provider", "Downloading {} to {}", url, destination.display());

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| failed(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(failed(format!("HTTP {status}")));
    }

    let declared_total = response.content_length().unwrap_or(0);

    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| failed(format!("cannot create {}: {e}", parent.display())))?;
    }

    let mut file = tokio::fs::File::create(destination)
        .await
        .map_err(|e| failed(format!("cannot create {}: {e}", destination.display())))?;

    let file_name = destination
        .file_name()
        .map_or_else(|| file_path.to_string(), |n| n.to_string_lossy().into_owned());
    let mut progress = DownloadProgress {
        file_name,
        bytes_received: 0,
        total_bytes: declared_total,
    };

    loop {
        let chunk = match response.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                drop(file);
                remove_partial(destination).await;
                return Err(failed(format!("connection error: {e}")));
            }
        };

        // Checked only once more data arrives so a body that already ended is kept
        if cancel.is_cancelled() {
            drop(file);
            remove_partial(destination).await;
            debug!(target: "provider", "Download of {} cancelled", file_path);
            return Ok(DownloadStatus::Cancelled);
        }

        if let Err(e) = file.write_all(&chunk).await {
            drop(file);
            remove_partial(destination).await;
            return Err(failed(format!("write failed: {e}")));
        }

        record_chunk(&mut progress, chunk.len());
        on_progress(&progress);
    }

    if let Err(e) = file.flush().await {
        drop(file);
        remove_partial(destination).await;
        return Err(failed(format!("write failed: {e}")));
    }

    debug!(
        target: "provider",
        "Downloaded {} ({} bytes)",
        file_path,
        progress.bytes_received
    );

    Ok(DownloadStatus::Completed {
        bytes: progress.bytes_received,
    })
}

/// Account for `len` more bytes, dropping a declared total that turned out too small
fn record_chunk(progress: &mut DownloadProgress, len: usize) {
    progress.bytes_received += len as u64;
    if progress.total_bytes > 0 && progress.bytes_received > progress.total_bytes {
        progress.total_bytes = 0;
    }
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(target: "provider", "Failed to remove partial file {}: {}", path.display(), e);
        }
    }
}
