use regex::Regex;
use tracing::debug;

use super::{DEFAULT_BRANCH, ProviderKind, RepositoryDescriptor, RepositoryView};

const HUGGINGFACE_PATTERN: &str =
    r"^https?://(?:www\.)?huggingface\.co/([^/]+)/([^/]+)(?:/(tree)/([^/]+)(?:/(.+))?)?/?$";

const GITHUB_PATTERN: &str =
    r"^https?://(?:www\.)?github\.com/([^/]+)/([^/]+)(?:/(blob|tree)/([^/]+)(?:/(.+))?)?/?$";

/// Parse a URI into a [`RepositoryDescriptor`]
///
/// Patterns are tried in a fixed order: HuggingFace first, then GitHub. The first
/// one that matches the whole URI wins. A URI matching neither yields
/// [`RepositoryDescriptor::unknown`]; this function never fails.
///
/// The captured path is returned as written, trailing separator included, since
/// that separator decides folder mode later on.
///
/// # Examples
///
/// ```
/// use modelpack_cli::source::{ProviderKind, resolve};
///
/// let d = resolve("https://huggingface.co/openai-community/gpt2/tree/main/onnx");
/// assert_eq!(d.provider, ProviderKind::HuggingFace);
/// assert_eq!(d.owner, "openai-community");
/// assert_eq!(d.path, "onnx");
/// ```
#[must_use]
pub fn resolve(uri: &str) -> RepositoryDescriptor {
    let uri = uri.trim();
    let patterns = [
        (ProviderKind::HuggingFace, HUGGINGFACE_PATTERN),
        (ProviderKind::GitHub, GITHUB_PATTERN),
    ];

    for (provider, pattern) in patterns {
        let Ok(re) = Regex::new(pattern) else {
            continue;
        };
        if let Some(caps) = re.captures(uri) {
            let capture = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
            let view = match caps.get(3).map(|m| m.as_str()) {
                Some("tree") => RepositoryView::Tree,
                Some("blob") => RepositoryView::Blob,
                _ => RepositoryView::Repository,
            };
            let descriptor = RepositoryDescriptor {
                provider,
                owner: capture(1).unwrap_or_default(),
                name: capture(2).unwrap_or_default(),
                branch: capture(4).unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
                path: capture(5).unwrap_or_default(),
                view,
            };
            debug!(
                target: "source",
                "Resolved {} to {} repository {} (path '{}')",
                uri,
                provider,
                descriptor,
                descriptor.path
            );
            return descriptor;
        }
    }

    debug!(target: "source", "URI did not match any supported provider: {}", uri);
    RepositoryDescriptor::unknown()
}
