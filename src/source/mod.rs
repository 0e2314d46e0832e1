//! Repository references parsed from user supplied URIs
//!
//! A URI such as `https://huggingface.co/openai-community/gpt2/tree/main/onnx` is turned
//! into a [`RepositoryDescriptor`] once, up front. Everything downstream (provider
//! selection, acquisition mode, identity inference) works from the descriptor and never
//! looks at the raw URI again.
//!
//! Resolution is total: an unrecognized URI yields a descriptor whose
//! [`ProviderKind`] is [`ProviderKind::Unknown`] and whose other fields are empty.
//! Callers must check [`RepositoryDescriptor::is_supported`] before proceeding.

mod resolver;

pub use resolver::resolve;

use std::fmt;

/// Default branch used when the URI names only `owner/name`
pub const DEFAULT_BRANCH: &str = "main";

/// Hosting ecosystem a repository lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// huggingface.co model repositories
    HuggingFace,
    /// github.com repositories
    GitHub,
    /// Anything the resolver did not recognize
    Unknown,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HuggingFace => write!(f, "HuggingFace"),
            Self::GitHub => write!(f, "GitHub"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// The view segment the URI was addressed through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryView {
    /// Bare `owner/name` URI
    Repository,
    /// `/tree/<branch>/...`, used by both hosts for directories
    Tree,
    /// `/blob/<branch>/...`, a single file on GitHub
    Blob,
}

/// Normalized reference to a location inside a remote repository
///
/// Invariant: a descriptor whose provider is not [`ProviderKind::Unknown`] always has
/// a non-empty owner and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    /// Which host the repository lives on
    pub provider: ProviderKind,
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Branch, defaulting to [`DEFAULT_BRANCH`]
    pub branch: String,
    /// Path inside the repository, possibly empty, as written in the URI
    pub path: String,
    /// View segment used in the URI
    pub view: RepositoryView,
}

impl RepositoryDescriptor {
    /// Descriptor returned for URIs that match no supported host
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            provider: ProviderKind::Unknown,
            owner: String::new(),
            name: String::new(),
            branch: String::new(),
            path: String::new(),
            view: RepositoryView::Repository,
        }
    }

    /// Whether the descriptor refers to a supported provider
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.provider != ProviderKind::Unknown
    }

    /// Whether the path addresses a folder rather than a single file
    ///
    /// An empty path, a path with a trailing separator and a path reached through a
    /// `tree` view are folders. Everything else is a single file.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.path.is_empty()
            || self.path.ends_with('/')
            || self.path.ends_with('\\')
            || self.view == RepositoryView::Tree
    }

    /// Path with leading and trailing separators removed
    #[must_use]
    pub fn normalized_path(&self) -> &str {
        self.path.trim_matches(|c| c == '/' || c == '\\')
    }
}

impl fmt::Display for RepositoryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.name, self.branch)
    }
}
