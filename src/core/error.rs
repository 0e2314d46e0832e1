//! Error handling for modelpack
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** so the acquisition and assembly pipelines can decide
//!    locally whether a failure is recoverable
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Resolution**: [`ModelpackError::UnsupportedUri`], [`ModelpackError::Unsupported`]
//! - **Acquisition**: [`ModelpackError::ListingFailed`], [`ModelpackError::DownloadFailed`]
//! - **Assembly**: [`ModelpackError::ManifestWriteFailed`], [`ModelpackError::ManifestRenderFailed`],
//!   [`ModelpackError::StrategyFailed`], [`ModelpackError::AssemblyFailed`],
//!   [`ModelpackError::InvalidSourceFolder`]
//! - **Signing and tools**: [`ModelpackError::SigningFailed`], [`ModelpackError::CertificateNotFound`],
//!   [`ModelpackError::ToolNotFound`]
//! - **Configuration**: [`ModelpackError::ConfigError`]
//!
//! Cancellation is not represented here. An interrupted acquisition is reported as
//! [`crate::acquire::AcquisitionOutcome::Aborted`], never as an error.
//!
//! # Examples
//!
//! ```rust,no_run
//! use modelpack_cli::core::{ErrorContext, ModelpackError};
//!
//! let context = ErrorContext::new(ModelpackError::ToolNotFound {
//!     tool: "makeappx".to_string(),
//! })
//! .with_suggestion("Install the Windows SDK")
//! .with_details("The external packaging strategy needs makeappx.exe");
//!
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for modelpack operations
///
/// Each variant maps onto one failure mode of the download or packaging pipeline.
/// Variants carry enough context (which file, which strategy, which phase) for the
/// CLI to print a single actionable message.
#[derive(Error, Debug)]
pub enum ModelpackError {
    /// The URI does not match any supported hosting provider
    #[error("Unsupported repository URI: {uri}")]
    UnsupportedUri {
        /// The URI as supplied by the user
        uri: String,
    },

    /// An operation exists in the model but is not supported for this input
    #[error("Unsupported operation: {operation}")]
    Unsupported {
        /// Description of the unsupported operation
        operation: String,
    },

    /// Listing a remote folder failed
    ///
    /// Fatal for the acquisition run that issued the listing.
    #[error("Failed to list '{folder}' in {repository}: {reason}")]
    ListingFailed {
        /// Repository in `owner/name@branch` form
        repository: String,
        /// Folder that was being listed (empty for the repository root)
        folder: String,
        /// Reason reported by the host or the transport
        reason: String,
    },

    /// Downloading a single file failed
    ///
    /// Recoverable in folder mode, where the run continues with the next file.
    #[error("Failed to download '{file}': {reason}")]
    DownloadFailed {
        /// Provider-relative path of the file
        file: String,
        /// Reason reported by the host, the transport or the filesystem
        reason: String,
    },

    /// The manifest template could not be rendered
    #[error("Failed to render package manifest: {reason}")]
    ManifestRenderFailed {
        /// Template engine error message
        reason: String,
    },

    /// The manifest could not be written into the source folder
    #[error("Failed to write manifest {path}: {reason}")]
    ManifestWriteFailed {
        /// Target manifest path
        path: String,
        /// Underlying I/O failure
        reason: String,
    },

    /// The source folder for packaging is missing or not a directory
    #[error("Source folder does not exist or is not a directory: {path}")]
    InvalidSourceFolder {
        /// The path that was supplied
        path: String,
    },

    /// A single assembly strategy failed
    ///
    /// Recoverable: the assembler moves on to the next strategy.
    #[error("{strategy} assembly failed: {reason}")]
    StrategyFailed {
        /// Strategy name
        strategy: String,
        /// Why the strategy failed
        reason: String,
    },

    /// Every assembly strategy failed
    #[error("Failed to create package {output}; attempted strategies: {}", .attempted.join("; "))]
    AssemblyFailed {
        /// Output artifact path
        output: String,
        /// One entry per attempted strategy, with its failure reason
        attempted: Vec<String>,
    },

    /// The signing step failed
    ///
    /// The unsigned package is still valid when this is returned.
    #[error("Failed to sign {artifact}: {reason}")]
    SigningFailed {
        /// Path of the package that was being signed
        artifact: String,
        /// Reason reported by the signer
        reason: String,
    },

    /// The signing certificate does not exist
    #[error("Certificate file not found: {path}")]
    CertificateNotFound {
        /// The certificate path that was supplied
        path: String,
    },

    /// A required external tool could not be located
    #[error("{tool} was not found")]
    ToolNotFound {
        /// Tool name
        tool: String,
    },

    /// Configuration file is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// IO error from the standard library
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error for cases not covered by specific variants
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for ModelpackError {
    fn clone(&self) -> Self {
        match self {
            Self::UnsupportedUri {
                uri,
            } => Self::UnsupportedUri {
                uri: uri.clone(),
            },
            Self::Unsupported {
                operation,
            } => Self::Unsupported {
                operation: operation.clone(),
            },
            Self::ListingFailed {
                repository,
                folder,
                reason,
            } => Self::ListingFailed {
                repository: repository.clone(),
                folder: folder.clone(),
                reason: reason.clone(),
            },
            Self::DownloadFailed {
                file,
                reason,
            } => Self::DownloadFailed {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ManifestRenderFailed {
                reason,
            } => Self::ManifestRenderFailed {
                reason: reason.clone(),
            },
            Self::ManifestWriteFailed {
                path,
                reason,
            } => Self::ManifestWriteFailed {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::InvalidSourceFolder {
                path,
            } => Self::InvalidSourceFolder {
                path: path.clone(),
            },
            Self::StrategyFailed {
                strategy,
                reason,
            } => Self::StrategyFailed {
                strategy: strategy.clone(),
                reason: reason.clone(),
            },
            Self::AssemblyFailed {
                output,
                attempted,
            } => Self::AssemblyFailed {
                output: output.clone(),
                attempted: attempted.clone(),
            },
            Self::SigningFailed {
                artifact,
                reason,
            } => Self::SigningFailed {
                artifact: artifact.clone(),
                reason: reason.clone(),
            },
            Self::CertificateNotFound {
                path,
            } => Self::CertificateNotFound {
                path: path.clone(),
            },
            Self::ToolNotFound {
                tool,
            } => Self::ToolNotFound {
                tool: tool.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // io::Error is not Clone, keep its message
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error wrapper carrying a suggestion and details for display in the terminal
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ModelpackError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details
    #[must_use]
    pub const fn new(error: ModelpackError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add an actionable suggestion, shown in green
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error, shown in yellow
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with suggestions where one is known
///
/// Crate errors are matched variant by variant. Standard I/O errors get a
/// suggestion based on their kind. Anything else is reported with its full
/// cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(modelpack_error) = error.downcast_ref::<ModelpackError>() {
        return create_error_context(modelpack_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(ModelpackError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion("Check file ownership or run from a directory you can write to");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(ModelpackError::Other {
                    message: format!("File not found: {io_error}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(ModelpackError::Other {
        message,
    })
}

fn create_error_context(error: ModelpackError) -> ErrorContext {
    match &error {
        ModelpackError::UnsupportedUri {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use a URI like https://huggingface.co/<owner>/<repo>/tree/<branch>/<folder> or https://github.com/<owner>/<repo>/blob/<branch>/<file>")
            .with_details("Only huggingface.co and github.com repositories are supported"),

        ModelpackError::Unsupported {
            ..
        } => ErrorContext::new(error),

        ModelpackError::ListingFailed {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the branch and folder in the URI and your internet connection")
            .with_details("Private repositories are not supported"),

        ModelpackError::DownloadFailed {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that the file exists on the given branch and retry"),

        ModelpackError::ManifestRenderFailed {
            ..
        }
        | ModelpackError::ManifestWriteFailed {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that the source folder is writable, or provide your own AppxManifest.xml"),

        ModelpackError::InvalidSourceFolder {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Pass an existing folder containing the files to package"),

        ModelpackError::StrategyFailed {
            ..
        } => ErrorContext::new(error),

        ModelpackError::AssemblyFailed {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run with --verbose to see why each strategy failed. Installing the Windows SDK enables the makeappx fallback")
            .with_details("The package is built in-process first, then with makeappx, then as an uncompressed archive"),

        ModelpackError::SigningFailed {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the certificate password and that signtool.exe is installed")
            .with_details("The unsigned package was kept and is still valid"),

        ModelpackError::CertificateNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Pass the path to an existing .pfx file with --sign"),

        ModelpackError::ToolNotFound {
            tool,
        } => {
            let suggestion = format!(
                "Install the Windows SDK, add {tool} to PATH, or set its path in the modelpack config file"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        ModelpackError::ConfigError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the TOML syntax of ~/.modelpack/config.toml or the file given with --config"),

        ModelpackError::IoError(_) | ModelpackError::Other {
            ..
        } => ErrorContext::new(error),
    }
}
