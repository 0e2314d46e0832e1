//! modelpack - package AI models into MSIX containers
//!
//! Takes model content either from a local folder or from a public HuggingFace or
//! GitHub repository and turns it into a single `.msix` container with a
//! synthesized `AppxManifest.xml`, optionally signed.
//!
//! # Pipeline
//!
//! ```text
//! URI ──resolve──> RepositoryDescriptor ──provider──> local folder ──assemble──> .msix ──sign──> signed .msix
//! ```
//!
//! 1. [`source::resolve`] recognizes HuggingFace and GitHub URLs.
//! 2. [`acquire::Acquirer`] lists and downloads the folder or file through the matching
//!    [`provider::RepositoryProvider`], honoring cancellation.
//! 3. [`package::Assembler`] ensures a manifest and placeholder images exist, then tries
//!    the programmatic, external-tool and degraded strategies in turn.
//! 4. [`signing::SignTool`] signs the artifact when a certificate is given.
//!
//! # Core Modules
//!
//! - [`source`] - URI resolution into repository descriptors
//! - [`provider`] - HuggingFace and GitHub listing and streaming downloads
//! - [`acquire`] - Acquisition runs and their outcomes
//! - [`manifest`] - Package identity, name sanitization and manifest synthesis
//! - [`package`] - Container assembly strategies
//! - [`signing`] - Package signing
//! - [`tools`] - Locating and running Windows SDK tools
//!
//! ## Supporting Modules
//!
//! - [`cli`] - Command-line interface
//! - [`config`] - Global configuration (`~/.modelpack/config.toml`)
//! - [`core`] - Error types and user-facing error formatting
//! - [`utils`] - Progress bars and path helpers
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Package a local folder
//! modelpack pack ./phi-3 -o ./out
//!
//! # Download from HuggingFace and package
//! modelpack download-and-pack https://huggingface.co/openai-community/gpt2/tree/main/onnx -o ./out
//!
//! # Download only
//! modelpack download https://github.com/microsoft/onnxruntime/tree/main/docs -o ./docs
//! ```

// Acquisition
pub mod acquire;
pub mod provider;
pub mod source;

// Packaging
pub mod manifest;
pub mod package;
pub mod signing;
pub mod tools;

// Supporting modules
pub mod cli;
pub mod config;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
