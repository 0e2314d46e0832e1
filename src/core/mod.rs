//! Core types for modelpack
//!
//! This module holds the error system shared by every other part of the crate:
//! - [`ModelpackError`] - Enumerated error types for all failure cases
//! - [`ErrorContext`] - User-friendly wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any [`anyhow::Error`] into an [`ErrorContext`]
//!
//! Library code returns [`ModelpackError`] (or `anyhow::Result` with context attached)
//! and the binary converts whatever reaches `main` through [`user_friendly_error`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use modelpack_cli::core::{ModelpackError, user_friendly_error};
//!
//! fn pack() -> anyhow::Result<()> {
//!     Err(ModelpackError::UnsupportedUri {
//!         uri: "https://example.com/model".to_string(),
//!     }
//!     .into())
//! }
//!
//! if let Err(e) = pack() {
//!     user_friendly_error(e).display();
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, ModelpackError, user_friendly_error};
