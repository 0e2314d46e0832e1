//! Utility modules
//!
//! - [`platform`] - path normalization for container entries
//! - [`progress`] - progress bars for downloads

pub mod platform;
pub mod progress;

pub use progress::{DownloadReporter, ProgressBar};
