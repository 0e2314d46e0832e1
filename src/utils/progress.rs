//! Progress indicators for downloads and packaging
//!
//! Thin wrappers over `indicatif` with the styles modelpack uses. Progress output is
//! suppressed when `MODELPACK_NO_PROGRESS` is set (the `--no-progress` flag), which
//! keeps logs clean in CI and scripts.
//!
//! [`DownloadReporter`] turns the stream of
//! [`DownloadProgress`](crate::provider::DownloadProgress) updates from an acquisition
//! run into one bar per file: a byte bar when the host reports a length, a spinner
//! otherwise.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

use crate::provider::DownloadProgress;

/// Environment variable that disables progress output
pub const NO_PROGRESS_ENV: &str = "MODELPACK_NO_PROGRESS";

/// Whether progress output is disabled through the environment
#[must_use]
pub fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some()
}

/// A progress bar with modelpack styling
#[derive(Clone, Debug)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Byte-counting bar of known length
    #[must_use]
    pub fn new_download(len: u64) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(len);
            bar.set_style(ProgressStyle::download());
            bar
        };
        Self {
            inner: bar,
        }
    }

    /// Spinner for work of unknown size
    #[must_use]
    pub fn new_spinner() -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(ProgressStyle::spinner());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self {
            inner: bar,
        }
    }

    /// Hidden bar, used when progress is turned off
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    /// Set the message shown next to the bar
    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    /// Set the prefix shown before the bar
    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.inner.set_prefix(prefix.into());
    }

    /// Set the absolute position
    pub fn set_position(&self, pos: u64) {
        self.inner.set_position(pos);
    }

    /// Finish and leave the bar on screen with a message
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.inner.finish_with_message(msg.into());
    }
}

/// Styles used by modelpack
pub struct ProgressStyle;

impl ProgressStyle {
    /// Byte transfer style
    #[must_use]
    pub fn download() -> IndicatifStyle {
        IndicatifStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap_or_else(|_| IndicatifStyle::default_bar())
            .progress_chars("━╸━")
    }

    /// Spinner style for transfers without a known length
    #[must_use]
    pub fn spinner() -> IndicatifStyle {
        IndicatifStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| IndicatifStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
    }
}

/// Renders acquisition progress, one bar per file
#[derive(Debug, Default)]
pub struct DownloadReporter {
    enabled: bool,
    current: Option<(String, ProgressBar)>,
    files_seen: usize,
}

impl DownloadReporter {
    /// Reporter that draws bars unless `enabled` is false or progress is disabled
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: enabled && !is_progress_disabled(),
            current: None,
            files_seen: 0,
        }
    }

    /// Number of distinct files progress was reported for
    #[must_use]
    pub const fn files_seen(&self) -> usize {
        self.files_seen
    }

    /// Handle one progress update
    pub fn update(&mut self, progress: &DownloadProgress) {
        let same_file = self.current.as_ref().is_some_and(|(name, _)| *name == progress.file_name);
        if !same_file {
            self.finish_current();
            self.files_seen += 1;
            let bar = self.bar_for(progress);
            self.current = Some((progress.file_name.clone(), bar));
        }

        if let Some((_, bar)) = &self.current {
            bar.set_position(progress.bytes_received);
            if progress.total_bytes == 0 {
                bar.set_message(format!("{} bytes", progress.bytes_received));
            }
        }
    }

    /// Finish the bar of the file in progress
    pub fn finish(&mut self) {
        self.finish_current();
    }

    fn bar_for(&self, progress: &DownloadProgress) -> ProgressBar {
        let bar = if !self.enabled {
            ProgressBar::hidden()
        } else if progress.total_bytes > 0 {
            ProgressBar::new_download(progress.total_bytes)
        } else {
            ProgressBar::new_spinner()
        };
        bar.set_prefix(progress.file_name.clone());
        bar
    }

    fn finish_current(&mut self) {
        if let Some((name, bar)) = self.current.take() {
            bar.finish_with_message(format!("{name} done"));
        }
    }
}
