//! Cross-platform path helpers

use std::path::{Component, Path};

/// Container-internal name for a path relative to the packaged folder
///
/// Only normal components are kept and they are joined with `/` whatever the
/// host separator is. Backslashes inside a component are translated too, so a
/// tree copied from Windows lands at the same place on every host.
///
/// ```
/// use modelpack_cli::utils::platform::container_path;
/// use std::path::Path;
///
/// assert_eq!(container_path(Path::new("Images/StoreLogo.png")), "Images/StoreLogo.png");
/// assert_eq!(container_path(Path::new("./onnx/model.onnx")), "onnx/model.onnx");
/// ```
#[must_use]
pub fn container_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().replace('\\', "/")),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}
