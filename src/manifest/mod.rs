//! Package identity and manifest synthesis
//!
//! Every package carries an `AppxManifest.xml` at the root of the container. When
//! the source folder does not provide one it is synthesized from a fixed template
//! and a [`PackageIdentity`].
//!
//! # Identity
//!
//! Package and publisher names come from the command line, or are inferred from the
//! source folder (folder name and parent folder name) or from the repository
//! descriptor (repository name and owner). Either way they pass through
//! [`sanitize_name`] before reaching the manifest.
//!
//! # Templates
//!
//! [`ManifestKind::Standard`] declares one application entry with the placeholder
//! visual assets. [`ManifestKind::Framework`] declares a framework package with the
//! `runFullTrust` capability and no application.

mod templates;

pub use templates::{
    DEVICE_FAMILY, MAX_VERSION_TESTED, MIN_VERSION, PACKAGE_VERSION, RESOURCE_LANGUAGE,
};

use std::path::Path;

use tera::{Context as TeraContext, Tera};

use crate::core::ModelpackError;
use crate::source::RepositoryDescriptor;

/// Name of the manifest at the root of every package
pub const MANIFEST_FILE_NAME: &str = "AppxManifest.xml";

/// Name used when a package name sanitizes to nothing or cannot be inferred
pub const DEFAULT_PACKAGE_NAME: &str = "ModelPackage";

/// Publisher used when none is given and none can be inferred
pub const DEFAULT_PUBLISHER_NAME: &str = "ModelPackagingTool";

/// Prefix added to names that do not start with a letter or digit
pub const NAME_PREFIX: &str = "App_";

/// Placeholder visual assets referenced by the manifest, relative to the package root
pub const STORE_LOGO: &str = "Images/StoreLogo.png";
/// Medium tile asset
pub const MEDIUM_TILE: &str = "Images/MedTile.png";
/// App list asset
pub const APP_LIST_LOGO: &str = "Images/AppList.png";

/// Make a name valid for a package identity
///
/// Every character outside `[A-Za-z0-9_.-]` becomes `_`. A result that does not
/// start with a letter or digit gets [`NAME_PREFIX`]; an empty result becomes
/// [`DEFAULT_PACKAGE_NAME`]. The function is idempotent.
///
/// # Examples
///
/// ```
/// use modelpack_cli::manifest::sanitize_name;
///
/// assert_eq!(sanitize_name("My Model!"), "My_Model_");
/// assert_eq!(sanitize_name(".hidden"), "App_.hidden");
/// assert_eq!(sanitize_name(""), "ModelPackage");
/// ```
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match cleaned.chars().next() {
        None => DEFAULT_PACKAGE_NAME.to_string(),
        Some(first) if first.is_ascii_alphanumeric() => cleaned,
        Some(_) => format!("{NAME_PREFIX}{cleaned}"),
    }
}

/// Names identifying a package, as given and as sanitized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdentity {
    /// Package name as supplied or inferred
    pub raw_package_name: String,
    /// Publisher name as supplied or inferred
    pub raw_publisher_name: String,
    /// Sanitized package name
    pub package_name: String,
    /// Sanitized publisher name
    pub publisher_name: String,
}

impl PackageIdentity {
    /// Build an identity from raw names
    pub fn new(package_name: impl Into<String>, publisher_name: impl Into<String>) -> Self {
        let raw_package_name = package_name.into();
        let raw_publisher_name = publisher_name.into();
        Self {
            package_name: sanitize_name(&raw_package_name),
            publisher_name: sanitize_name(&raw_publisher_name),
            raw_package_name,
            raw_publisher_name,
        }
    }

    /// Identity for packaging a local folder
    ///
    /// Missing names are inferred: the package from the folder's own name, the
    /// publisher from its parent folder's name.
    #[must_use]
    pub fn for_folder(
        folder: &Path,
        package_name: Option<String>,
        publisher_name: Option<String>,
    ) -> Self {
        let folder = std::path::absolute(folder).unwrap_or_else(|_| folder.to_path_buf());
        let file_name = |path: Option<&Path>| {
            path.and_then(Path::file_name).map(|name| name.to_string_lossy().into_owned())
        };

        let package = package_name
            .filter(|name| !name.is_empty())
            .or_else(|| file_name(Some(&folder)))
            .unwrap_or_else(|| DEFAULT_PACKAGE_NAME.to_string());
        let publisher = publisher_name
            .filter(|name| !name.is_empty())
            .or_else(|| file_name(folder.parent()))
            .unwrap_or_else(|| DEFAULT_PUBLISHER_NAME.to_string());

        Self::new(package, publisher)
    }

    /// Identity for packaging downloaded repository content
    ///
    /// Missing names default to the repository name and owner.
    #[must_use]
    pub fn for_repository(
        descriptor: &RepositoryDescriptor,
        package_name: Option<String>,
        publisher_name: Option<String>,
    ) -> Self {
        let package =
            package_name.filter(|name| !name.is_empty()).unwrap_or_else(|| descriptor.name.clone());
        let publisher = publisher_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| descriptor.owner.clone());
        Self::new(package, publisher)
    }
}

/// Which manifest template to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestKind {
    /// Application-style model package
    #[default]
    Standard,
    /// Framework package without an application entry
    Framework,
}

/// Render the manifest for an identity
///
/// Output uses `\r\n` line endings.
///
/// # Errors
///
/// Returns [`ModelpackError::ManifestRenderFailed`] if the template engine rejects
/// the template, which the fixed templates never trigger.
pub fn synthesize(identity: &PackageIdentity, kind: ManifestKind) -> Result<String, ModelpackError> {
    let template = match kind {
        ManifestKind::Standard => templates::STANDARD,
        ManifestKind::Framework => templates::FRAMEWORK,
    };

    let mut context = TeraContext::new();
    context.insert("package_name", &identity.package_name);
    context.insert("publisher_name", &identity.publisher_name);
    context.insert("version", PACKAGE_VERSION);
    context.insert("device_family", DEVICE_FAMILY);
    context.insert("min_version", MIN_VERSION);
    context.insert("max_version_tested", MAX_VERSION_TESTED);
    context.insert("language", RESOURCE_LANGUAGE);
    context.insert("store_logo", &manifest_path(STORE_LOGO));
    context.insert("medium_tile", &manifest_path(MEDIUM_TILE));
    context.insert("app_list_logo", &manifest_path(APP_LIST_LOGO));

    let mut tera = Tera::default();
    let rendered = tera.render_str(template, &context).map_err(|e| {
        ModelpackError::ManifestRenderFailed {
            reason: e.to_string(),
        }
    })?;

    Ok(rendered.replace("\r\n", "\n").replace('\n', "\r\n"))
}

/// Manifests reference package files with backslashes
fn manifest_path(relative: &str) -> String {
    relative.replace('/', "\\")
}
