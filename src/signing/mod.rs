//! Signing produced packages
//!
//! Signing is optional and happens after assembly. The only implementation shells out
//! to the Windows SDK `signtool` with a PFX certificate:
//!
//! ```text
//! signtool sign /fd SHA256 [/p <password>] /f <certificate.pfx> <package.msix>
//! ```
//!
//! The password never appears in logs.

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::core::ModelpackError;
use crate::tools::{ToolCommand, ToolLocator};

/// Digest algorithm passed to the signer
pub const FILE_DIGEST: &str = "SHA256";

/// Signs a finished package in place
pub trait PackageSigner: Send + Sync {
    /// Sign `artifact` with the certificate at `certificate`
    fn sign(
        &self,
        artifact: &Path,
        certificate: &Path,
        password: Option<&str>,
    ) -> impl Future<Output = Result<(), ModelpackError>> + Send;
}

/// Signer backed by `signtool.exe`
#[derive(Debug, Clone)]
pub struct SignTool {
    path: PathBuf,
}

impl SignTool {
    /// Use the signtool at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Find signtool through `locator`
    ///
    /// # Errors
    ///
    /// Returns [`ModelpackError::ToolNotFound`] when no signtool is installed.
    pub fn locate(locator: &dyn ToolLocator) -> Result<Self, ModelpackError> {
        locator.find_signing_tool().map(Self::new).ok_or_else(|| ModelpackError::ToolNotFound {
            tool: "signtool".to_string(),
        })
    }

    /// Path of the executable
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn command(&self, artifact: &Path, certificate: &Path, password: Option<&str>) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.path).arg("sign").arg("/fd").arg(FILE_DIGEST);
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            cmd = cmd.arg("/p").secret_arg(password);
        }
        cmd.arg("/f").path_arg(certificate).path_arg(artifact)
    }
}

impl PackageSigner for SignTool {
    async fn sign(
        &self,
        artifact: &Path,
        certificate: &Path,
        password: Option<&str>,
    ) -> Result<(), ModelpackError> {
        if !certificate.is_file() {
            return Err(ModelpackError::CertificateNotFound {
                path: certificate.display().to_string(),
            });
        }
        let signing_failed = |reason: String| ModelpackError::SigningFailed {
            artifact: artifact.display().to_string(),
            reason,
        };
        if !artifact.is_file() {
            return Err(signing_failed("package does not exist".to_string()));
        }

        tracing::info!(target: "signing", "Signing {}", artifact.display());
        let output = self
            .command(artifact, certificate, password)
            .run()
            .await
            .map_err(|e| signing_failed(e.to_string()))?;

        if output.success {
            tracing::info!(target: "signing", "Signed {}", artifact.display());
            Ok(())
        } else {
            Err(signing_failed(format!("signtool {}", output.failure_reason())))
        }
    }
}
