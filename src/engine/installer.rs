//! Package installation via uv.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{ErrorCode, ReplError, ReplResult};

/// Outcome of a package installation attempt. Failures carry the message to
/// report back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    Failed(String),
}

/// Trait for installing packages into the worker's environment.
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    async fn install(&self, package: &str) -> ReplResult<InstallOutcome>;
}

/// Installs packages with `uv pip install`.
pub struct UvInstaller {
    uv_bin: PathBuf,
}

impl UvInstaller {
    pub fn new(uv_bin: impl Into<PathBuf>) -> Self {
        Self {
            uv_bin: uv_bin.into(),
        }
    }

    /// Runs `uv pip install <target>`, returning stderr on a non-zero exit.
    async fn pip_install(&self, target: &str) -> ReplResult<Result<(), String>> {
        debug!(package = target, "running uv pip install");
        let output = Command::new(&self.uv_bin)
            .args(["pip", "install", target])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                ReplError::with_message(
                    ErrorCode::InternalError,
                    format!("failed to run {}: {}", self.uv_bin.display(), e),
                )
            })?;

        if output.status.success() {
            Ok(Ok(()))
        } else {
            Ok(Err(String::from_utf8_lossy(&output.stderr).into_owned()))
        }
    }
}

#[async_trait]
impl PackageInstaller for UvInstaller {
    async fn install(&self, package: &str) -> ReplResult<InstallOutcome> {
        // uv environments do not ship pip; some sdist builds need it.
        if let Err(stderr) = self.pip_install("pip").await? {
            return Ok(InstallOutcome::Failed(format!(
                "Failed to install pip: {}",
                stderr
            )));
        }

        match self.pip_install(package).await? {
            Ok(()) => {
                info!(package, "package installed");
                Ok(InstallOutcome::Installed)
            }
            Err(stderr) => Ok(InstallOutcome::Failed(format!(
                "Failed to install package:\n{}",
                stderr
            ))),
        }
    }
}
