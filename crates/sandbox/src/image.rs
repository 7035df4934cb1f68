//! Runtime image lifecycle.
//!
//! Images are rebuilt rarely, once per code or environment change, and
//! never on the per-execution hot path. Containers already running from a
//! previous tag are unaffected by a rebuild; image content is resolved at
//! container start.

use std::path::Path;

use tokio::process::Command;

use scaffold_core::{Error, Result};

/// Builds and refreshes the sandbox runtime image through the docker CLI.
pub struct ImageManager {
    name: String,
}

impl ImageManager {
    /// Create a manager for the named image tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The managed image tag.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rebuild the image from `build_context`, replacing the tag.
    ///
    /// Unused container resources are pruned first as a disk-quota
    /// mitigation; prune failure is logged and swallowed. The build itself
    /// must succeed, and a failure carries the tool's diagnostics.
    pub async fn build(&self, build_context: &Path) -> Result<()> {
        self.prune().await;

        let output = Command::new("docker")
            .args(["build", "-t", &self.name])
            .arg(build_context)
            .output()
            .await
            .map_err(|e| Error::image_build(format!("Failed to invoke docker build: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::image_build(format!(
                "docker build -t {} failed: {}",
                self.name,
                stderr.trim()
            )));
        }

        tracing::info!(image = %self.name, context = %build_context.display(), "Runtime image built");
        Ok(())
    }

    /// Whether the tag currently resolves to an image.
    pub async fn exists(&self) -> bool {
        Command::new("docker")
            .args(["image", "inspect", &self.name])
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Build only when the tag does not resolve yet.
    pub async fn ensure(&self, build_context: &Path) -> Result<()> {
        if self.exists().await {
            return Ok(());
        }
        tracing::info!(image = %self.name, "Image missing, building");
        self.build(build_context).await
    }

    async fn prune(&self) {
        match Command::new("docker")
            .args(["system", "prune", "-f"])
            .output()
            .await
        {
            Ok(output) if !output.status.success() => {
                tracing::warn!(
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "docker prune failed, continuing"
                );
            }
            Err(e) => tracing::warn!(error = %e, "docker prune failed, continuing"),
            Ok(_) => {}
        }
    }
}
