//! Podman container engine
//!
//! Drives the `podman` CLI for the container lifecycle of deployed jobs:
//! - Checking podman availability
//! - Building images from packaged build contexts
//! - Creating, starting, stopping and removing containers
//!
//! Every invocation is bounded by a deadline; the child process is killed
//! when the deadline expires.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use tokio::process::Command;
use tracing::{debug, info};

use super::{ContainerEngine, EngineError};

/// Substrings podman prints when the target of a stop/rm/rmi does not exist
const NOT_FOUND_MARKERS: &[&str] = &[
    "no such container",
    "no container with name or id",
    "no such image",
    "image not known",
];

/// Container engine backed by the podman CLI
pub struct PodmanEngine {
    binary: String,
    timeout: Duration,
    recipe: String,
}

impl PodmanEngine {
    /// Creates a new podman engine
    ///
    /// # Arguments
    /// * `binary` - Podman executable name or path
    /// * `timeout` - Deadline for each podman invocation
    /// * `recipe` - Name of the image recipe inside build contexts (e.g., "Dockerfile")
    pub fn new(binary: impl Into<String>, timeout: Duration, recipe: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            recipe: recipe.into(),
        }
    }

    /// Checks if podman is installed and available
    pub async fn check_available(&self) -> Result<()> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .await
            .with_context(|| {
                format!(
                    "Failed to execute '{} --version'. Is podman installed?",
                    self.binary
                )
            })?;

        if !output.status.success() {
            anyhow::bail!("Podman is not working correctly");
        }

        let version = String::from_utf8_lossy(&output.stdout);
        info!("Podman is available: {}", version.trim());

        Ok(())
    }

    async fn run(
        &self,
        operation: &'static str,
        target: &str,
        args: &[&str],
    ) -> Result<Output, EngineError> {
        debug!("podman {} {:?}", operation, args);

        let mut command = Command::new(&self.binary);
        command.args(args).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| EngineError::TimedOut {
                operation,
                target: target.to_string(),
            })?
            .map_err(|source| EngineError::Spawn { operation, source })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !stdout.trim().is_empty() {
            debug!("podman {} stdout: {}", operation, stdout.trim());
        }
        if !stderr.trim().is_empty() {
            debug!("podman {} stderr: {}", operation, stderr.trim());
        }

        Ok(output)
    }

    /// Runs a podman command that must succeed
    async fn run_checked(
        &self,
        operation: &'static str,
        target: &str,
        args: &[&str],
    ) -> Result<(), EngineError> {
        let output = self.run(operation, target, args).await?;

        if !output.status.success() {
            return Err(failure(operation, target, &output));
        }

        Ok(())
    }

    /// Runs a podman command whose "not found" failure counts as success
    async fn run_tolerant(
        &self,
        operation: &'static str,
        target: &str,
        args: &[&str],
    ) -> Result<(), EngineError> {
        let output = self.run(operation, target, args).await?;

        if output.status.success() {
            return Ok(());
        }

        if is_not_found(&String::from_utf8_lossy(&output.stderr)) {
            debug!("{} skipped, {} does not exist", operation, target);
            return Ok(());
        }

        Err(failure(operation, target, &output))
    }
}

#[async_trait]
impl ContainerEngine for PodmanEngine {
    async fn build_image(&self, tag: &str, context: &Path) -> Result<(), EngineError> {
        info!("Building image {} from {}", tag, context.display());

        // podman only builds from directories, so unpack the context first
        let archive = context.to_path_buf();
        let workdir = tokio::task::spawn_blocking(move || unpack_context(&archive))
            .await
            .map_err(|e| EngineError::Context(e.to_string()))??;

        let dir = workdir.path().to_string_lossy().into_owned();
        let recipe = recipe_path(workdir.path(), &self.recipe)
            .to_string_lossy()
            .into_owned();

        self.run_checked(
            "build",
            tag,
            &["build", "-t", tag, "-f", recipe.as_str(), dir.as_str()],
        )
        .await?;

        info!("Image {} built", tag);
        Ok(())
    }

    async fn remove_image(&self, tag: &str) -> Result<(), EngineError> {
        self.run_tolerant("rmi", tag, &["rmi", "-f", tag]).await
    }

    async fn create_container(&self, name: &str, image: &str) -> Result<(), EngineError> {
        info!("Creating container {} from image {}", name, image);
        self.run_checked("create", name, &["create", "--name", name, image])
            .await
    }

    async fn start_container(&self, name: &str) -> Result<(), EngineError> {
        info!("Starting container {}", name);
        self.run_checked("start", name, &["start", name]).await
    }

    async fn stop_container(&self, name: &str) -> Result<(), EngineError> {
        self.run_tolerant("stop", name, &["stop", name]).await
    }

    async fn remove_container(&self, name: &str) -> Result<(), EngineError> {
        self.run_tolerant("rm", name, &["rm", "-f", name]).await
    }
}

fn unpack_context(archive: &Path) -> Result<tempfile::TempDir, EngineError> {
    let file = File::open(archive)
        .map_err(|e| EngineError::Context(format!("{}: {}", archive.display(), e)))?;

    let workdir = tempfile::Builder::new()
        .prefix("quartz-build-")
        .tempdir()
        .map_err(|e| EngineError::Context(e.to_string()))?;

    tar::Archive::new(GzDecoder::new(file))
        .unpack(workdir.path())
        .map_err(|e| EngineError::Context(format!("{}: {}", archive.display(), e)))?;

    Ok(workdir)
}

fn recipe_path(dir: &Path, recipe: &str) -> PathBuf {
    dir.join(recipe)
}

fn failure(operation: &'static str, target: &str, output: &Output) -> EngineError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stderr = if stderr.is_empty() {
        format!("exit_code={}", output.status.code().unwrap_or(-1))
    } else {
        stderr
    };

    EngineError::CommandFailed {
        operation,
        target: target.to_string(),
        stderr,
    }
}

fn is_not_found(stderr: &str) -> bool {
    let stderr = stderr.to_lowercase();
    NOT_FOUND_MARKERS
        .iter()
        .any(|marker| stderr.contains(marker))
}
