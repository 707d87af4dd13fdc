//! Template materializer
//!
//! Overlays the runtime template (image recipe and entry point) onto a
//! staged upload and reads the job manifest shipped with it.

use std::path::{Path, PathBuf};

use quartz_core::dto::job::JobConfig;
use tracing::debug;

use crate::error::{JobError, Result};

/// Job manifest expected at the root of every upload
pub const CONFIG_FILE: &str = "config.json";

/// Longest accepted job name, matching the `jobs.name` column
const MAX_NAME_LEN: usize = 255;

/// Longest accepted timezone, matching the `jobs.timezone` column
const MAX_TIMEZONE_LEN: usize = 64;

/// Runtime template copied into every build context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeTemplate {
    /// Directory holding the template assets
    pub dir: PathBuf,
    /// Image recipe file name inside `dir` (e.g., "Dockerfile")
    pub recipe: String,
    /// Entry point file name inside `dir` (e.g., "entry.js")
    pub entrypoint: String,
    /// Command that runs the entry point inside the container (e.g., "node")
    pub runtime: String,
}

impl Default for RuntimeTemplate {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("templates/nodejs"),
            recipe: "Dockerfile".to_string(),
            entrypoint: "entry.js".to_string(),
            runtime: "node".to_string(),
        }
    }
}

impl RuntimeTemplate {
    pub fn entrypoint_extension(&self) -> Option<&str> {
        Path::new(&self.entrypoint)
            .extension()
            .and_then(|ext| ext.to_str())
    }

    /// File name the entry point gets inside a staging directory
    ///
    /// Named after the request token so concurrently staged templates never collide.
    pub fn entrypoint_name(&self, token: &str) -> String {
        match self.entrypoint_extension() {
            Some(ext) => format!("{}.{}", token, ext),
            None => token.to_string(),
        }
    }

    /// Fails if any template asset is missing
    pub async fn check_assets(&self) -> Result<()> {
        for asset in [&self.recipe, &self.entrypoint] {
            let path = self.dir.join(asset);
            let is_file = tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);

            if !is_file {
                return Err(JobError::Template(format!(
                    "template asset {} not found",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Copies the recipe and the token-named entry point into `dest`
    ///
    /// Returns the entry point's file name inside `dest`.
    pub async fn materialize(&self, dest: &Path, token: &str) -> Result<String> {
        copy_asset(&self.dir.join(&self.recipe), &dest.join(&self.recipe)).await?;

        let entrypoint = self.entrypoint_name(token);
        copy_asset(&self.dir.join(&self.entrypoint), &dest.join(&entrypoint)).await?;

        debug!(
            "Materialized template {} into {}",
            self.dir.display(),
            dest.display()
        );
        Ok(entrypoint)
    }
}

/// Reads and validates the job manifest from a staging directory
pub async fn read_job_config(dir: &Path) -> Result<JobConfig> {
    let path = dir.join(CONFIG_FILE);

    let raw = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            JobError::Configuration(format!("{} not found in archive root", CONFIG_FILE))
        }
        _ => JobError::Configuration(format!("failed to read {}: {}", CONFIG_FILE, e)),
    })?;

    let config: JobConfig = serde_json::from_slice(&raw)
        .map_err(|e| JobError::Configuration(format!("{}: {}", CONFIG_FILE, e)))?;

    validate_job_config(&config)?;
    Ok(config)
}

fn validate_job_config(config: &JobConfig) -> Result<()> {
    if config.name.trim().is_empty() {
        return Err(JobError::Configuration(
            "job name cannot be empty".to_string(),
        ));
    }

    if config.name.chars().count() > MAX_NAME_LEN {
        return Err(JobError::Configuration(format!(
            "job name is too long (max {} characters)",
            MAX_NAME_LEN
        )));
    }

    if config.timezone.trim().is_empty() {
        return Err(JobError::Configuration(
            "job timezone cannot be empty".to_string(),
        ));
    }

    if config.timezone.chars().count() > MAX_TIMEZONE_LEN {
        return Err(JobError::Configuration(format!(
            "job timezone is too long (max {} characters)",
            MAX_TIMEZONE_LEN
        )));
    }

    // Each expression becomes exactly one crontab line
    if let Some(expression) = config
        .schedule
        .iter()
        .find(|expression| expression.chars().any(char::is_control))
    {
        return Err(JobError::Configuration(format!(
            "schedule expression {:?} contains control characters",
            expression
        )));
    }

    Ok(())
}

async fn copy_asset(from: &Path, to: &Path) -> Result<()> {
    let copy = async {
        super::unlink_if_symlink(to).await?;
        tokio::fs::copy(from, to).await
    };

    copy.await.map_err(|e| {
        JobError::Template(format!(
            "failed to copy {} to {}: {}",
            from.display(),
            to.display(),
            e
        ))
    })?;
    Ok(())
}
