//! Deployment Service
//!
//! Drives an uploaded archive through the pipeline stages, from staging to
//! registry commit, and compensates whatever was already done when a stage
//! fails.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quartz_core::domain::job::Job;
use quartz_core::dto::job::CreateJob;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::engine::ContainerEngine;
use crate::error::{JobError, Result};
use crate::pipeline::template::{self, RuntimeTemplate};
use crate::pipeline::{package, schedule, stager};
use crate::repository::JobRepository;
use crate::service::teardown::{Compensation, Teardown};

/// An uploaded job archive
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Deployment progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    Staging,
    Configuring,
    Scheduling,
    Packaging,
    Building,
    Starting,
    Registering,
    Complete,
    Failed,
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployState::Staging => "staging",
            DeployState::Configuring => "configuring",
            DeployState::Scheduling => "scheduling",
            DeployState::Packaging => "packaging",
            DeployState::Building => "building",
            DeployState::Starting => "starting",
            DeployState::Registering => "registering",
            DeployState::Complete => "complete",
            DeployState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One in-flight deployment
struct Deployment {
    token: Uuid,
    dir: PathBuf,
    state: DeployState,
    /// Set before the engine is asked, so a call that fails after taking
    /// effect (e.g. past its deadline) is still released
    image_requested: bool,
    container_requested: bool,
}

impl Deployment {
    fn new(token: Uuid, dir: PathBuf) -> Self {
        Self {
            token,
            dir,
            state: DeployState::Staging,
            image_requested: false,
            container_requested: false,
        }
    }

    fn enter(&mut self, state: DeployState) {
        debug!(token = %self.token, "{} -> {}", self.state, state);
        self.state = state;
    }

    /// Engine resources to release if the deployment fails now
    fn compensation(&self) -> Compensation {
        if self.container_requested {
            Compensation::ContainerAndImage
        } else if self.image_requested {
            Compensation::Image
        } else {
            Compensation::StagingOnly
        }
    }
}

/// Sequences the pipeline stages for each upload
pub struct Deployer {
    engine: Arc<dyn ContainerEngine>,
    jobs: Arc<dyn JobRepository>,
    teardown: Arc<Teardown>,
    staging_dir: PathBuf,
    template: RuntimeTemplate,
}

impl Deployer {
    pub fn new(
        engine: Arc<dyn ContainerEngine>,
        jobs: Arc<dyn JobRepository>,
        teardown: Arc<Teardown>,
        staging_dir: PathBuf,
        template: RuntimeTemplate,
    ) -> Self {
        Self {
            engine,
            jobs,
            teardown,
            staging_dir,
            template,
        }
    }

    /// Deploys an uploaded archive as a scheduled job
    ///
    /// On success the job's container is running and the job is registered.
    /// On failure nothing the deployment created is left behind, unless
    /// cleanup itself fails, which is reported as [`JobError::Compensation`].
    /// The staging directory is removed either way.
    pub async fn deploy(&self, upload: Upload) -> Result<Job> {
        self.deploy_as(Uuid::new_v4(), upload).await
    }

    async fn deploy_as(&self, token: Uuid, upload: Upload) -> Result<Job> {
        let mut deployment = Deployment::new(token, self.staging_dir.join(token.to_string()));

        info!(token = %token, "Deploying {}", upload.file_name);

        let result = match self.run(&mut deployment, upload).await {
            Ok(job) => {
                deployment.enter(DeployState::Complete);
                info!(token = %token, "Job deployed: {} ({})", job.name, job.id);
                Ok(job)
            }
            Err(cause) => {
                let failed_at = deployment.state;
                deployment.enter(DeployState::Failed);
                warn!(token = %token, stage = %failed_at, "Deployment failed: {}", cause);
                Err(self.compensate(&deployment, cause).await)
            }
        };

        self.remove_staging(&deployment.dir).await;
        result
    }

    async fn run(&self, deployment: &mut Deployment, upload: Upload) -> Result<Job> {
        let token = deployment.token.to_string();

        tokio::fs::create_dir_all(&self.staging_dir)
            .await
            .map_err(|e| {
                JobError::Upload(format!(
                    "failed to create staging area {}: {}",
                    self.staging_dir.display(),
                    e
                ))
            })?;
        stager::stage_archive(&upload.file_name, upload.bytes, &deployment.dir).await?;

        deployment.enter(DeployState::Configuring);
        let config = template::read_job_config(&deployment.dir).await?;
        let entrypoint = self.template.materialize(&deployment.dir, &token).await?;

        deployment.enter(DeployState::Scheduling);
        if config.schedule.is_empty() {
            warn!(token = %token, "Job {} has an empty schedule and will never run", config.name);
        }
        schedule::compile(&config.schedule, &entrypoint, &self.template.runtime)
            .write(&deployment.dir)
            .await?;

        deployment.enter(DeployState::Packaging);
        let context = package::package(&deployment.dir, &token).await?;

        deployment.enter(DeployState::Building);
        deployment.image_requested = true;
        self.engine.build_image(&token, &context).await?;

        deployment.enter(DeployState::Starting);
        deployment.container_requested = true;
        self.engine.create_container(&token, &token).await?;
        self.engine.start_container(&token).await?;

        deployment.enter(DeployState::Registering);
        let job = self.jobs.create(CreateJob::from_config(config, token)).await?;

        Ok(job)
    }

    /// Releases the engine resources of a failed deployment
    ///
    /// Returns the error to report: `cause` itself, or a
    /// [`JobError::Compensation`] when cleanup failed as well.
    async fn compensate(&self, deployment: &Deployment, cause: JobError) -> JobError {
        let plan = deployment.compensation();
        let name = deployment.token.to_string();

        match self.teardown.release(&name, plan).await {
            Ok(()) => {
                debug!(token = %deployment.token, "Compensated {:?}", plan);
                cause
            }
            Err(cleanup) => {
                error!(
                    token = %deployment.token,
                    "Cleanup after failed deployment failed, resources may be orphaned: {}",
                    cleanup
                );
                JobError::Compensation {
                    token: deployment.token,
                    cause: Box::new(cause),
                    cleanup,
                }
            }
        }
    }

    async fn remove_staging(&self, dir: &Path) {
        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => debug!("Removed staging directory {}", dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove staging directory {}: {}",
                dir.display(),
                e
            ),
        }
    }
}
