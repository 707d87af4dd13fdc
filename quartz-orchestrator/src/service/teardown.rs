//! Teardown Service
//!
//! Reverses deployments. Used to compensate a failed deployment and to
//! delete a job on request.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::{ContainerEngine, EngineError};
use crate::error::{JobError, Result};
use crate::repository::JobRepository;

/// Engine resources to release after a failed deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compensation {
    /// Nothing was built; only the staging directory needs to go
    StagingOnly,
    /// The image was built but no container exists
    Image,
    /// A container was created (and possibly started)
    ContainerAndImage,
}

/// Stops and removes containers and images, and deletes job records
pub struct Teardown {
    engine: Arc<dyn ContainerEngine>,
    jobs: Arc<dyn JobRepository>,
}

impl Teardown {
    pub fn new(engine: Arc<dyn ContainerEngine>, jobs: Arc<dyn JobRepository>) -> Self {
        Self { engine, jobs }
    }

    /// Releases the engine resources named `name` according to `plan`
    pub async fn release(&self, name: &str, plan: Compensation) -> std::result::Result<(), EngineError> {
        match plan {
            Compensation::StagingOnly => Ok(()),
            Compensation::Image => self.engine.remove_image(name).await,
            Compensation::ContainerAndImage => self.remove_deployment(name).await,
        }
    }

    /// Stops and removes the container `name`, then removes the image `name`
    ///
    /// Resources that do not exist are skipped, so this can be replayed.
    pub async fn remove_deployment(&self, name: &str) -> std::result::Result<(), EngineError> {
        // Force removal below kills the container anyway
        if let Err(e) = self.engine.stop_container(name).await {
            warn!("Failed to stop container {}: {}", name, e);
        }

        self.engine.remove_container(name).await?;
        self.engine.remove_image(name).await?;

        info!("Removed container and image {}", name);
        Ok(())
    }

    /// Deletes a job: tears down its container and image, then its record
    ///
    /// If the record cannot be deleted after teardown, the job row is left
    /// without a container. Teardown is idempotent, so retrying converges.
    pub async fn delete_job(&self, id: Uuid) -> Result<()> {
        let job = self
            .jobs
            .find_by_id(id)
            .await?
            .ok_or(JobError::NotFound(id))?;

        self.remove_deployment(&job.container_id).await?;

        match self.jobs.delete(id).await {
            Ok(true) => {
                info!("Job deleted: {} ({})", job.name, id);
                Ok(())
            }
            Ok(false) => Err(JobError::NotFound(id)),
            Err(e) => {
                error!(
                    job_id = %id,
                    container = %job.container_id,
                    "Container removed but job record could not be deleted: {}",
                    e
                );
                Err(e.into())
            }
        }
    }
}
