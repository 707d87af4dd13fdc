//! Job Service
//!
//! Read-side queries over the job registry.

use quartz_core::domain::job::Job;
use uuid::Uuid;

use crate::error::{JobError, Result};
use crate::repository::JobRepository;

/// Get a job by ID
pub async fn get_job(jobs: &dyn JobRepository, id: Uuid) -> Result<Job> {
    let job = jobs.find_by_id(id).await?.ok_or(JobError::NotFound(id))?;

    Ok(job)
}

/// List all jobs, newest first, each with its schedule
pub async fn list_jobs(jobs: &dyn JobRepository) -> Result<Vec<Job>> {
    let jobs = jobs.list_all().await?;
    Ok(jobs)
}
