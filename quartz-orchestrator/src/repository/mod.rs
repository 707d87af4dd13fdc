//! Repository Module
//!
//! Data access layer for the orchestrator. The job registry is consumed
//! through the [`JobRepository`] trait so the deployment pipeline can run
//! against Postgres in production and an in-memory store in tests.

pub mod job;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use quartz_core::domain::job::Job;
use quartz_core::dto::job::CreateJob;
use uuid::Uuid;

pub use job::PgJobRepository;

/// Persistence contract for jobs and their schedules
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Find a job by ID, with its schedule attached
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, sqlx::Error>;

    /// List all jobs, each with its schedule attached
    async fn list_all(&self) -> Result<Vec<Job>, sqlx::Error>;

    /// Insert a job and all of its cron entries in a single transaction
    ///
    /// Either every row commits or none does.
    async fn create(&self, req: CreateJob) -> Result<Job, sqlx::Error>;

    /// Delete a job and, by cascade, its schedule
    ///
    /// Returns `false` when no job with this ID exists.
    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error>;
}
