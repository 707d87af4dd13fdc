//! Error types for job deployment and management.

use thiserror::Error;
use uuid::Uuid;

use crate::engine::EngineError;

/// Result type alias for job operations
pub type Result<T> = std::result::Result<T, JobError>;

/// Errors raised while deploying, querying or deleting jobs
#[derive(Debug, Error)]
pub enum JobError {
    /// The uploaded archive is missing, malformed or could not be staged
    #[error("invalid upload: {0}")]
    Upload(String),

    /// `config.json` is missing or not well-formed
    #[error("invalid job configuration: {0}")]
    Configuration(String),

    /// Runtime template assets could not be read or written
    #[error("failed to materialize runtime template: {0}")]
    Template(String),

    /// The build context could not be written
    #[error("failed to package build context: {0}")]
    Packaging(String),

    /// A container engine call failed
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A registry call failed
    #[error("registry error: {0}")]
    Registry(#[from] sqlx::Error),

    /// No job with this id exists
    #[error("job {0} not found")]
    NotFound(Uuid),

    /// A failed deployment could not be rolled back; engine resources may be orphaned
    #[error("deployment {token} failed ({cause}) and cleanup failed: {cleanup}")]
    Compensation {
        token: Uuid,
        cause: Box<JobError>,
        cleanup: EngineError,
    },
}

impl JobError {
    /// Whether the failure was caused by the submitted payload
    pub fn is_client_fault(&self) -> bool {
        matches!(self, Self::Upload(_) | Self::Configuration(_))
    }
}
