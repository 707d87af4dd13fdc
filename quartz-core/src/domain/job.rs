//! Job domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A deployed, schedulable unit
///
/// A job exists in the registry only while a container named `container_id`
/// has been created and started by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub name: String,
    pub timezone: String,
    /// Cron entries in the order they were declared
    pub schedule: Vec<Cron>,
    /// Container name and image tag, equal to the deployment request token
    pub container_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Job {
    /// Cron expressions of this job, in declaration order
    pub fn expressions(&self) -> Vec<&str> {
        self.schedule.iter().map(|c| c.expression.as_str()).collect()
    }
}

/// One schedule entry of a job
///
/// The expression is stored verbatim; field ranges are not validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cron {
    pub id: Uuid,
    pub expression: String,
}
