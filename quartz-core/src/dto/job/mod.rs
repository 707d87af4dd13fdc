//! Job DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job manifest read from `config.json` at the root of an uploaded archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub timezone: String,
    /// Cron expressions, one crontab line each
    pub schedule: Vec<String>,
}

/// Request to persist a job together with its schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    pub name: String,
    pub timezone: String,
    pub schedule: Vec<String>,
    pub container_id: String,
}

impl CreateJob {
    /// Builds the registry request for a manifest deployed under `container_id`
    pub fn from_config(config: JobConfig, container_id: impl Into<String>) -> Self {
        Self {
            name: config.name,
            timezone: config.timezone,
            schedule: config.schedule,
            container_id: container_id.into(),
        }
    }
}

/// Response returned after a successful deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreated {
    pub id: Uuid,
    pub container_id: String,
}
