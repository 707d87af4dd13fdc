//! ID resolver module
//!
//! Resolves job ID prefixes to full UUIDs by querying the API, so users can
//! type short, unambiguous prefixes instead of full UUIDs.

use anyhow::{Context, Result, anyhow};
use quartz_client::OrchestratorClient;
use uuid::Uuid;

/// Resolve a job ID or prefix to a full UUID
///
/// Full UUIDs are returned without an API call.
pub async fn resolve_job_id(client: &OrchestratorClient, input: &str) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(input) {
        return Ok(uuid);
    }

    let jobs = client
        .list_jobs()
        .await
        .context("Failed to fetch jobs for ID resolution")?;

    match_prefix(jobs.iter().map(|job| job.id), input)
}

fn match_prefix(ids: impl IntoIterator<Item = Uuid>, input: &str) -> Result<Uuid> {
    let prefix = input.to_lowercase();
    if prefix.is_empty() {
        return Err(anyhow!("Job ID cannot be empty"));
    }

    let matches: Vec<Uuid> = ids
        .into_iter()
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!("No job found with ID starting with '{}'", prefix)),
        [id] => Ok(*id),
        _ => {
            let ids: Vec<String> = matches.iter().map(Uuid::to_string).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple jobs: {}",
                prefix,
                ids.join(", ")
            ))
        }
    }
}
