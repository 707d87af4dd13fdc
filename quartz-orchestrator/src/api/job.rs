//! Job API Handlers
//!
//! HTTP endpoints for deploying, inspecting and deleting jobs.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use quartz_core::domain::job::Job;
use quartz_core::dto::job::JobCreated;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::service::{Upload, job_service};
use crate::state::AppState;

/// Multipart field carrying the job archive
const UPLOAD_FIELD: &str = "file";

/// POST /api/v0/jobs
/// Deploy an uploaded archive as a scheduled job
pub async fn deploy_job(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<JobCreated>)> {
    let upload = read_upload(&mut multipart).await?;

    tracing::info!(
        "Received upload {} ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    let job = state.deployer.deploy(upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(JobCreated {
            id: job.id,
            container_id: job.container_id,
        }),
    ))
}

/// GET /api/v0/jobs
/// List all jobs
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<Job>>> {
    tracing::debug!("Listing all jobs");

    let jobs = job_service::list_jobs(state.jobs.as_ref()).await?;
    Ok(Json(jobs))
}

/// GET /api/v0/jobs/{id}
/// Get job details by ID
pub async fn get_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Job>> {
    tracing::debug!("Getting job: {}", id);

    let job = job_service::get_job(state.jobs.as_ref(), id).await?;
    Ok(Json(job))
}

/// DELETE /api/v0/jobs/{id}
/// Tear down a job's container and image and delete it
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting job: {}", id);

    state.teardown.delete_job(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn read_upload(multipart: &mut Multipart) -> ApiResult<Upload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("uploaded file has no name".to_string()))?;
        let bytes = field.bytes().await?;

        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::BadRequest(format!(
        "missing multipart field \"{}\"",
        UPLOAD_FIELD
    )))
}
