//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::JobError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Multipart(MultipartError),
    Job(JobError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart(err) => err.status(),
            ApiError::Job(JobError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Job(err) if err.is_client_fault() => StatusCode::BAD_REQUEST,
            ApiError::Job(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Multipart(err) => err.body_text(),
            ApiError::Job(err) => {
                if status.is_server_error() {
                    tracing::error!("Request failed: {}", err);
                }
                err.to_string()
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        ApiError::Job(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use uuid::Uuid;

    fn status_of(err: JobError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_client_faults_are_bad_requests() {
        assert_eq!(
            status_of(JobError::Upload("empty".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(JobError::Configuration("missing".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_found() {
        assert_eq!(
            status_of(JobError::NotFound(Uuid::nil())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_server_faults() {
        assert_eq!(
            status_of(JobError::Template("missing".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(JobError::Engine(EngineError::TimedOut {
                operation: "build",
                target: "x".into(),
            })),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(JobError::Registry(sqlx::Error::PoolClosed)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
