//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use agdp_core::store::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::service::{execution_service, pipeline_service, settings_service};

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    StoreError(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::StoreError(err) => {
                tracing::error!("Store error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<pipeline_service::PipelineError> for ApiError {
    fn from(err: pipeline_service::PipelineError) -> Self {
        match err {
            pipeline_service::PipelineError::NotFound(id) => {
                ApiError::NotFound(format!("Pipeline {} not found", id))
            }
            pipeline_service::PipelineError::ValidationError(msg) => ApiError::BadRequest(msg),
            pipeline_service::PipelineError::Conflict(msg) => ApiError::Conflict(msg),
            pipeline_service::PipelineError::StoreError(err) => ApiError::StoreError(err),
        }
    }
}

impl From<execution_service::ExecutionError> for ApiError {
    fn from(err: execution_service::ExecutionError) -> Self {
        match err {
            execution_service::ExecutionError::NotFound(id) => {
                ApiError::NotFound(format!("Execution {} not found", id))
            }
            execution_service::ExecutionError::PipelineNotFound(id) => {
                ApiError::NotFound(format!("Pipeline {} not found", id))
            }
            execution_service::ExecutionError::NotReady(msg) => ApiError::BadRequest(msg),
            execution_service::ExecutionError::StoreError(err) => ApiError::StoreError(err),
        }
    }
}

impl From<settings_service::SettingsError> for ApiError {
    fn from(err: settings_service::SettingsError) -> Self {
        match err {
            settings_service::SettingsError::ValidationError(msg) => ApiError::BadRequest(msg),
            settings_service::SettingsError::StoreError(err) => ApiError::StoreError(err),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
