//! Execution API Handlers
//!
//! HTTP endpoints for starting and inspecting pipeline runs.

use agdp_core::domain::execution::Execution;
use agdp_core::dto::execution::CreateExecution;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::execution_service;

/// POST /api/executions
/// Start an execution of a ready pipeline
pub async fn start_execution(
    State(state): State<AppState>,
    Json(req): Json<CreateExecution>,
) -> ApiResult<(StatusCode, Json<Execution>)> {
    tracing::info!("Starting execution for pipeline: {}", req.pipeline_id);

    let execution = execution_service::start_execution(
        &*state.store,
        state.executor.as_ref(),
        req.pipeline_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(execution)))
}

/// GET /api/executions/{id}
/// Get execution details, including its log
pub async fn get_execution(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Execution>> {
    tracing::debug!("Getting execution: {}", id);

    let execution = execution_service::get_execution(&*state.store, id).await?;

    Ok(Json(execution))
}

/// GET /api/pipelines/{id}/executions
/// List a pipeline's executions, newest first
pub async fn list_pipeline_executions(
    State(state): State<AppState>,
    Path(pipeline_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Execution>>> {
    tracing::debug!("Listing executions for pipeline: {}", pipeline_id);

    let executions = execution_service::list_executions(&*state.store, pipeline_id).await?;

    Ok(Json(executions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ApiError;
    use crate::api::{pipeline, test_support};
    use agdp_core::domain::execution::ExecutionStatus;
    use agdp_core::domain::toggles::ToggleSet;
    use agdp_core::dto::pipeline::CreatePipeline;

    async fn create_draft(state: &AppState) -> Uuid {
        let (_, Json(pipeline)) = pipeline::create_pipeline(
            State(state.clone()),
            Json(CreatePipeline {
                name: "sales".to_string(),
                description: "daily sales rollup".to_string(),
                toggles: ToggleSet::default(),
                schedule: None,
            }),
        )
        .await
        .unwrap();
        pipeline.id
    }

    #[tokio::test]
    async fn test_start_draft_is_bad_request() {
        let state = test_support::state();
        let pipeline_id = create_draft(&state).await;

        let result = start_execution(State(state), Json(CreateExecution { pipeline_id })).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_start_ready_pipeline() {
        let state = test_support::state();
        let pipeline_id = create_draft(&state).await;
        pipeline::generate_pipeline(State(state.clone()), Path(pipeline_id))
            .await
            .unwrap();

        let (status, Json(execution)) =
            start_execution(State(state.clone()), Json(CreateExecution { pipeline_id }))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(execution.status, ExecutionStatus::Completed);

        let Json(found) = get_execution(State(state.clone()), Path(execution.id))
            .await
            .unwrap();
        assert_eq!(found.logs.len(), 5);

        let Json(listed) = list_pipeline_executions(State(state), Path(pipeline_id))
            .await
            .unwrap();
        assert_eq!(listed, vec![execution]);
    }

    #[tokio::test]
    async fn test_missing_execution_is_not_found() {
        let state = test_support::state();

        let result = get_execution(State(state), Path(Uuid::new_v4())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
