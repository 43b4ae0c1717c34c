//! Pipeline API Handlers
//!
//! HTTP endpoints for pipeline management and artifact generation.

use agdp_core::domain::pipeline::Pipeline;
use agdp_core::dto::pipeline::{CreatePipeline, PipelineSummary, UpdatePipeline};
use agdp_core::store::ListQuery;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::pipeline_service;

const MAX_PAGE_SIZE: usize = 1000;

/// Paging parameters for the list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        let defaults = ListQuery::default();
        Self {
            offset: params.skip.unwrap_or(defaults.offset),
            limit: params.limit.unwrap_or(defaults.limit).min(MAX_PAGE_SIZE),
        }
    }
}

/// POST /api/pipelines
/// Create a new draft pipeline
pub async fn create_pipeline(
    State(state): State<AppState>,
    Json(req): Json<CreatePipeline>,
) -> ApiResult<(StatusCode, Json<Pipeline>)> {
    tracing::info!("Creating pipeline: {}", req.name);

    let pipeline = pipeline_service::create_pipeline(&*state.store, req).await?;

    Ok((StatusCode::CREATED, Json(pipeline)))
}

/// GET /api/pipelines?skip=&limit=
/// List pipelines, newest first
pub async fn list_pipelines(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<PipelineSummary>>> {
    let query = ListQuery::from(params);
    tracing::debug!("Listing pipelines ({:?})", query);

    let pipelines = pipeline_service::list_pipelines(&*state.store, query).await?;

    Ok(Json(
        pipelines.into_iter().map(PipelineSummary::from).collect(),
    ))
}

/// GET /api/pipelines/{id}
/// Get pipeline by ID
pub async fn get_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Pipeline>> {
    tracing::debug!("Getting pipeline: {}", id);

    let pipeline = pipeline_service::get_pipeline(&*state.store, id).await?;

    Ok(Json(pipeline))
}

/// PUT /api/pipelines/{id}
/// Partially update a pipeline
pub async fn update_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePipeline>,
) -> ApiResult<Json<Pipeline>> {
    tracing::info!("Updating pipeline: {}", id);

    let pipeline = pipeline_service::update_pipeline(&*state.store, id, req).await?;

    Ok(Json(pipeline))
}

/// DELETE /api/pipelines/{id}
/// Delete a pipeline and its executions
pub async fn delete_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting pipeline: {}", id);

    pipeline_service::delete_pipeline(&*state.store, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/pipelines/{id}/generate
/// Synthesize artifacts and mark the pipeline ready
pub async fn generate_pipeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Pipeline>> {
    tracing::info!("Generating artifacts for pipeline: {}", id);

    let pipeline =
        pipeline_service::generate_pipeline(&*state.store, state.synthesizer.as_ref(), id)
            .await?;

    Ok(Json(pipeline))
}
