//! Repository Module
//!
//! Data access layer for the orchestrator.
//! Each repository handles database operations for a specific domain entity;
//! [`PgStore`] exposes them through the core record-store traits.

pub mod execution;
pub mod pipeline;
pub mod settings;

// Re-export for convenience
pub use execution as execution_repository;
pub use pipeline as pipeline_repository;
pub use settings as settings_repository;

use agdp_core::domain::execution::Execution;
use agdp_core::domain::pipeline::{Pipeline, PipelineStatus};
use agdp_core::dto::pipeline::CreatePipeline;
use agdp_core::store::{
    ExecutionStore, ListQuery, PipelineStore, SettingsStore, StoreError, StoreResult,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// PostgreSQL-backed record store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PipelineStore for PgStore {
    async fn create_pipeline(&self, req: CreatePipeline) -> StoreResult<Pipeline> {
        pipeline_repository::create(&self.pool, req)
            .await
            .map_err(StoreError::backend)
    }

    async fn get_pipeline(&self, id: Uuid) -> StoreResult<Option<Pipeline>> {
        pipeline_repository::find_by_id(&self.pool, id)
            .await
            .map_err(StoreError::backend)?
            .map(Pipeline::try_from)
            .transpose()
    }

    async fn list_pipelines(&self, query: ListQuery) -> StoreResult<Vec<Pipeline>> {
        pipeline_repository::list(&self.pool, query)
            .await
            .map_err(StoreError::backend)?
            .into_iter()
            .map(Pipeline::try_from)
            .collect()
    }

    async fn save_pipeline(
        &self,
        pipeline: &Pipeline,
        expected: PipelineStatus,
    ) -> StoreResult<bool> {
        pipeline_repository::update(&self.pool, pipeline, expected)
            .await
            .map_err(StoreError::backend)
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: PipelineStatus,
        new: PipelineStatus,
    ) -> StoreResult<bool> {
        pipeline_repository::compare_and_set_status(&self.pool, id, expected, new)
            .await
            .map_err(StoreError::backend)
    }

    async fn delete_pipeline(&self, id: Uuid) -> StoreResult<bool> {
        pipeline_repository::delete(&self.pool, id)
            .await
            .map_err(StoreError::backend)
    }
}

#[async_trait]
impl ExecutionStore for PgStore {
    async fn create_execution(&self, execution: &Execution) -> StoreResult<()> {
        execution_repository::create(&self.pool, execution)
            .await
            .map_err(StoreError::backend)
    }

    async fn get_execution(&self, id: Uuid) -> StoreResult<Option<Execution>> {
        execution_repository::find_by_id(&self.pool, id)
            .await
            .map_err(StoreError::backend)?
            .map(Execution::try_from)
            .transpose()
    }

    async fn list_executions(&self, pipeline_id: Uuid) -> StoreResult<Vec<Execution>> {
        execution_repository::find_by_pipeline(&self.pool, pipeline_id)
            .await
            .map_err(StoreError::backend)?
            .into_iter()
            .map(Execution::try_from)
            .collect()
    }
}

#[async_trait]
impl SettingsStore for PgStore {
    async fn load_settings(&self) -> StoreResult<HashMap<String, String>> {
        settings_repository::load_all(&self.pool)
            .await
            .map_err(StoreError::backend)
    }

    async fn store_settings(&self, pairs: HashMap<String, String>) -> StoreResult<()> {
        settings_repository::upsert(&self.pool, pairs)
            .await
            .map_err(StoreError::backend)
    }

    async fn seed_settings(&self, pairs: HashMap<String, String>) -> StoreResult<()> {
        settings_repository::insert_missing(&self.pool, pairs)
            .await
            .map_err(StoreError::backend)
    }
}
