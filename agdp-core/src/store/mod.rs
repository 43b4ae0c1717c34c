//! Record store contract
//!
//! The storage collaborator the lifecycle services talk to. Implementations
//! must be `Send + Sync` for use behind `Arc<dyn RecordStore>`.

pub mod memory;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::execution::Execution;
use crate::domain::pipeline::{Pipeline, PipelineStatus};
use crate::dto::pipeline::CreatePipeline;

pub use memory::InMemoryStore;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed to serve the request
    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A stored row could not be turned back into a record
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// A lock guarding in-process state was poisoned
    #[error("Store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Paging for list operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub offset: usize,
    pub limit: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
        }
    }
}

/// Pipeline records
#[async_trait]
pub trait PipelineStore: Send + Sync {
    /// Persist a new draft pipeline, assigning its id
    async fn create_pipeline(&self, req: CreatePipeline) -> StoreResult<Pipeline>;

    /// Returns `Ok(None)` when no pipeline has this id
    async fn get_pipeline(&self, id: Uuid) -> StoreResult<Option<Pipeline>>;

    /// Newest first
    async fn list_pipelines(&self, query: ListQuery) -> StoreResult<Vec<Pipeline>>;

    /// Write back every field of `pipeline`, but only while the stored status
    /// still equals `expected`.
    ///
    /// Returns `false` when the pipeline is gone or its status moved on.
    async fn save_pipeline(
        &self,
        pipeline: &Pipeline,
        expected: PipelineStatus,
    ) -> StoreResult<bool>;

    /// Atomically move the status from `expected` to `new`.
    ///
    /// Returns `true` if the update was applied, `false` if the current
    /// status didn't match or the pipeline is gone.
    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: PipelineStatus,
        new: PipelineStatus,
    ) -> StoreResult<bool>;

    /// Delete a pipeline and its executions. Returns `false` when absent.
    async fn delete_pipeline(&self, id: Uuid) -> StoreResult<bool>;
}

/// Execution records
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    async fn create_execution(&self, execution: &Execution) -> StoreResult<()>;

    /// Returns `Ok(None)` when no execution has this id
    async fn get_execution(&self, id: Uuid) -> StoreResult<Option<Execution>>;

    /// Executions of one pipeline, newest first
    async fn list_executions(&self, pipeline_id: Uuid) -> StoreResult<Vec<Execution>>;
}

/// Settings key/value pairs
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load_settings(&self) -> StoreResult<HashMap<String, String>>;

    /// Upsert every pair
    async fn store_settings(&self, pairs: HashMap<String, String>) -> StoreResult<()>;

    /// Insert the pairs whose key is not stored yet
    async fn seed_settings(&self, pairs: HashMap<String, String>) -> StoreResult<()>;
}

/// Everything the services need from storage
pub trait RecordStore: PipelineStore + ExecutionStore + SettingsStore {}

impl<T: PipelineStore + ExecutionStore + SettingsStore> RecordStore for T {}
