//! In-process record store
//!
//! Keeps every record behind one mutex. Used by the test suites and by the
//! orchestrator's `--in-memory` mode.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::execution::Execution;
use crate::domain::pipeline::{Pipeline, PipelineStatus};
use crate::dto::pipeline::CreatePipeline;
use crate::store::{
    ExecutionStore, ListQuery, PipelineStore, SettingsStore, StoreError, StoreResult,
};

#[derive(Debug, Default)]
struct Tables {
    // insertion order
    pipelines: Vec<Pipeline>,
    executions: Vec<Execution>,
    settings: HashMap<String, String>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl PipelineStore for InMemoryStore {
    async fn create_pipeline(&self, req: CreatePipeline) -> StoreResult<Pipeline> {
        let pipeline = Pipeline::from_request(Uuid::new_v4(), req, chrono::Utc::now());
        self.lock()?.pipelines.push(pipeline.clone());
        Ok(pipeline)
    }

    async fn get_pipeline(&self, id: Uuid) -> StoreResult<Option<Pipeline>> {
        Ok(self.lock()?.pipelines.iter().find(|p| p.id == id).cloned())
    }

    async fn list_pipelines(&self, query: ListQuery) -> StoreResult<Vec<Pipeline>> {
        Ok(self
            .lock()?
            .pipelines
            .iter()
            .rev()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn save_pipeline(
        &self,
        pipeline: &Pipeline,
        expected: PipelineStatus,
    ) -> StoreResult<bool> {
        let mut tables = self.lock()?;
        match tables.pipelines.iter_mut().find(|p| p.id == pipeline.id) {
            Some(stored) if stored.status == expected => {
                *stored = pipeline.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: PipelineStatus,
        new: PipelineStatus,
    ) -> StoreResult<bool> {
        let mut tables = self.lock()?;
        match tables.pipelines.iter_mut().find(|p| p.id == id) {
            Some(stored) if stored.status == expected => {
                stored.status = new;
                stored.updated_at = chrono::Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_pipeline(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.lock()?;
        let before = tables.pipelines.len();
        tables.pipelines.retain(|p| p.id != id);
        if tables.pipelines.len() == before {
            return Ok(false);
        }
        tables.executions.retain(|e| e.pipeline_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ExecutionStore for InMemoryStore {
    async fn create_execution(&self, execution: &Execution) -> StoreResult<()> {
        self.lock()?.executions.push(execution.clone());
        Ok(())
    }

    async fn get_execution(&self, id: Uuid) -> StoreResult<Option<Execution>> {
        Ok(self.lock()?.executions.iter().find(|e| e.id == id).cloned())
    }

    async fn list_executions(&self, pipeline_id: Uuid) -> StoreResult<Vec<Execution>> {
        Ok(self
            .lock()?
            .executions
            .iter()
            .rev()
            .filter(|e| e.pipeline_id == pipeline_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SettingsStore for InMemoryStore {
    async fn load_settings(&self) -> StoreResult<HashMap<String, String>> {
        Ok(self.lock()?.settings.clone())
    }

    async fn store_settings(&self, pairs: HashMap<String, String>) -> StoreResult<()> {
        self.lock()?.settings.extend(pairs);
        Ok(())
    }

    async fn seed_settings(&self, pairs: HashMap<String, String>) -> StoreResult<()> {
        let mut tables = self.lock()?;
        for (key, value) in pairs {
            tables.settings.entry(key).or_insert(value);
        }
        Ok(())
    }
}
