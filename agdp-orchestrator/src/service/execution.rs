//! Execution Service
//!
//! Starts pipeline runs and serves their records. A pipeline has at most one
//! active execution: the `Ready -> Running` claim is a compare-and-set.

use agdp_core::CoreError;
use agdp_core::domain::execution::Execution;
use agdp_core::domain::pipeline::PipelineStatus;
use agdp_core::error::RecordKind;
use agdp_core::executor::Executor;
use agdp_core::lifecycle;
use agdp_core::store::{ExecutionStore, PipelineStore, StoreError};
use uuid::Uuid;

/// Service error type
#[derive(Debug)]
pub enum ExecutionError {
    NotFound(Uuid),
    PipelineNotFound(Uuid),
    NotReady(String),
    StoreError(StoreError),
}

impl From<StoreError> for ExecutionError {
    fn from(err: StoreError) -> Self {
        ExecutionError::StoreError(err)
    }
}

impl From<CoreError> for ExecutionError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::RecordNotFound {
                kind: RecordKind::Pipeline,
                id,
            } => ExecutionError::PipelineNotFound(id),
            CoreError::RecordNotFound {
                kind: RecordKind::Execution,
                id,
            } => ExecutionError::NotFound(id),
            other => ExecutionError::NotReady(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExecutionError>;

/// Start an execution of a ready pipeline and run it to completion
pub async fn start_execution<S>(
    store: &S,
    executor: &dyn Executor,
    pipeline_id: Uuid,
) -> Result<Execution>
where
    S: PipelineStore + ExecutionStore + ?Sized,
{
    let mut pipeline = store
        .get_pipeline(pipeline_id)
        .await?
        .ok_or_else(|| CoreError::pipeline_not_found(pipeline_id))?;

    if !pipeline.is_ready() {
        return Err(CoreError::PipelineNotReady {
            id: pipeline_id,
            status: pipeline.status,
        }
        .into());
    }

    // Claim the pipeline; a concurrent start loses here
    let claimed = store
        .compare_and_set_status(pipeline_id, PipelineStatus::Ready, PipelineStatus::Running)
        .await?;

    if !claimed {
        let status = store
            .get_pipeline(pipeline_id)
            .await?
            .ok_or(ExecutionError::PipelineNotFound(pipeline_id))?
            .status;
        tracing::warn!(
            "Pipeline {} was claimed concurrently (now {})",
            pipeline_id,
            status
        );
        return Err(CoreError::PipelineNotReady {
            id: pipeline_id,
            status,
        }
        .into());
    }

    tracing::info!("Starting execution of pipeline {}", pipeline_id);

    let execution = match lifecycle::start_execution(&mut pipeline, executor, chrono::Utc::now())
        .await
    {
        Ok(execution) => execution,
        Err(e) => {
            release(store, pipeline_id, PipelineStatus::Failed).await;
            return Err(e.into());
        }
    };

    if let Err(e) = store.create_execution(&execution).await {
        release(store, pipeline_id, PipelineStatus::Failed).await;
        return Err(e.into());
    }

    release(store, pipeline_id, pipeline.status).await;

    tracing::info!(
        "Execution {} of pipeline {} finished: {}",
        execution.id,
        pipeline_id,
        execution.status
    );

    Ok(execution)
}

/// Move a claimed pipeline out of `Running`
async fn release<S>(store: &S, pipeline_id: Uuid, status: PipelineStatus)
where
    S: PipelineStore + ?Sized,
{
    match store
        .compare_and_set_status(pipeline_id, PipelineStatus::Running, status)
        .await
    {
        Ok(true) => {}
        Ok(false) => tracing::warn!(
            "Pipeline {} left running state before release to {}",
            pipeline_id,
            status
        ),
        Err(e) => tracing::error!(
            "Failed to release pipeline {} to {}: {}",
            pipeline_id,
            status,
            e
        ),
    }
}

/// Get an execution by ID
pub async fn get_execution<S>(store: &S, id: Uuid) -> Result<Execution>
where
    S: ExecutionStore + ?Sized,
{
    let execution = store
        .get_execution(id)
        .await?
        .ok_or_else(|| CoreError::execution_not_found(id))?;

    Ok(execution)
}

/// List a pipeline's executions, newest first
pub async fn list_executions<S>(store: &S, pipeline_id: Uuid) -> Result<Vec<Execution>>
where
    S: PipelineStore + ExecutionStore + ?Sized,
{
    // Verify pipeline exists
    store
        .get_pipeline(pipeline_id)
        .await?
        .ok_or(ExecutionError::PipelineNotFound(pipeline_id))?;

    let executions = store.list_executions(pipeline_id).await?;
    Ok(executions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agdp_core::domain::execution::ExecutionStatus;
    use agdp_core::domain::log::LogLevel;
    use agdp_core::domain::pipeline::Pipeline;
    use agdp_core::domain::toggles::ToggleSet;
    use agdp_core::dto::pipeline::CreatePipeline;
    use agdp_core::executor::{SIMULATED_OUTPUT, SimulatedExecutor};
    use agdp_core::store::{InMemoryStore, ListQuery, StoreResult};
    use agdp_core::synth::TemplateSynthesizer;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Serves a fixed snapshot for the next `stale_reads` pipeline reads,
    /// as if another caller changed the record right after it was read
    struct StaleReadStore {
        inner: InMemoryStore,
        snapshot: Mutex<Option<(Pipeline, usize)>>,
    }

    impl StaleReadStore {
        fn serve_stale(&self, pipeline: Pipeline, stale_reads: usize) {
            *self.snapshot.lock().unwrap() = Some((pipeline, stale_reads));
        }
    }

    #[async_trait]
    impl PipelineStore for StaleReadStore {
        async fn create_pipeline(&self, req: CreatePipeline) -> StoreResult<Pipeline> {
            self.inner.create_pipeline(req).await
        }

        async fn get_pipeline(&self, id: Uuid) -> StoreResult<Option<Pipeline>> {
            {
                let mut snapshot = self.snapshot.lock().unwrap();
                if let Some((pipeline, remaining)) = snapshot.as_mut()
                    && pipeline.id == id
                    && *remaining > 0
                {
                    *remaining -= 1;
                    return Ok(Some(pipeline.clone()));
                }
            }
            self.inner.get_pipeline(id).await
        }

        async fn list_pipelines(&self, query: ListQuery) -> StoreResult<Vec<Pipeline>> {
            self.inner.list_pipelines(query).await
        }

        async fn save_pipeline(
            &self,
            pipeline: &Pipeline,
            expected: PipelineStatus,
        ) -> StoreResult<bool> {
            self.inner.save_pipeline(pipeline, expected).await
        }

        async fn compare_and_set_status(
            &self,
            id: Uuid,
            expected: PipelineStatus,
            new: PipelineStatus,
        ) -> StoreResult<bool> {
            self.inner.compare_and_set_status(id, expected, new).await
        }

        async fn delete_pipeline(&self, id: Uuid) -> StoreResult<bool> {
            self.inner.delete_pipeline(id).await
        }
    }

    #[async_trait]
    impl ExecutionStore for StaleReadStore {
        async fn create_execution(&self, execution: &Execution) -> StoreResult<()> {
            self.inner.create_execution(execution).await
        }

        async fn get_execution(&self, id: Uuid) -> StoreResult<Option<Execution>> {
            self.inner.get_execution(id).await
        }

        async fn list_executions(&self, pipeline_id: Uuid) -> StoreResult<Vec<Execution>> {
            self.inner.list_executions(pipeline_id).await
        }
    }

    async fn ready_pipeline(store: &InMemoryStore) -> Pipeline {
        let mut pipeline = store
            .create_pipeline(CreatePipeline {
                name: "Sales".to_string(),
                description: "daily sales rollup".to_string(),
                toggles: ToggleSet::new(true, false, false, true),
                schedule: None,
            })
            .await
            .unwrap();
        lifecycle::synthesize(
            &mut pipeline,
            &TemplateSynthesizer::default(),
            chrono::Utc::now(),
        )
        .unwrap();
        assert!(
            store
                .save_pipeline(&pipeline, PipelineStatus::Draft)
                .await
                .unwrap()
        );
        pipeline
    }

    #[tokio::test]
    async fn test_start_execution_completes_pipeline() {
        let store = InMemoryStore::new();
        let pipeline = ready_pipeline(&store).await;

        let execution = start_execution(&store, &SimulatedExecutor::new(), pipeline.id)
            .await
            .unwrap();

        assert_eq!(execution.status, ExecutionStatus::Completed);
        assert_eq!(execution.output.as_deref(), Some(SIMULATED_OUTPUT));
        assert_eq!(execution.logs.last().unwrap().level, LogLevel::Success);

        let stored = store.get_pipeline(pipeline.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PipelineStatus::Completed);

        let found = get_execution(&store, execution.id).await.unwrap();
        assert_eq!(found, execution);
    }

    #[tokio::test]
    async fn test_draft_pipeline_is_not_ready() {
        let store = InMemoryStore::new();
        let pipeline = store
            .create_pipeline(CreatePipeline {
                name: "Sales".to_string(),
                description: "daily sales rollup".to_string(),
                toggles: ToggleSet::default(),
                schedule: None,
            })
            .await
            .unwrap();

        let result = start_execution(&store, &SimulatedExecutor::new(), pipeline.id).await;
        assert!(matches!(result, Err(ExecutionError::NotReady(_))));
        assert!(
            list_executions(&store, pipeline.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_completed_pipeline_must_be_regenerated() {
        let store = InMemoryStore::new();
        let pipeline = ready_pipeline(&store).await;
        let executor = SimulatedExecutor::new();

        start_execution(&store, &executor, pipeline.id).await.unwrap();
        let result = start_execution(&store, &executor, pipeline.id).await;
        assert!(matches!(result, Err(ExecutionError::NotReady(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_starts_admit_one() {
        let store = Arc::new(InMemoryStore::new());
        let pipeline_id = ready_pipeline(&store).await.id;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    start_execution(&*store, &SimulatedExecutor::new(), pipeline_id).await
                })
            })
            .collect();

        let mut started = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => started += 1,
                Err(ExecutionError::NotReady(_)) => {}
                Err(e) => panic!("unexpected error: {:?}", e),
            }
        }

        assert_eq!(started, 1);
        assert_eq!(list_executions(&*store, pipeline_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_claim_rejects_start_with_stale_ready_read() {
        let store = StaleReadStore {
            inner: InMemoryStore::new(),
            snapshot: Mutex::new(None),
        };
        let ready = ready_pipeline(&store.inner).await;
        let executor = SimulatedExecutor::new();

        start_execution(&store, &executor, ready.id).await.unwrap();

        // The second caller still sees the record as ready
        store.serve_stale(ready.clone(), 1);
        let result = start_execution(&store, &executor, ready.id).await;
        assert!(matches!(result, Err(ExecutionError::NotReady(_))));

        let stored = store.inner.get_pipeline(ready.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PipelineStatus::Completed);
        assert_eq!(list_executions(&store, ready.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_records() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();

        assert!(matches!(
            start_execution(&store, &SimulatedExecutor::new(), id).await,
            Err(ExecutionError::PipelineNotFound(_))
        ));
        assert!(matches!(
            get_execution(&store, id).await,
            Err(ExecutionError::NotFound(_))
        ));
        assert!(matches!(
            list_executions(&store, id).await,
            Err(ExecutionError::PipelineNotFound(_))
        ));
    }
}
