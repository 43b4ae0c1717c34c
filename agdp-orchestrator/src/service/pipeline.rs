//! Pipeline Service
//!
//! Business logic for pipeline management and artifact generation.

use agdp_core::CoreError;
use agdp_core::domain::pipeline::{Pipeline, PipelineStatus};
use agdp_core::dto::pipeline::{CreatePipeline, UpdatePipeline};
use agdp_core::lifecycle;
use agdp_core::store::{ListQuery, PipelineStore, StoreError};
use agdp_core::synth::ArtifactSynthesizer;
use uuid::Uuid;

const MAX_NAME_LENGTH: usize = 200;
const MIN_DESCRIPTION_LENGTH: usize = 10;

/// Service error type
#[derive(Debug)]
pub enum PipelineError {
    NotFound(Uuid),
    ValidationError(String),
    Conflict(String),
    StoreError(StoreError),
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        PipelineError::StoreError(err)
    }
}

impl From<CoreError> for PipelineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::RecordNotFound { id, .. } => PipelineError::NotFound(id),
            CoreError::EmptyDescription | CoreError::InvalidToggleSet(_) => {
                PipelineError::ValidationError(err.to_string())
            }
            other => PipelineError::Conflict(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Create a new pipeline
pub async fn create_pipeline<S>(store: &S, req: CreatePipeline) -> Result<Pipeline>
where
    S: PipelineStore + ?Sized,
{
    // Validate request
    validate_pipeline_request(&req)?;

    let pipeline = store.create_pipeline(req).await?;

    tracing::info!("Pipeline created: {} ({})", pipeline.name, pipeline.id);

    Ok(pipeline)
}

/// Get a pipeline by ID
pub async fn get_pipeline<S>(store: &S, id: Uuid) -> Result<Pipeline>
where
    S: PipelineStore + ?Sized,
{
    let pipeline = store
        .get_pipeline(id)
        .await?
        .ok_or_else(|| CoreError::pipeline_not_found(id))?;

    Ok(pipeline)
}

/// List pipelines, newest first
pub async fn list_pipelines<S>(store: &S, query: ListQuery) -> Result<Vec<Pipeline>>
where
    S: PipelineStore + ?Sized,
{
    let pipelines = store.list_pipelines(query).await?;
    Ok(pipelines)
}

/// Apply a partial edit. Changing the description or toggles drops the
/// generated artifacts and puts the pipeline back in draft.
pub async fn update_pipeline<S>(store: &S, id: Uuid, req: UpdatePipeline) -> Result<Pipeline>
where
    S: PipelineStore + ?Sized,
{
    // Validate request
    validate_update_request(&req)?;

    let mut pipeline = get_pipeline(store, id).await?;
    let expected = pipeline.status;

    let invalidated = pipeline.apply_update(req, chrono::Utc::now())?;
    write_back(store, &pipeline, expected).await?;

    if invalidated && expected != PipelineStatus::Draft {
        tracing::info!(
            "Pipeline {} edited, artifacts invalidated ({} -> {})",
            id,
            expected,
            pipeline.status
        );
    } else {
        tracing::info!("Pipeline updated: {}", id);
    }

    Ok(pipeline)
}

/// Delete a pipeline and its executions
pub async fn delete_pipeline<S>(store: &S, id: Uuid) -> Result<()>
where
    S: PipelineStore + ?Sized,
{
    let deleted = store.delete_pipeline(id).await?;

    if !deleted {
        return Err(PipelineError::NotFound(id));
    }

    tracing::info!("Pipeline deleted: {}", id);

    Ok(())
}

/// Synthesize the pipeline's artifacts and mark it ready
pub async fn generate_pipeline<S>(
    store: &S,
    synthesizer: &dyn ArtifactSynthesizer,
    id: Uuid,
) -> Result<Pipeline>
where
    S: PipelineStore + ?Sized,
{
    let mut pipeline = get_pipeline(store, id).await?;
    let expected = pipeline.status;

    lifecycle::synthesize(&mut pipeline, synthesizer, chrono::Utc::now())?;
    write_back(store, &pipeline, expected).await?;

    tracing::info!("Pipeline {} generated ({} -> {})", id, expected, pipeline.status);

    Ok(pipeline)
}

/// Persist `pipeline` unless someone changed its status since it was read
async fn write_back<S>(store: &S, pipeline: &Pipeline, expected: PipelineStatus) -> Result<()>
where
    S: PipelineStore + ?Sized,
{
    if store.save_pipeline(pipeline, expected).await? {
        return Ok(());
    }

    match store.get_pipeline(pipeline.id).await? {
        None => Err(PipelineError::NotFound(pipeline.id)),
        Some(current) => {
            tracing::warn!(
                "Pipeline {} changed concurrently ({} -> {})",
                pipeline.id,
                expected,
                current.status
            );
            Err(PipelineError::Conflict(format!(
                "Pipeline {} changed concurrently (now {})",
                pipeline.id, current.status
            )))
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PipelineError::ValidationError(
            "Pipeline name cannot be empty".to_string(),
        ));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(PipelineError::ValidationError(format!(
            "Pipeline name is too long (max {} characters)",
            MAX_NAME_LENGTH
        )));
    }

    Ok(())
}

fn validate_description(description: &str) -> Result<()> {
    if description.trim().chars().count() < MIN_DESCRIPTION_LENGTH {
        return Err(PipelineError::ValidationError(format!(
            "Pipeline description is too short (min {} characters)",
            MIN_DESCRIPTION_LENGTH
        )));
    }

    Ok(())
}

/// Five whitespace-separated fields; an empty expression clears the schedule
fn validate_cron(cron: &str) -> Result<()> {
    let fields = cron.split_whitespace().count();
    if fields != 0 && fields != 5 {
        return Err(PipelineError::ValidationError(format!(
            "Cron expression must have 5 fields, got {}",
            fields
        )));
    }

    Ok(())
}

fn validate_pipeline_request(req: &CreatePipeline) -> Result<()> {
    validate_name(&req.name)?;
    validate_description(&req.description)?;

    if let Some(cron) = req.schedule.as_ref().and_then(|s| s.cron.as_deref()) {
        validate_cron(cron)?;
    }

    Ok(())
}

fn validate_update_request(req: &UpdatePipeline) -> Result<()> {
    if let Some(name) = &req.name {
        validate_name(name)?;
    }
    if let Some(description) = &req.description {
        validate_description(description)?;
    }
    if let Some(cron) = &req.schedule_cron {
        validate_cron(cron)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agdp_core::domain::pipeline::Schedule;
    use agdp_core::domain::toggles::ToggleSet;
    use agdp_core::store::InMemoryStore;
    use agdp_core::synth::TemplateSynthesizer;

    fn request() -> CreatePipeline {
        CreatePipeline {
            name: "Sales".to_string(),
            description: "daily sales rollup".to_string(),
            toggles: ToggleSet::new(true, true, false, false),
            schedule: None,
        }
    }

    #[test]
    fn test_validate_empty_name() {
        let req = CreatePipeline {
            name: "  ".to_string(),
            ..request()
        };

        let result = validate_pipeline_request(&req);
        assert!(matches!(result, Err(PipelineError::ValidationError(_))));
    }

    #[test]
    fn test_validate_long_name() {
        let req = CreatePipeline {
            name: "x".repeat(201),
            ..request()
        };

        let result = validate_pipeline_request(&req);
        assert!(matches!(result, Err(PipelineError::ValidationError(_))));
    }

    #[test]
    fn test_validate_short_description() {
        let req = CreatePipeline {
            description: "rollup".to_string(),
            ..request()
        };

        let result = validate_pipeline_request(&req);
        assert!(matches!(result, Err(PipelineError::ValidationError(_))));
    }

    #[test]
    fn test_validate_cron() {
        let req = CreatePipeline {
            schedule: Some(Schedule {
                enabled: true,
                cron: Some("0 6 * *".to_string()),
            }),
            ..request()
        };
        assert!(validate_pipeline_request(&req).is_err());

        assert!(validate_cron("0 6 * * 1-5").is_ok());
        assert!(validate_cron("").is_ok());
    }

    #[test]
    fn test_validate_valid_request() {
        assert!(validate_pipeline_request(&request()).is_ok());
    }

    #[tokio::test]
    async fn test_generate_marks_ready() {
        let store = InMemoryStore::new();
        let synthesizer = TemplateSynthesizer::default();
        let pipeline = create_pipeline(&store, request()).await.unwrap();
        assert_eq!(pipeline.status, PipelineStatus::Draft);

        let generated = generate_pipeline(&store, &synthesizer, pipeline.id)
            .await
            .unwrap();
        assert_eq!(generated.status, PipelineStatus::Ready);

        let stored = get_pipeline(&store, pipeline.id).await.unwrap();
        assert_eq!(stored, generated);
        let bundle = stored.artifacts.unwrap();
        assert!(bundle.sql_code.is_some());
        assert!(bundle.orchestration_flow.is_none());
    }

    #[tokio::test]
    async fn test_update_invalidates_ready_pipeline() {
        let store = InMemoryStore::new();
        let synthesizer = TemplateSynthesizer::default();
        let pipeline = create_pipeline(&store, request()).await.unwrap();
        generate_pipeline(&store, &synthesizer, pipeline.id)
            .await
            .unwrap();

        let update = UpdatePipeline {
            quality_checks: Some(true),
            ..Default::default()
        };
        let updated = update_pipeline(&store, pipeline.id, update).await.unwrap();

        assert_eq!(updated.status, PipelineStatus::Draft);
        assert!(updated.artifacts.is_none());
        assert_eq!(get_pipeline(&store, pipeline.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_running_pipeline_conflicts() {
        let store = InMemoryStore::new();
        let synthesizer = TemplateSynthesizer::default();
        let pipeline = create_pipeline(&store, request()).await.unwrap();
        generate_pipeline(&store, &synthesizer, pipeline.id)
            .await
            .unwrap();
        store
            .compare_and_set_status(pipeline.id, PipelineStatus::Ready, PipelineStatus::Running)
            .await
            .unwrap();

        let update = UpdatePipeline {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let result = update_pipeline(&store, pipeline.id, update).await;
        assert!(matches!(result, Err(PipelineError::Conflict(_))));

        let result = generate_pipeline(&store, &synthesizer, pipeline.id).await;
        assert!(matches!(result, Err(PipelineError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_missing_pipeline() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();

        assert!(matches!(
            get_pipeline(&store, id).await,
            Err(PipelineError::NotFound(_))
        ));
        assert!(matches!(
            delete_pipeline(&store, id).await,
            Err(PipelineError::NotFound(_))
        ));
        assert!(matches!(
            generate_pipeline(&store, &TemplateSynthesizer::default(), id).await,
            Err(PipelineError::NotFound(_))
        ));
    }
}
