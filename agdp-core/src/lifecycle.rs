//! Pipeline lifecycle operations
//!
//! Combines the synthesizer and the executor with the transition rules on
//! [`Pipeline`]. These functions work on in-memory records; persisting the
//! result is up to the caller.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::execution::{Execution, ExecutionStatus};
use crate::domain::log::LogLevel;
use crate::domain::pipeline::{Pipeline, PipelineStatus};
use crate::error::{CoreError, Result};
use crate::executor::Executor;
use crate::synth::ArtifactSynthesizer;

/// `draft | ready | completed | failed -> ready`
///
/// On failure the pipeline is left untouched.
pub fn synthesize(
    pipeline: &mut Pipeline,
    synthesizer: &dyn ArtifactSynthesizer,
    now: DateTime<Utc>,
) -> Result<()> {
    if pipeline.status == PipelineStatus::Running {
        return Err(CoreError::PipelineRunning(pipeline.id));
    }

    let bundle = synthesizer.synthesize(&pipeline.description, &pipeline.toggles)?;
    pipeline.apply_synthesis(bundle, now)?;

    info!(
        "Pipeline {} synthesized ({} artifacts)",
        pipeline.id,
        pipeline.artifacts.as_ref().map_or(0, |a| a.artifact_count())
    );
    Ok(())
}

/// Start and run an execution of a ready pipeline.
///
/// Nothing is created when the pipeline is not ready.
pub async fn start_execution(
    pipeline: &mut Pipeline,
    executor: &dyn Executor,
    now: DateTime<Utc>,
) -> Result<Execution> {
    let mut execution = Execution::start(pipeline, now)?;
    pipeline.begin_execution()?;

    run_to_completion(pipeline, executor, &mut execution).await?;

    Ok(execution)
}

/// Drive a running pipeline's execution to a terminal status and mirror that
/// status onto the pipeline.
///
/// An executor error becomes an `error` log entry and a failed execution.
pub async fn run_to_completion(
    pipeline: &mut Pipeline,
    executor: &dyn Executor,
    execution: &mut Execution,
) -> Result<PipelineStatus> {
    if let Err(e) = executor.run(pipeline, execution).await {
        warn!("Execution {} failed: {}", execution.id, e);
        if !execution.status.is_terminal() {
            let now = Utc::now();
            execution.log(LogLevel::Error, format!("Execution failed: {}", e), now)?;
            execution.finish(ExecutionStatus::Failed, None, now)?;
        }
    }

    if !execution.status.is_terminal() {
        let now = Utc::now();
        execution.log(LogLevel::Error, "Executor returned without an outcome", now)?;
        execution.finish(ExecutionStatus::Failed, None, now)?;
    }

    let status = pipeline.finish_execution(execution.status, Utc::now())?;

    info!(
        "Execution {} of pipeline {} finished: {}",
        execution.id, pipeline.id, execution.status
    );
    Ok(status)
}
