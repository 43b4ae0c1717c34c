//! Execution backends
//!
//! An [`Executor`] drives one execution record from `Running` to a terminal
//! status. [`SimulatedExecutor`] performs no work: it records a fixed run so
//! that callers can exercise the lifecycle end to end. A real backend must
//! keep the same log-entry shape and finish the record through
//! [`Execution::finish`].

use async_trait::async_trait;
use chrono::Duration;
use tracing::info;

use crate::domain::execution::{Execution, ExecutionStatus};
use crate::domain::log::LogLevel;
use crate::domain::pipeline::Pipeline;
use crate::error::Result;

/// Output summary recorded by the simulated run
pub const SIMULATED_OUTPUT: &str = "Pipeline executed successfully. Processed 1000 rows.";

const SIMULATED_LOG: [(LogLevel, &str); 5] = [
    (LogLevel::Info, "Execution started"),
    (LogLevel::Info, "Running extract phase..."),
    (LogLevel::Info, "Running transform phase..."),
    (LogLevel::Info, "Running load phase..."),
    (LogLevel::Success, "Execution completed successfully"),
];

/// Service trait for running a pipeline's artifacts
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run `pipeline`, appending to `execution`'s log and finishing it
    async fn run(&self, pipeline: &Pipeline, execution: &mut Execution) -> Result<()>;
}

/// Records a successful five-stage run without executing anything
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    /// Spacing between consecutive log entries
    step: Duration,
}

impl SimulatedExecutor {
    pub fn new() -> Self {
        Self {
            step: Duration::milliseconds(1),
        }
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Executor for SimulatedExecutor {
    async fn run(&self, pipeline: &Pipeline, execution: &mut Execution) -> Result<()> {
        info!(
            "Simulating execution {} of pipeline '{}' ({})",
            execution.id, pipeline.name, pipeline.id
        );

        let mut at = execution.started_at;
        for (level, message) in SIMULATED_LOG {
            at += self.step;
            execution.log(level, message, at)?;
        }

        execution.finish(
            ExecutionStatus::Completed,
            Some(SIMULATED_OUTPUT.to_string()),
            at,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::artifact::ArtifactBundle;
    use crate::domain::toggles::ToggleSet;
    use crate::dto::pipeline::CreatePipeline;
    use chrono::Utc;
    use uuid::Uuid;

    fn ready_pipeline() -> Pipeline {
        let mut pipeline = Pipeline::from_request(
            Uuid::new_v4(),
            CreatePipeline {
                name: "sales".to_string(),
                description: "daily sales rollup".to_string(),
                toggles: ToggleSet::default(),
                schedule: None,
            },
            Utc::now(),
        );
        let bundle = ArtifactBundle {
            transform_code: "# script".to_string(),
            sql_code: None,
            quality_checks: None,
            orchestration_flow: None,
        };
        pipeline.apply_synthesis(bundle, Utc::now()).unwrap();
        pipeline
    }

    #[tokio::test]
    async fn test_simulated_log_shape() {
        let pipeline = ready_pipeline();
        let mut execution = Execution::start(&pipeline, Utc::now()).unwrap();

        SimulatedExecutor::new()
            .run(&pipeline, &mut execution)
            .await
            .unwrap();

        let levels: Vec<LogLevel> = execution.logs.iter().map(|e| e.level).collect();
        assert_eq!(
            levels,
            vec![
                LogLevel::Info,
                LogLevel::Info,
                LogLevel::Info,
                LogLevel::Info,
                LogLevel::Success
            ]
        );
        assert!(
            execution
                .logs
                .windows(2)
                .all(|pair| pair[0].timestamp < pair[1].timestamp)
        );
        assert_eq!(execution.status, ExecutionStatus::Completed);
        assert_eq!(execution.output.as_deref(), Some(SIMULATED_OUTPUT));

        let completed_at = execution.completed_at.unwrap();
        assert!(completed_at >= execution.started_at);
        assert_eq!(Some(completed_at), execution.logs.last().map(|e| e.timestamp));
    }
}
