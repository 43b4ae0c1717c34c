//! Execution domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::log::{LogEntry, LogLevel};
use crate::domain::pipeline::Pipeline;
use crate::error::{CoreError, Result};

/// Execution record
///
/// References its pipeline by id. The log is append-only and the record is
/// frozen once it leaves `Running`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: Uuid,
    pub pipeline_id: Uuid,
    pub status: ExecutionStatus,
    pub logs: Vec<LogEntry>,
    pub output: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Running => "running",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "running" => Ok(ExecutionStatus::Running),
            "completed" => Ok(ExecutionStatus::Completed),
            "failed" => Ok(ExecutionStatus::Failed),
            other => Err(format!("unknown execution status '{}'", other)),
        }
    }
}

impl Execution {
    /// Open a running execution for a ready pipeline
    pub fn start(pipeline: &Pipeline, started_at: DateTime<Utc>) -> Result<Self> {
        if !pipeline.is_ready() {
            return Err(CoreError::PipelineNotReady {
                id: pipeline.id,
                status: pipeline.status,
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            pipeline_id: pipeline.id,
            status: ExecutionStatus::Running,
            logs: Vec::new(),
            output: None,
            started_at,
            completed_at: None,
        })
    }

    fn ensure_running(&self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(CoreError::ExecutionFinished {
                id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    /// Append a log entry.
    ///
    /// Timestamps never go backwards: an entry older than the previous one is
    /// recorded at the previous entry's time.
    pub fn log(
        &mut self,
        level: LogLevel,
        message: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_running()?;

        let floor = self
            .logs
            .last()
            .map(|entry| entry.timestamp)
            .unwrap_or(self.started_at);

        self.logs.push(LogEntry {
            timestamp: at.max(floor),
            level,
            message: message.into(),
        });
        Ok(())
    }

    /// Leave `Running`. `completed_at` is set here and nowhere else.
    pub fn finish(
        &mut self,
        status: ExecutionStatus,
        output: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_running()?;

        if !status.is_terminal() {
            return Err(CoreError::ExecutionFinished {
                id: self.id,
                status,
            });
        }

        self.status = status;
        self.output = output;
        self.completed_at = Some(at.max(self.started_at));
        Ok(())
    }
}
