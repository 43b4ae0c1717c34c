//! Error types for AGDP core operations

use thiserror::Error;
use uuid::Uuid;

use crate::domain::execution::ExecutionStatus;
use crate::domain::pipeline::PipelineStatus;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by synthesis, lifecycle transitions and record lookups
#[derive(Debug, Error)]
pub enum CoreError {
    /// Synthesis was asked to work from an empty or whitespace-only description
    #[error("Pipeline description cannot be empty")]
    EmptyDescription,

    /// The toggle combination was rejected
    #[error("Invalid toggle set: {0}")]
    InvalidToggleSet(String),

    /// Execution was requested for a pipeline that is not ready
    #[error("Pipeline {id} is not ready for execution (current: {status})")]
    PipelineNotReady { id: Uuid, status: PipelineStatus },

    /// The pipeline is running and cannot be edited or regenerated
    #[error("Pipeline {0} is running")]
    PipelineRunning(Uuid),

    /// A status change outside the transition table
    #[error("Invalid pipeline transition from {from} to {to}")]
    InvalidTransition {
        from: PipelineStatus,
        to: PipelineStatus,
    },

    /// The execution already left the running state
    #[error("Execution {id} already finished with status {status}")]
    ExecutionFinished { id: Uuid, status: ExecutionStatus },

    /// The storage collaborator has no record with this id
    #[error("{kind} {id} not found")]
    RecordNotFound { kind: RecordKind, id: Uuid },
}

/// Record families held by the storage collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Pipeline,
    Execution,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Pipeline => write!(f, "Pipeline"),
            RecordKind::Execution => write!(f, "Execution"),
        }
    }
}

impl CoreError {
    /// Build a not-found error for a pipeline id
    pub fn pipeline_not_found(id: Uuid) -> Self {
        Self::RecordNotFound {
            kind: RecordKind::Pipeline,
            id,
        }
    }

    /// Build a not-found error for an execution id
    pub fn execution_not_found(id: Uuid) -> Self {
        Self::RecordNotFound {
            kind: RecordKind::Execution,
            id,
        }
    }

    /// Check if this error is a "not found" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let id = Uuid::new_v4();
        let err = CoreError::pipeline_not_found(id);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), format!("Pipeline {} not found", id));
    }

    #[test]
    fn test_not_ready_message_names_status() {
        let id = Uuid::new_v4();
        let err = CoreError::PipelineNotReady {
            id,
            status: PipelineStatus::Draft,
        };
        assert!(err.to_string().contains("draft"));
        assert!(!err.is_not_found());
    }
}
