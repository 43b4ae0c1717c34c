//! Execution DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to start an execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExecution {
    pub pipeline_id: Uuid,
}
