//! Pipeline DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::pipeline::{Pipeline, PipelineStatus, Schedule};
use crate::domain::toggles::ToggleSet;

/// Request to create a new pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePipeline {
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub toggles: ToggleSet,
    #[serde(default)]
    pub schedule: Option<Schedule>,
}

/// Partial pipeline edit; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePipeline {
    pub name: Option<String>,
    pub description: Option<String>,
    pub columnar_engine: Option<bool>,
    pub embedded_sql: Option<bool>,
    pub quality_checks: Option<bool>,
    pub orchestration: Option<bool>,
    pub schedule_enabled: Option<bool>,
    /// An empty string clears the cron expression
    pub schedule_cron: Option<String>,
}

impl UpdatePipeline {
    /// Overlay the toggles present in this update onto `current`
    pub fn merged_toggles(&self, current: ToggleSet) -> ToggleSet {
        ToggleSet {
            columnar_engine: self.columnar_engine.unwrap_or(current.columnar_engine),
            embedded_sql: self.embedded_sql.unwrap_or(current.embedded_sql),
            quality_checks: self.quality_checks.unwrap_or(current.quality_checks),
            orchestration: self.orchestration.unwrap_or(current.orchestration),
        }
    }
}

/// Lightweight pipeline summary for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: PipelineStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Pipeline> for PipelineSummary {
    fn from(pipeline: Pipeline) -> Self {
        Self {
            id: pipeline.id,
            name: pipeline.name,
            description: pipeline.description,
            status: pipeline.status,
            created_at: pipeline.created_at,
            updated_at: pipeline.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_reads_flat_toggles() {
        let req: CreatePipeline = serde_json::from_str(
            r#"{
                "name": "sales",
                "description": "daily sales rollup",
                "columnar_engine": true,
                "quality_checks": true
            }"#,
        )
        .unwrap();

        assert_eq!(req.toggles, ToggleSet::new(true, false, true, false));
        assert!(req.schedule.is_none());
    }

    #[test]
    fn test_merged_toggles_keeps_absent_fields() {
        let update = UpdatePipeline {
            embedded_sql: Some(false),
            orchestration: Some(true),
            ..Default::default()
        };
        let merged = update.merged_toggles(ToggleSet::new(true, true, true, false));
        assert_eq!(merged, ToggleSet::new(true, false, true, true));
    }

    #[test]
    fn test_pipeline_summary_conversion() {
        let pipeline = Pipeline::from_request(
            Uuid::new_v4(),
            CreatePipeline {
                name: "test".to_string(),
                description: "a test pipeline".to_string(),
                toggles: ToggleSet::default(),
                schedule: None,
            },
            chrono::Utc::now(),
        );

        let summary: PipelineSummary = pipeline.clone().into();
        assert_eq!(summary.id, pipeline.id);
        assert_eq!(summary.name, pipeline.name);
        assert_eq!(summary.status, PipelineStatus::Draft);
    }
}
