//! Pipeline domain types
//!
//! A pipeline owns its description, toggles, the bundle produced by the last
//! successful synthesis and a lifecycle status. Every status change goes
//! through [`PipelineStatus::can_transition_to`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::artifact::ArtifactBundle;
use crate::domain::execution::ExecutionStatus;
use crate::domain::toggles::ToggleSet;
use crate::dto::pipeline::{CreatePipeline, UpdatePipeline};
use crate::error::{CoreError, Result};

/// Pipeline definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: Uuid,
    pub name: String,
    /// Natural-language description the artifacts are synthesized from
    pub description: String,
    pub toggles: ToggleSet,
    pub artifacts: Option<ArtifactBundle>,
    pub status: PipelineStatus,
    pub schedule: Schedule,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pipeline lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Draft,
    Ready,
    Running,
    Completed,
    Failed,
}

/// Optional cron schedule attached to a pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub enabled: bool,
    pub cron: Option<String>,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::Draft => "draft",
            PipelineStatus::Ready => "ready",
            PipelineStatus::Running => "running",
            PipelineStatus::Completed => "completed",
            PipelineStatus::Failed => "failed",
        }
    }

    /// The closed transition table
    pub fn can_transition_to(self, next: PipelineStatus) -> bool {
        use PipelineStatus::*;

        match (self, next) {
            // synthesis, including regeneration
            (Draft | Ready | Completed | Failed, Ready) => true,
            // edits that invalidate the bundle
            (Ready | Completed | Failed, Draft) => true,
            (Ready, Running) => true,
            (Running, Completed | Failed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PipelineStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PipelineStatus::Draft),
            "ready" => Ok(PipelineStatus::Ready),
            "running" => Ok(PipelineStatus::Running),
            "completed" => Ok(PipelineStatus::Completed),
            "failed" => Ok(PipelineStatus::Failed),
            other => Err(format!("unknown pipeline status '{}'", other)),
        }
    }
}

impl Pipeline {
    /// Build a new draft pipeline from a create request
    pub fn from_request(id: Uuid, req: CreatePipeline, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: req.name,
            description: req.description,
            toggles: req.toggles,
            artifacts: None,
            status: PipelineStatus::Draft,
            schedule: req.schedule.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == PipelineStatus::Ready
    }

    fn transition(&mut self, next: PipelineStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Store a freshly synthesized bundle and mark the pipeline ready.
    ///
    /// The previous bundle is replaced wholesale.
    pub fn apply_synthesis(&mut self, bundle: ArtifactBundle, now: DateTime<Utc>) -> Result<()> {
        self.transition(PipelineStatus::Ready)?;
        self.artifacts = Some(bundle);
        self.updated_at = now;
        Ok(())
    }

    /// Apply a partial edit.
    ///
    /// Returns `true` when the description or toggles changed, in which case
    /// the bundle is dropped and the pipeline is back in `Draft`.
    pub fn apply_update(&mut self, update: UpdatePipeline, now: DateTime<Utc>) -> Result<bool> {
        if self.status == PipelineStatus::Running {
            return Err(CoreError::PipelineRunning(self.id));
        }

        let toggles = update.merged_toggles(self.toggles);
        let description = update.description.unwrap_or_else(|| self.description.clone());
        let invalidated = toggles != self.toggles || description != self.description;

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(enabled) = update.schedule_enabled {
            self.schedule.enabled = enabled;
        }
        if let Some(cron) = update.schedule_cron {
            self.schedule.cron = if cron.trim().is_empty() {
                None
            } else {
                Some(cron)
            };
        }

        if invalidated {
            self.description = description;
            self.toggles = toggles;
            self.artifacts = None;
            if self.status != PipelineStatus::Draft {
                self.transition(PipelineStatus::Draft)?;
            }
        }

        self.updated_at = now;
        Ok(invalidated)
    }

    /// `Ready -> Running`
    pub fn begin_execution(&mut self) -> Result<()> {
        if self.status != PipelineStatus::Ready {
            return Err(CoreError::PipelineNotReady {
                id: self.id,
                status: self.status,
            });
        }
        self.transition(PipelineStatus::Running)
    }

    /// `Running -> Completed | Failed`, following the execution outcome
    pub fn finish_execution(
        &mut self,
        outcome: ExecutionStatus,
        now: DateTime<Utc>,
    ) -> Result<PipelineStatus> {
        let next = match outcome {
            ExecutionStatus::Completed => PipelineStatus::Completed,
            ExecutionStatus::Failed => PipelineStatus::Failed,
            ExecutionStatus::Running => PipelineStatus::Running,
        };
        self.transition(next)?;
        self.updated_at = now;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> Pipeline {
        Pipeline::from_request(
            Uuid::new_v4(),
            CreatePipeline {
                name: "sales".to_string(),
                description: "daily sales rollup".to_string(),
                toggles: ToggleSet::new(true, true, false, false),
                schedule: None,
            },
            Utc::now(),
        )
    }

    fn bundle() -> ArtifactBundle {
        ArtifactBundle {
            transform_code: "# transform".to_string(),
            sql_code: None,
            quality_checks: None,
            orchestration_flow: None,
        }
    }

    #[test]
    fn test_new_pipeline_is_draft() {
        let pipeline = draft();
        assert_eq!(pipeline.status, PipelineStatus::Draft);
        assert!(pipeline.artifacts.is_none());
        assert!(!pipeline.schedule.enabled);
    }

    #[test]
    fn test_transition_table() {
        use PipelineStatus::*;

        assert!(Draft.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Running));
        assert!(Running.can_transition_to(Completed));
        assert!(Running.can_transition_to(Failed));
        assert!(Completed.can_transition_to(Ready));

        assert!(!Draft.can_transition_to(Running));
        assert!(!Running.can_transition_to(Ready));
        assert!(!Running.can_transition_to(Draft));
        assert!(!Completed.can_transition_to(Running));
        assert!(!Draft.can_transition_to(Completed));
    }

    #[test]
    fn test_synthesis_makes_ready() {
        let mut pipeline = draft();
        pipeline.apply_synthesis(bundle(), Utc::now()).unwrap();
        assert!(pipeline.is_ready());
        assert_eq!(pipeline.artifacts, Some(bundle()));
    }

    #[test]
    fn test_begin_execution_requires_ready() {
        let mut pipeline = draft();
        let err = pipeline.begin_execution().unwrap_err();
        assert!(matches!(
            err,
            CoreError::PipelineNotReady {
                status: PipelineStatus::Draft,
                ..
            }
        ));
        assert_eq!(pipeline.status, PipelineStatus::Draft);
    }

    #[test]
    fn test_editing_description_reverts_to_draft() {
        let mut pipeline = draft();
        pipeline.apply_synthesis(bundle(), Utc::now()).unwrap();

        let update = UpdatePipeline {
            description: Some("hourly sales rollup".to_string()),
            ..Default::default()
        };
        assert!(pipeline.apply_update(update, Utc::now()).unwrap());
        assert_eq!(pipeline.status, PipelineStatus::Draft);
        assert!(pipeline.artifacts.is_none());
    }

    #[test]
    fn test_editing_toggle_reverts_to_draft() {
        let mut pipeline = draft();
        pipeline.apply_synthesis(bundle(), Utc::now()).unwrap();

        let update = UpdatePipeline {
            orchestration: Some(true),
            ..Default::default()
        };
        assert!(pipeline.apply_update(update, Utc::now()).unwrap());
        assert!(pipeline.toggles.orchestration);
        assert_eq!(pipeline.status, PipelineStatus::Draft);
    }

    #[test]
    fn test_unchanged_values_keep_bundle() {
        let mut pipeline = draft();
        pipeline.apply_synthesis(bundle(), Utc::now()).unwrap();

        let update = UpdatePipeline {
            name: Some("renamed".to_string()),
            description: Some("daily sales rollup".to_string()),
            columnar_engine: Some(true),
            schedule_enabled: Some(true),
            schedule_cron: Some("0 6 * * *".to_string()),
            ..Default::default()
        };
        assert!(!pipeline.apply_update(update, Utc::now()).unwrap());
        assert!(pipeline.is_ready());
        assert_eq!(pipeline.name, "renamed");
        assert_eq!(pipeline.schedule.cron.as_deref(), Some("0 6 * * *"));
        assert!(pipeline.artifacts.is_some());
    }

    #[test]
    fn test_running_pipeline_rejects_edits_and_synthesis() {
        let mut pipeline = draft();
        pipeline.apply_synthesis(bundle(), Utc::now()).unwrap();
        pipeline.begin_execution().unwrap();

        let update = UpdatePipeline {
            name: Some("x".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            pipeline.apply_update(update, Utc::now()),
            Err(CoreError::PipelineRunning(_))
        ));
        assert!(matches!(
            pipeline.apply_synthesis(bundle(), Utc::now()),
            Err(CoreError::InvalidTransition { .. })
        ));
        assert_eq!(pipeline.name, "sales");
    }

    #[test]
    fn test_finish_execution_follows_outcome() {
        let mut pipeline = draft();
        pipeline.apply_synthesis(bundle(), Utc::now()).unwrap();
        pipeline.begin_execution().unwrap();

        let status = pipeline
            .finish_execution(ExecutionStatus::Failed, Utc::now())
            .unwrap();
        assert_eq!(status, PipelineStatus::Failed);

        // a finished pipeline must be regenerated before it runs again
        assert!(pipeline.begin_execution().is_err());
        pipeline.apply_synthesis(bundle(), Utc::now()).unwrap();
        assert!(pipeline.begin_execution().is_ok());
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            PipelineStatus::Draft,
            PipelineStatus::Ready,
            PipelineStatus::Running,
            PipelineStatus::Completed,
            PipelineStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<PipelineStatus>(), Ok(status));
        }
        assert!("Ready".parse::<PipelineStatus>().is_err());
    }
}
