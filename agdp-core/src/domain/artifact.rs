//! Generated artifact bundle

use serde::{Deserialize, Serialize};

/// The text outputs of one synthesis call
///
/// `transform_code` is always present; every other artifact is present exactly
/// when its toggle was set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub transform_code: String,
    pub sql_code: Option<String>,
    pub quality_checks: Option<String>,
    pub orchestration_flow: Option<String>,
}

impl ArtifactBundle {
    /// Number of artifacts in the bundle
    pub fn artifact_count(&self) -> usize {
        1 + [&self.sql_code, &self.quality_checks, &self.orchestration_flow]
            .iter()
            .filter(|a| a.is_some())
            .count()
    }
}
