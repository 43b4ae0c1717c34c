//! Artifact synthesis
//!
//! Turns a pipeline description and its toggles into a consistent
//! [`ArtifactBundle`]. One engine choice and one canonical transformation are
//! derived per call and threaded through every renderer, which is what keeps
//! the script, the SQL, the checks and the flow in agreement.
//!
//! The synthesizer is an ordinary value: construct it once and hand it to
//! whoever needs it. A language-model backed implementation plugs in behind
//! the same [`ArtifactSynthesizer`] trait.

pub mod canonical;
pub mod engine;
pub mod templates;

use tracing::debug;

use crate::domain::artifact::ArtifactBundle;
use crate::domain::settings::Settings;
use crate::domain::toggles::ToggleSet;
use crate::error::{CoreError, Result};
use canonical::CANONICAL;

/// Produces artifact bundles
pub trait ArtifactSynthesizer: Send + Sync {
    /// Synthesize the artifacts for `description` under `toggles`.
    ///
    /// Fails with [`CoreError::EmptyDescription`] when the description is
    /// empty or whitespace-only.
    fn synthesize(&self, description: &str, toggles: &ToggleSet) -> Result<ArtifactBundle>;
}

/// Deterministic template-based synthesizer
///
/// Identical inputs always produce byte-identical bundles. The settings are
/// carried for a future model-backed generator and do not affect output.
#[derive(Debug, Clone, Default)]
pub struct TemplateSynthesizer {
    settings: Settings,
}

impl TemplateSynthesizer {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl ArtifactSynthesizer for TemplateSynthesizer {
    fn synthesize(&self, description: &str, toggles: &ToggleSet) -> Result<ArtifactBundle> {
        if description.trim().is_empty() {
            return Err(CoreError::EmptyDescription);
        }
        toggles.validate()?;

        let engine = toggles.engine();
        let t = &CANONICAL;

        debug!(
            "Synthesizing artifacts with {} (capabilities: {:?})",
            engine,
            toggles.capabilities()
        );

        Ok(ArtifactBundle {
            transform_code: templates::render_transform(description, engine, t),
            sql_code: toggles
                .embedded_sql
                .then(|| templates::render_sql(description, t)),
            quality_checks: toggles
                .quality_checks
                .then(|| templates::render_quality_checks(description, t)),
            orchestration_flow: toggles
                .orchestration
                .then(|| templates::render_orchestration_flow(description, engine, t)),
        })
    }
}
