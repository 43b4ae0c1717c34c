//! Capability toggles

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::synth::engine::DataFrameEngine;

/// The four independent capabilities a pipeline can request
///
/// Every combination is a legal synthesis input. A disabled toggle means the
/// matching artifact is absent from the bundle, never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToggleSet {
    /// Use the columnar dataframe engine instead of the row-oriented one
    #[serde(default)]
    pub columnar_engine: bool,

    /// Emit an embedded-SQL script
    #[serde(default)]
    pub embedded_sql: bool,

    /// Emit a data-quality check list
    #[serde(default)]
    pub quality_checks: bool,

    /// Emit an orchestration flow
    #[serde(default)]
    pub orchestration: bool,
}

impl ToggleSet {
    pub fn new(
        columnar_engine: bool,
        embedded_sql: bool,
        quality_checks: bool,
        orchestration: bool,
    ) -> Self {
        Self {
            columnar_engine,
            embedded_sql,
            quality_checks,
            orchestration,
        }
    }

    /// Validation point for toggle combinations.
    ///
    /// No combination is rejected today; callers go through here so that
    /// constraints such as mutually exclusive engines can be added later.
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// The dataframe engine every artifact must agree on
    pub fn engine(&self) -> DataFrameEngine {
        if self.columnar_engine {
            DataFrameEngine::Columnar
        } else {
            DataFrameEngine::RowOriented
        }
    }

    /// Human-readable labels of the enabled capabilities
    pub fn capabilities(&self) -> Vec<&'static str> {
        let mut enabled = Vec::new();
        if self.columnar_engine {
            enabled.push("columnar-engine");
        }
        if self.embedded_sql {
            enabled.push("embedded-sql");
        }
        if self.quality_checks {
            enabled.push("quality-checks");
        }
        if self.orchestration {
            enabled.push("orchestration");
        }
        enabled
    }

    /// Every one of the sixteen toggle combinations
    pub fn all_combinations() -> impl Iterator<Item = ToggleSet> {
        (0u8..16).map(|bits| ToggleSet {
            columnar_engine: bits & 0b0001 != 0,
            embedded_sql: bits & 0b0010 != 0,
            quality_checks: bits & 0b0100 != 0,
            orchestration: bits & 0b1000 != 0,
        })
    }
}
