//! Dataframe engine idioms
//!
//! The engine is derived once per synthesis call and every Python artifact
//! renders its library calls through it.

use serde::{Deserialize, Serialize};

use crate::synth::canonical::CanonicalTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataFrameEngine {
    /// polars
    Columnar,
    /// pandas
    RowOriented,
}

impl DataFrameEngine {
    pub fn name(&self) -> &'static str {
        match self {
            DataFrameEngine::Columnar => "columnar-dataframe-engine",
            DataFrameEngine::RowOriented => "row-oriented-dataframe-engine",
        }
    }

    /// Python package name
    pub fn library(&self) -> &'static str {
        match self {
            DataFrameEngine::Columnar => "polars",
            DataFrameEngine::RowOriented => "pandas",
        }
    }

    /// Conventional import alias
    pub fn alias(&self) -> &'static str {
        match self {
            DataFrameEngine::Columnar => "pl",
            DataFrameEngine::RowOriented => "pd",
        }
    }

    pub fn import_line(&self) -> String {
        format!("import {} as {}", self.library(), self.alias())
    }

    pub fn frame_type(&self) -> String {
        format!("{}.DataFrame", self.alias())
    }

    pub fn read_expr(&self, t: &CanonicalTransform) -> String {
        format!("{}.read_csv(\"{}\")", self.alias(), t.input_path)
    }

    /// The filter statement. Every artifact that filters uses this exact text.
    pub fn filter_statement(&self, t: &CanonicalTransform) -> String {
        match self {
            DataFrameEngine::Columnar => format!(
                "df = df.filter(pl.col(\"{}\") > {})",
                t.value_column, t.threshold
            ),
            DataFrameEngine::RowOriented => format!(
                "df = df[df[\"{}\"] > {}]",
                t.value_column, t.threshold
            ),
        }
    }

    pub fn derive_statement(&self, t: &CanonicalTransform) -> String {
        match self {
            DataFrameEngine::Columnar => format!(
                "df = df.with_columns((pl.col(\"{}\") * {}).alias(\"{}\"))",
                t.value_column, t.factor, t.derived_column
            ),
            DataFrameEngine::RowOriented => format!(
                "df = df.assign({}=df[\"{}\"] * {})",
                t.derived_column, t.value_column, t.factor
            ),
        }
    }

    pub fn write_statement(&self, t: &CanonicalTransform) -> String {
        match self {
            DataFrameEngine::Columnar => format!("df.write_parquet(\"{}\")", t.output_path),
            DataFrameEngine::RowOriented => {
                format!("df.to_parquet(\"{}\", index=False)", t.output_path)
            }
        }
    }
}

impl std::fmt::Display for DataFrameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
