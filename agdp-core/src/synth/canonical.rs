//! The fixed transformation every artifact describes
//!
//! Descriptions are documentation only. All renderers read column names,
//! paths and constants from [`CanonicalTransform`] so that the script, the
//! SQL, the checks and the flow stay in agreement.

/// Filter `value > threshold`, then derive `value_doubled = value * factor`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalTransform {
    pub id_column: &'static str,
    pub value_column: &'static str,
    pub derived_column: &'static str,
    pub threshold: i64,
    pub factor: i64,
    pub input_path: &'static str,
    pub output_path: &'static str,
    pub source_table: &'static str,
    pub target_table: &'static str,
}

pub const CANONICAL: CanonicalTransform = CanonicalTransform {
    id_column: "id",
    value_column: "value",
    derived_column: "value_doubled",
    threshold: 0,
    factor: 2,
    input_path: "data/input.csv",
    output_path: "data/output.parquet",
    source_table: "source_data",
    target_table: "transformed_data",
};

impl CanonicalTransform {
    /// Columns present in the transformed output
    pub fn output_columns(&self) -> [&'static str; 3] {
        [self.id_column, self.value_column, self.derived_column]
    }

    /// `value > 0`
    pub fn sql_predicate(&self) -> String {
        format!("{} > {}", self.value_column, self.threshold)
    }

    /// `value * 2 AS value_doubled`
    pub fn sql_derivation(&self) -> String {
        format!(
            "{} * {} AS {}",
            self.value_column, self.factor, self.derived_column
        )
    }
}
