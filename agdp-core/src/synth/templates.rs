//! Artifact templates
//!
//! Each renderer is a pure function of the description, the engine and the
//! canonical transformation.

use crate::synth::canonical::CanonicalTransform;
use crate::synth::engine::DataFrameEngine;

const INDENT: &str = "    ";

/// Characters that end a line for Python, SQL or YAML readers of the output
const LINE_BREAKS: [char; 7] = [
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Prefix every description line with `marker`, keeping the text verbatim.
///
/// Any line terminator starts a new comment line, so no part of the
/// description can end up outside the comment.
fn comment_block(marker: &str, description: &str) -> String {
    description
        .replace("\r\n", "\n")
        .split(LINE_BREAKS)
        .map(|line| {
            if line.is_empty() {
                marker.to_string()
            } else {
                format!("{} {}", marker, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Body of the `transform` function, shared by the script and the flow
fn transform_body(engine: DataFrameEngine, t: &CanonicalTransform) -> String {
    [
        engine.filter_statement(t),
        engine.derive_statement(t),
        "return df".to_string(),
    ]
    .iter()
    .map(|line| format!("{}{}", INDENT, line))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Extract/transform/load script
pub fn render_transform(
    description: &str,
    engine: DataFrameEngine,
    t: &CanonicalTransform,
) -> String {
    format!(
        r#"# Generated pipeline ({library})
#
{header}
{import}


def extract() -> {frame}:
    """Extract data from source"""
    return {read}


def transform(df: {frame}) -> {frame}:
    """Keep rows where {value} > {threshold} and derive {derived}"""
{body}


def load(df: {frame}) -> None:
    """Load data to destination"""
    {write}


if __name__ == "__main__":
    data = extract()
    transformed = transform(data)
    load(transformed)
    print("Pipeline completed successfully!")
"#,
        library = engine.library(),
        header = comment_block("#", description),
        import = engine.import_line(),
        frame = engine.frame_type(),
        read = engine.read_expr(t),
        value = t.value_column,
        threshold = t.threshold,
        derived = t.derived_column,
        body = transform_body(engine, t),
        write = engine.write_statement(t),
    )
}

/// DuckDB load-filter-export script
pub fn render_sql(description: &str, t: &CanonicalTransform) -> String {
    format!(
        r#"-- Generated SQL pipeline (DuckDB)
--
{header}

CREATE OR REPLACE TABLE {source} AS
SELECT * FROM read_csv_auto('{input}');

CREATE OR REPLACE TABLE {target} AS
SELECT
    *,
    {derivation}
FROM {source}
WHERE {predicate};

COPY {target} TO '{output}' (FORMAT PARQUET);
"#,
        header = comment_block("--", description),
        source = t.source_table,
        target = t.target_table,
        input = t.input_path,
        output = t.output_path,
        derivation = t.sql_derivation(),
        predicate = t.sql_predicate(),
    )
}

/// Soda check list over the transformed table
pub fn render_quality_checks(description: &str, t: &CanonicalTransform) -> String {
    format!(
        r#"# Soda data quality checks
#
{header}

checks for {target}:
  - row_count > 0
  - missing_count({value}) = 0
  - invalid_count({value}) = 0:
      valid min: {threshold}
  - duplicate_count({id}) = 0
  - schema:
      fail:
        when required column missing: [{columns}]
"#,
        header = comment_block("#", description),
        target = t.target_table,
        value = t.value_column,
        threshold = t.threshold,
        id = t.id_column,
        columns = t.output_columns().join(", "),
    )
}

/// Prefect flow wiring extract, transform and load in sequence
pub fn render_orchestration_flow(
    description: &str,
    engine: DataFrameEngine,
    t: &CanonicalTransform,
) -> String {
    format!(
        r#"# Generated Prefect flow ({library})
#
{header}
from prefect import flow, task
{import}


@task(name="Extract Data", retries=2)
def extract() -> {frame}:
    return {read}


@task(name="Transform Data")
def transform(df: {frame}) -> {frame}:
{body}


@task(name="Load Data")
def load(df: {frame}) -> str:
    {write}
    return "Success"


@flow(name="ETL Pipeline")
def etl_pipeline() -> str:
    data = extract()
    transformed = transform(data)
    return load(transformed)


if __name__ == "__main__":
    etl_pipeline()
"#,
        library = engine.library(),
        header = comment_block("#", description),
        import = engine.import_line(),
        frame = engine.frame_type(),
        read = engine.read_expr(t),
        body = transform_body(engine, t),
        write = engine.write_statement(t),
    )
}
