//! Pipeline Repository
//!
//! Handles all database operations related to pipelines.

use agdp_core::domain::artifact::ArtifactBundle;
use agdp_core::domain::pipeline::{Pipeline, PipelineStatus, Schedule};
use agdp_core::domain::toggles::ToggleSet;
use agdp_core::dto::pipeline::CreatePipeline;
use agdp_core::store::{ListQuery, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, description,
           use_columnar_engine, use_embedded_sql, use_quality_checks, use_orchestration,
           transform_code, sql_code, quality_checks, orchestration_flow,
           status, schedule_enabled, schedule_cron, created_at, updated_at
    FROM pipelines
"#;

/// Create a new pipeline in the database
pub async fn create(pool: &PgPool, req: CreatePipeline) -> Result<Pipeline, sqlx::Error> {
    let pipeline = Pipeline::from_request(Uuid::new_v4(), req, chrono::Utc::now());

    sqlx::query(
        r#"
        INSERT INTO pipelines (
            id, name, description,
            use_columnar_engine, use_embedded_sql, use_quality_checks, use_orchestration,
            status, schedule_enabled, schedule_cron, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(pipeline.id)
    .bind(&pipeline.name)
    .bind(&pipeline.description)
    .bind(pipeline.toggles.columnar_engine)
    .bind(pipeline.toggles.embedded_sql)
    .bind(pipeline.toggles.quality_checks)
    .bind(pipeline.toggles.orchestration)
    .bind(pipeline.status.as_str())
    .bind(pipeline.schedule.enabled)
    .bind(&pipeline.schedule.cron)
    .bind(pipeline.created_at)
    .bind(pipeline.updated_at)
    .execute(pool)
    .await?;

    Ok(pipeline)
}

/// Find a pipeline by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<PipelineRow>, sqlx::Error> {
    sqlx::query_as::<_, PipelineRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// List pipelines, newest first
pub async fn list(pool: &PgPool, query: ListQuery) -> Result<Vec<PipelineRow>, sqlx::Error> {
    sqlx::query_as::<_, PipelineRow>(&format!(
        "{SELECT_COLUMNS} ORDER BY created_at DESC OFFSET $1 LIMIT $2"
    ))
    .bind(sql_bound(query.offset))
    .bind(sql_bound(query.limit))
    .fetch_all(pool)
    .await
}

/// OFFSET/LIMIT value; counts beyond `i64::MAX` saturate instead of wrapping
fn sql_bound(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Write back a pipeline while its stored status equals `expected`
pub async fn update(
    pool: &PgPool,
    pipeline: &Pipeline,
    expected: PipelineStatus,
) -> Result<bool, sqlx::Error> {
    let artifacts = pipeline.artifacts.as_ref();

    let result = sqlx::query(
        r#"
        UPDATE pipelines
        SET name = $1, description = $2,
            use_columnar_engine = $3, use_embedded_sql = $4,
            use_quality_checks = $5, use_orchestration = $6,
            transform_code = $7, sql_code = $8, quality_checks = $9, orchestration_flow = $10,
            status = $11, schedule_enabled = $12, schedule_cron = $13, updated_at = $14
        WHERE id = $15 AND status = $16
        "#,
    )
    .bind(&pipeline.name)
    .bind(&pipeline.description)
    .bind(pipeline.toggles.columnar_engine)
    .bind(pipeline.toggles.embedded_sql)
    .bind(pipeline.toggles.quality_checks)
    .bind(pipeline.toggles.orchestration)
    .bind(artifacts.map(|a| a.transform_code.as_str()))
    .bind(artifacts.and_then(|a| a.sql_code.as_deref()))
    .bind(artifacts.and_then(|a| a.quality_checks.as_deref()))
    .bind(artifacts.and_then(|a| a.orchestration_flow.as_deref()))
    .bind(pipeline.status.as_str())
    .bind(pipeline.schedule.enabled)
    .bind(&pipeline.schedule.cron)
    .bind(pipeline.updated_at)
    .bind(pipeline.id)
    .bind(expected.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Move the status from `expected` to `new` in a single statement
pub async fn compare_and_set_status(
    pool: &PgPool,
    id: Uuid,
    expected: PipelineStatus,
    new: PipelineStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE pipelines
        SET status = $1, updated_at = $2
        WHERE id = $3 AND status = $4
        "#,
    )
    .bind(new.as_str())
    .bind(chrono::Utc::now())
    .bind(id)
    .bind(expected.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a pipeline by ID. Executions and their logs go with it.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM pipelines WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
pub struct PipelineRow {
    id: Uuid,
    name: String,
    description: String,
    use_columnar_engine: bool,
    use_embedded_sql: bool,
    use_quality_checks: bool,
    use_orchestration: bool,
    transform_code: Option<String>,
    sql_code: Option<String>,
    quality_checks: Option<String>,
    orchestration_flow: Option<String>,
    status: String,
    schedule_enabled: bool,
    schedule_cron: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<PipelineRow> for Pipeline {
    type Error = StoreError;

    fn try_from(row: PipelineRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<PipelineStatus>().map_err(|e| {
            StoreError::Corrupt(format!("pipeline {}: {}", row.id, e))
        })?;

        let artifacts = row.transform_code.map(|transform_code| ArtifactBundle {
            transform_code,
            sql_code: row.sql_code,
            quality_checks: row.quality_checks,
            orchestration_flow: row.orchestration_flow,
        });

        Ok(Pipeline {
            id: row.id,
            name: row.name,
            description: row.description,
            toggles: ToggleSet {
                columnar_engine: row.use_columnar_engine,
                embedded_sql: row.use_embedded_sql,
                quality_checks: row.use_quality_checks,
                orchestration: row.use_orchestration,
            },
            artifacts,
            status,
            schedule: Schedule {
                enabled: row.schedule_enabled,
                cron: row.schedule_cron,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_bound_saturates() {
        assert_eq!(sql_bound(0), 0);
        assert_eq!(sql_bound(100), 100);
        assert_eq!(sql_bound(usize::MAX), i64::MAX);
    }
}
