//! Execution Repository
//!
//! Handles all database operations related to executions and their logs.

use agdp_core::domain::execution::{Execution, ExecutionStatus};
use agdp_core::domain::log::{LogEntry, LogLevel};
use agdp_core::store::StoreError;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Insert an execution together with its log entries
pub async fn create(pool: &PgPool, execution: &Execution) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO executions (id, pipeline_id, status, output, started_at, completed_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(execution.id)
    .bind(execution.pipeline_id)
    .bind(execution.status.as_str())
    .bind(&execution.output)
    .bind(execution.started_at)
    .bind(execution.completed_at)
    .execute(&mut *tx)
    .await?;

    for (seq, entry) in execution.logs.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO execution_logs (execution_id, seq, timestamp, level, message)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(execution.id)
        .bind(seq as i32)
        .bind(entry.timestamp)
        .bind(entry.level.as_str())
        .bind(&entry.message)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

/// Find an execution by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ExecutionRows>, sqlx::Error> {
    let row = sqlx::query_as::<_, ExecutionRow>(
        r#"
        SELECT id, pipeline_id, status, output, started_at, completed_at
        FROM executions
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut logs = find_logs(pool, &[row.id]).await?;
    let logs = logs.remove(&row.id).unwrap_or_default();
    Ok(Some(ExecutionRows { row, logs }))
}

/// Find executions of a pipeline, newest first
pub async fn find_by_pipeline(
    pool: &PgPool,
    pipeline_id: Uuid,
) -> Result<Vec<ExecutionRows>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ExecutionRow>(
        r#"
        SELECT id, pipeline_id, status, output, started_at, completed_at
        FROM executions
        WHERE pipeline_id = $1
        ORDER BY started_at DESC
        "#,
    )
    .bind(pipeline_id)
    .fetch_all(pool)
    .await?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut logs = find_logs(pool, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let logs = logs.remove(&row.id).unwrap_or_default();
            ExecutionRows { row, logs }
        })
        .collect())
}

/// Log rows grouped by execution, each group in append order
async fn find_logs(
    pool: &PgPool,
    execution_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<LogRow>>, sqlx::Error> {
    if execution_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, LogRow>(
        r#"
        SELECT execution_id, timestamp, level, message
        FROM execution_logs
        WHERE execution_id = ANY($1)
        ORDER BY execution_id, seq ASC
        "#,
    )
    .bind(execution_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<LogRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.execution_id).or_default().push(row);
    }
    Ok(grouped)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
pub struct ExecutionRow {
    id: Uuid,
    pipeline_id: Uuid,
    status: String,
    output: Option<String>,
    started_at: chrono::DateTime<chrono::Utc>,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(sqlx::FromRow)]
pub struct LogRow {
    execution_id: Uuid,
    timestamp: chrono::DateTime<chrono::Utc>,
    level: String,
    message: String,
}

/// An execution row with its log rows
pub struct ExecutionRows {
    row: ExecutionRow,
    logs: Vec<LogRow>,
}

impl TryFrom<LogRow> for LogEntry {
    type Error = StoreError;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        let level = row.level.parse::<LogLevel>().map_err(|e| {
            StoreError::Corrupt(format!("log of execution {}: {}", row.execution_id, e))
        })?;

        Ok(LogEntry {
            timestamp: row.timestamp,
            level,
            message: row.message,
        })
    }
}

impl TryFrom<ExecutionRows> for Execution {
    type Error = StoreError;

    fn try_from(rows: ExecutionRows) -> Result<Self, Self::Error> {
        let ExecutionRows { row, logs } = rows;

        let status = row.status.parse::<ExecutionStatus>().map_err(|e| {
            StoreError::Corrupt(format!("execution {}: {}", row.id, e))
        })?;

        let logs = logs
            .into_iter()
            .map(LogEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Execution {
            id: row.id,
            pipeline_id: row.pipeline_id,
            status,
            logs,
            output: row.output,
            started_at: row.started_at,
            completed_at: row.completed_at,
        })
    }
}
