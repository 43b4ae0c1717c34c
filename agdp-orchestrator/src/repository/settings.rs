//! Settings Repository
//!
//! Handles all database operations related to settings key/value pairs.

use sqlx::PgPool;
use std::collections::HashMap;

/// Load every stored pair
pub async fn load_all(pool: &PgPool) -> Result<HashMap<String, String>, sqlx::Error> {
    let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().collect())
}

/// Insert or overwrite each pair
pub async fn upsert(pool: &PgPool, pairs: HashMap<String, String>) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now();

    for (key, value) in pairs {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Insert the pairs whose key is missing
pub async fn insert_missing(
    pool: &PgPool,
    pairs: HashMap<String, String>,
) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now();

    for (key, value) in pairs {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO NOTHING
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(pool)
        .await?;
    }

    Ok(())
}
