//! Measurement database initialization

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Schema version written on creation; bump with any table change
const SCHEMA_VERSION: i64 = 1;

/// Initialize a measurement database connection, creating the file and
/// tables when they do not exist yet
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new measurement database: {}", db_path.display());
    } else {
        info!("Opened existing measurement database: {}", db_path.display());
    }

    // WAL allows a live-reporting reader alongside the single writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    // Idempotent - safe to call on every open
    create_schema_version_table(&pool).await?;
    create_measurements_table(&pool).await?;

    Ok(pool)
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the measurements table
///
/// One row per cell. `value_type` selects which of the value columns is
/// meaningful; image_number 0 is the run-wide "Experiment" slot.
pub async fn create_measurements_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS measurements (
            object_name TEXT NOT NULL,
            feature TEXT NOT NULL,
            image_number INTEGER NOT NULL,
            value_type TEXT NOT NULL,
            int_value INTEGER,
            float_value REAL,
            text_value TEXT,
            blob_value BLOB,
            PRIMARY KEY (object_name, feature, image_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
