//! Saving and loading a whole measurement store
//!
//! One row per cell, `value_type` tagging which value column holds the
//! payload. Vectors are little-endian f64 blobs so any length round-trips
//! bit for bit, including the empty vector. Scalar float NaN comes back as
//! NaN even though SQLite stores it as NULL.

use crate::error::{Error, Result};
use crate::store::Store;
use crate::value::Value;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Serialize every cell of the store, replacing any prior content of the
/// container
pub async fn save_measurements(pool: &SqlitePool, store: &Store) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM measurements").execute(&mut *tx).await?;

    let mut cell_count: u64 = 0;
    for (object, feature, image_number, value) in store.iter_cells() {
        let (int_value, float_value, text_value, blob_value) = encode(value);
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO measurements
                (object_name, feature, image_number, value_type,
                 int_value, float_value, text_value, blob_value)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(object)
        .bind(feature)
        .bind(image_number as i64)
        .bind(value.type_name())
        .bind(int_value)
        .bind(float_value)
        .bind(text_value)
        .bind(blob_value)
        .execute(&mut *tx)
        .await?;
        cell_count += 1;
    }

    tx.commit().await?;
    info!("Saved {} measurement cells", cell_count);
    Ok(())
}

/// Reconstruct a store from a saved container.
///
/// Cells are inserted raw, so the loaded store reproduces exactly what was
/// saved: registration comes back from the saved ImageNumber rows and
/// nowhere else. The current pointer is runtime state and starts at 1.
/// Every failure mode (missing file, unreadable container, missing table,
/// unknown value type, truncated vector blob) is `Error::Load`.
pub async fn load_measurements(db_path: &Path) -> Result<Store> {
    if !db_path.exists() {
        return Err(Error::Load(format!(
            "measurement database not found: {}",
            db_path.display()
        )));
    }

    // mode=ro: loading never writes
    let db_url = format!("sqlite://{}?mode=ro", db_path.display());
    let pool = SqlitePool::connect(&db_url)
        .await
        .map_err(|e| Error::Load(format!("cannot open {}: {}", db_path.display(), e)))?;

    let result = load_from_pool(&pool).await;
    pool.close().await;
    let store = result?;

    info!(
        "Loaded measurement database {} ({} image sets)",
        db_path.display(),
        store.get_image_numbers().len()
    );
    Ok(store)
}

async fn load_from_pool(pool: &SqlitePool) -> Result<Store> {
    let table: Option<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'measurements'",
    )
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::Load(format!("unreadable container: {}", e)))?;
    if table.is_none() {
        return Err(Error::Load(
            "not a measurement database (no measurements table)".to_string(),
        ));
    }

    type Row = (
        String,
        String,
        i64,
        String,
        Option<i64>,
        Option<f64>,
        Option<String>,
        Option<Vec<u8>>,
    );
    let rows = sqlx::query_as::<_, Row>(
        r#"
        SELECT object_name, feature, image_number, value_type,
               int_value, float_value, text_value, blob_value
        FROM measurements
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Load(format!("unreadable container: {}", e)))?;

    let mut store = Store::new();
    for (object, feature, image_number, value_type, int_value, float_value, text_value, blob_value) in
        rows
    {
        let image_number = u32::try_from(image_number).map_err(|_| {
            Error::Load(format!("invalid image number {}", image_number))
        })?;
        let value = decode(&value_type, int_value, float_value, text_value, blob_value)?;
        store.insert_cell(&object, &feature, image_number, value);
    }
    Ok(store)
}

fn encode(value: &Value) -> (Option<i64>, Option<f64>, Option<String>, Option<Vec<u8>>) {
    match value {
        Value::Integer(i) => (Some(*i), None, None, None),
        Value::Float(f) => (None, Some(*f), None, None),
        Value::Text(s) => (None, None, Some(s.clone()), None),
        Value::Vector(v) => {
            let mut blob = Vec::with_capacity(v.len() * 8);
            for x in v {
                blob.extend_from_slice(&x.to_le_bytes());
            }
            (None, None, None, Some(blob))
        }
    }
}

fn decode(
    value_type: &str,
    int_value: Option<i64>,
    float_value: Option<f64>,
    text_value: Option<String>,
    blob_value: Option<Vec<u8>>,
) -> Result<Value> {
    match value_type {
        "integer" => int_value
            .map(Value::Integer)
            .ok_or_else(|| Error::Load("integer cell without int_value".to_string())),
        // SQLite stores a NaN REAL as NULL; restore it as NaN
        "float" => Ok(Value::Float(float_value.unwrap_or(f64::NAN))),
        "text" => text_value
            .map(Value::Text)
            .ok_or_else(|| Error::Load("text cell without text_value".to_string())),
        "vector" => {
            let blob = blob_value
                .ok_or_else(|| Error::Load("vector cell without blob_value".to_string()))?;
            if blob.len() % 8 != 0 {
                return Err(Error::Load(format!(
                    "vector blob of {} bytes is not a whole number of f64s",
                    blob.len()
                )));
            }
            let floats = blob
                .chunks_exact(8)
                .map(|c| {
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(c);
                    f64::from_le_bytes(bytes)
                })
                .collect();
            Ok(Value::Vector(floats))
        }
        other => Err(Error::Load(format!("unknown value type \"{}\"", other))),
    }
}
