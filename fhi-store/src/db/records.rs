//! Record table queries
//!
//! Each row keeps the full record JSON in `data`; `id` and `created_at` are
//! lifted out for keying and ordering.

use chrono::SecondsFormat;
use fhi_common::{FamilyRecord, Result};
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

/// All records, newest `createdAt` first. Rows whose JSON no longer parses
/// are skipped and logged.
pub async fn list_records(db: &SqlitePool) -> Result<Vec<FamilyRecord>> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT id, data FROM records ORDER BY created_at DESC")
            .fetch_all(db)
            .await?;

    let mut records = Vec::with_capacity(rows.len());
    for (id, data) in rows {
        match serde_json::from_str::<FamilyRecord>(&data) {
            Ok(record) => records.push(record),
            Err(e) => warn!(record_id = %id, "Skipping unreadable record row: {}", e),
        }
    }
    Ok(records)
}

/// Insert or replace a record by id
pub async fn upsert_record(db: &SqlitePool, record: &FamilyRecord) -> Result<()> {
    let data = serde_json::to_string(record)?;
    // Fixed-width UTC timestamps sort correctly as text
    let created_at = record.created_at.to_rfc3339_opts(SecondsFormat::Millis, true);

    sqlx::query("INSERT OR REPLACE INTO records (id, created_at, data) VALUES (?, ?, ?)")
        .bind(record.id.to_string())
        .bind(created_at)
        .bind(data)
        .execute(db)
        .await?;

    Ok(())
}

/// Delete a record by id. Returns whether a row was removed.
pub async fn delete_record(db: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM records WHERE id = ?")
        .bind(id.to_string())
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}
