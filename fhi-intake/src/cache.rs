//! Local cache: on-device key-value slots
//!
//! | key          | value                                   |
//! |--------------|-----------------------------------------|
//! | `records`    | JSON array mirroring the record set     |
//! | `draft`      | JSON object of the unsaved record       |
//! | `server_url` | record store endpoint ("" = local-only) |
//!
//! The handle is constructed once at startup and passed to whoever needs
//! persistence; nothing reaches the slots through globals.

use std::path::Path;

use fhi_common::db::{create_local_cache_table, open_database, open_in_memory};
use fhi_common::{FamilyRecord, Result};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

const RECORDS_KEY: &str = "records";
const DRAFT_KEY: &str = "draft";
const SERVER_URL_KEY: &str = "server_url";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "fhi-intake.db";

/// Storage handle for the local tier
#[derive(Clone)]
pub struct LocalCache {
    db: SqlitePool,
}

impl LocalCache {
    /// Open the cache database at `db_path`, creating it on first use
    pub async fn open(db_path: &Path) -> Result<Self> {
        let db = open_database(db_path).await?;
        create_local_cache_table(&db).await?;
        Ok(Self { db })
    }

    /// Throwaway cache for tests and dry runs
    pub async fn in_memory() -> Result<Self> {
        let db = open_in_memory().await?;
        create_local_cache_table(&db).await?;
        Ok(Self { db })
    }

    // ------------------------------------------------------------------
    // Records mirror
    // ------------------------------------------------------------------

    /// Raw mirror JSON exactly as stored, if any
    pub async fn records_json(&self) -> Result<Option<String>> {
        self.get(RECORDS_KEY).await
    }

    /// Parsed mirror; empty when nothing was stored yet
    pub async fn records(&self) -> Result<Vec<FamilyRecord>> {
        match self.records_json().await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrite the whole mirror
    pub async fn replace_records(&self, records: &[FamilyRecord]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.put(RECORDS_KEY, &json).await
    }

    /// Replace the record with the same id, or append
    pub async fn upsert_record(&self, record: &FamilyRecord) -> Result<()> {
        let mut records = self.records().await?;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.replace_records(&records).await
    }

    /// Drop a record from the mirror. Returns whether it was present.
    pub async fn remove_record(&self, id: Uuid) -> Result<bool> {
        let mut records = self.records().await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        let removed = records.len() != before;
        if removed {
            self.replace_records(&records).await?;
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Draft slot
    // ------------------------------------------------------------------

    pub async fn draft(&self) -> Result<Option<FamilyRecord>> {
        match self.get(DRAFT_KEY).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn store_draft(&self, record: &FamilyRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.put(DRAFT_KEY, &json).await
    }

    pub async fn clear_draft(&self) -> Result<()> {
        self.remove(DRAFT_KEY).await
    }

    // ------------------------------------------------------------------
    // Server location
    // ------------------------------------------------------------------

    /// Stored endpoint; `None` if never set, `Some("")` for local-only mode
    pub async fn server_url(&self) -> Result<Option<String>> {
        self.get(SERVER_URL_KEY).await
    }

    pub async fn set_server_url(&self, url: &str) -> Result<()> {
        self.put(SERVER_URL_KEY, url.trim()).await
    }

    // ------------------------------------------------------------------
    // Slot access
    // ------------------------------------------------------------------

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM local_cache WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO local_cache (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;
        debug!(key, bytes = value.len(), "Local cache slot written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_cache WHERE key = ?")
            .bind(key)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
