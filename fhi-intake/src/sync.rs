//! Synchronization facade
//!
//! Local-write-always, remote-best-effort:
//! - reads prefer the record store and refresh the local mirror on success,
//!   falling back to the mirror when the store is unavailable;
//! - writes land in the local mirror first, then are forwarded once; a remote
//!   failure never rolls back or flags the local write;
//! - no retries, no conflict resolution. Each tier keeps whatever was written
//!   to it last.
//!
//! The only errors returned are local storage faults. Remote trouble is logged
//! at `warn` and otherwise invisible, apart from the boolean `save` result.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fhi_common::config::TomlConfig;
use fhi_common::{time, FamilyRecord, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::LocalCache;
use crate::draft::DraftStore;
use crate::remote::{HttpRecordStore, RemoteStore, Tier};

/// Result of an import attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Mirror replaced with this many records
    Imported(usize),
    /// Payload refused; mirror untouched
    Rejected(String),
}

/// Single entry point to record persistence
pub struct SyncFacade {
    cache: LocalCache,
    remote: Option<Arc<dyn RemoteStore>>,
}

impl SyncFacade {
    /// Facade over an explicit remote tier (`None` = local-only mode)
    pub fn new(cache: LocalCache, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self { cache, remote }
    }

    /// Read the server location once and build the matching remote tier.
    ///
    /// A stored location wins; otherwise the configured default is used. An
    /// empty location in either place selects local-only mode.
    pub async fn connect(cache: LocalCache, config: &TomlConfig) -> Result<Self> {
        let endpoint = match cache.server_url().await? {
            Some(url) => url,
            None => config.default_server_url.clone(),
        };
        let endpoint = endpoint.trim();

        if endpoint.is_empty() {
            info!("No server location configured; running in local-only mode");
            return Ok(Self::new(cache, None));
        }

        let remote = HttpRecordStore::new(endpoint, config.request_timeout())?;
        info!(endpoint = %remote.endpoint(), "Syncing with record store");
        Ok(Self::new(cache, Some(Arc::new(remote))))
    }

    pub fn is_local_only(&self) -> bool {
        self.remote.is_none()
    }

    /// Endpoint base in use, if any
    pub fn endpoint(&self) -> Option<&str> {
        self.remote.as_deref().map(|remote| remote.endpoint())
    }

    /// Full record set: remote when reachable (refreshing the mirror),
    /// otherwise the mirror as it stands
    pub async fn list(&self) -> Result<Vec<FamilyRecord>> {
        if let Some(remote) = &self.remote {
            match remote.fetch_records().await {
                Tier::Ok(records) => {
                    self.cache.replace_records(&records).await?;
                    debug!(count = records.len(), "Mirror refreshed from record store");
                    return Ok(records);
                }
                Tier::Unavailable(reason) => {
                    warn!(
                        endpoint = %remote.endpoint(),
                        "Record store unavailable, serving local records: {}", reason
                    );
                }
            }
        }
        self.cache.records().await
    }

    /// Upsert locally, then forward. Returns whether the record store
    /// accepted the record.
    pub async fn save(&self, record: &FamilyRecord) -> Result<bool> {
        self.cache.upsert_record(record).await?;
        debug!(record_id = %record.id, "Record saved locally");

        let Some(remote) = &self.remote else {
            return Ok(false);
        };
        match remote.push_record(record).await {
            Tier::Ok(()) => {
                info!(record_id = %record.id, "Record synced to record store");
                Ok(true)
            }
            Tier::Unavailable(reason) => {
                warn!(record_id = %record.id, "Record kept local only: {}", reason);
                Ok(false)
            }
        }
    }

    /// Remove locally, then attempt the remote delete. Complete from the
    /// caller's point of view regardless of the remote outcome.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let removed = self.cache.remove_record(id).await?;
        debug!(record_id = %id, removed, "Record removed locally");

        if let Some(remote) = &self.remote {
            if let Tier::Unavailable(reason) = remote.remove_record(id).await {
                warn!(record_id = %id, "Remote delete failed: {}", reason);
            }
        }
        Ok(())
    }

    /// The mirror as one JSON array, byte-for-byte as stored
    pub async fn export(&self) -> Result<String> {
        Ok(self
            .cache
            .records_json()
            .await?
            .unwrap_or_else(|| "[]".to_string()))
    }

    /// Write the export into `dir` as `health_assess_backup_YYYY-MM-DD.json`
    pub async fn export_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(export_file_name(time::today()));
        let payload = self.export().await?;
        tokio::fs::write(&path, payload).await?;
        info!(path = %path.display(), "Records exported");
        Ok(path)
    }

    /// Replace the mirror wholesale with `payload` if it is a JSON array of
    /// records; otherwise leave everything as it was
    pub async fn import(&self, payload: &str) -> Result<ImportOutcome> {
        // Decoded straight from text so matrix keys keep their order
        let records: Vec<FamilyRecord> = match serde_json::from_str(payload) {
            Ok(records) => records,
            Err(e) => {
                let reason = match serde_json::from_str::<serde_json::Value>(payload) {
                    Ok(serde_json::Value::Array(_)) => format!("malformed record: {}", e),
                    Ok(_) => "payload is not a JSON array".to_string(),
                    Err(e) => format!("payload is not JSON: {}", e),
                };
                return Ok(reject(&reason));
            }
        };

        self.cache.replace_records(&records).await?;
        info!(count = records.len(), "Local records replaced from import");
        Ok(ImportOutcome::Imported(records.len()))
    }

    pub async fn load_draft(&self) -> Result<Option<FamilyRecord>> {
        self.cache.draft().await
    }

    pub async fn store_draft(&self, record: &FamilyRecord) -> Result<()> {
        self.cache.store_draft(record).await
    }

    pub async fn clear_draft(&self) -> Result<()> {
        self.cache.clear_draft().await
    }

    /// Persist a new server location ("" = local-only). Read on the next
    /// [`SyncFacade::connect`].
    pub async fn set_server_location(&self, url: &str) -> Result<()> {
        self.cache.set_server_url(url).await
    }
}

#[async_trait]
impl DraftStore for SyncFacade {
    async fn store_draft(&self, record: &FamilyRecord) -> Result<()> {
        SyncFacade::store_draft(self, record).await
    }
}

fn reject(reason: &str) -> ImportOutcome {
    warn!("Import rejected: {}", reason);
    ImportOutcome::Rejected(reason.to_string())
}

/// Backup file name for a given day
pub fn export_file_name(date: chrono::NaiveDate) -> String {
    format!("health_assess_backup_{}.json", time::iso_date(date))
}
