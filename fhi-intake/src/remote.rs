//! Record store client
//!
//! Every call returns a [`Tier`]: either the data, or `Unavailable` with a
//! reason. Transport problems (timeout, refused connection, non-2xx status,
//! undecodable body) are all `Unavailable`; the caller decides what the
//! fallback is.

use std::time::Duration;

use async_trait::async_trait;
use fhi_common::api::RECORDS_PATH;
use fhi_common::FamilyRecord;
use uuid::Uuid;

const USER_AGENT: &str = concat!("fhi-intake/", env!("CARGO_PKG_VERSION"));

/// Outcome of one remote-tier call
#[derive(Debug, Clone, PartialEq)]
pub enum Tier<T> {
    Ok(T),
    Unavailable(String),
}

impl<T> Tier<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Tier::Ok(_))
    }
}

/// Remote record store protocol
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Endpoint base, for logging
    fn endpoint(&self) -> &str;

    /// `GET {base}/records`
    async fn fetch_records(&self) -> Tier<Vec<FamilyRecord>>;

    /// `POST {base}/records`
    async fn push_record(&self, record: &FamilyRecord) -> Tier<()>;

    /// `DELETE {base}/records/{id}`
    async fn remove_record(&self, id: Uuid) -> Tier<()>;
}

/// HTTP implementation of [`RemoteStore`]
pub struct HttpRecordStore {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpRecordStore {
    pub fn new(base_url: &str, timeout: Duration) -> fhi_common::Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| fhi_common::Error::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn records_url(&self) -> String {
        format!("{}{}", self.base_url, RECORDS_PATH)
    }

    /// Turn a sent request into a tier result, keeping only the status
    fn check_status(result: reqwest::Result<reqwest::Response>) -> Tier<reqwest::Response> {
        match result {
            Ok(response) if response.status().is_success() => Tier::Ok(response),
            Ok(response) => Tier::Unavailable(format!("HTTP {}", response.status())),
            Err(e) => Tier::Unavailable(e.to_string()),
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRecordStore {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn fetch_records(&self) -> Tier<Vec<FamilyRecord>> {
        tracing::debug!(url = %self.records_url(), "Fetching records");
        let response = match Self::check_status(self.http_client.get(self.records_url()).send().await) {
            Tier::Ok(response) => response,
            Tier::Unavailable(reason) => return Tier::Unavailable(reason),
        };

        match response.json::<Vec<FamilyRecord>>().await {
            Ok(records) => Tier::Ok(records),
            Err(e) => Tier::Unavailable(format!("undecodable record list: {}", e)),
        }
    }

    async fn push_record(&self, record: &FamilyRecord) -> Tier<()> {
        tracing::debug!(record_id = %record.id, "Pushing record");
        let sent = self
            .http_client
            .post(self.records_url())
            .json(record)
            .send()
            .await;
        match Self::check_status(sent) {
            Tier::Ok(_) => Tier::Ok(()),
            Tier::Unavailable(reason) => Tier::Unavailable(reason),
        }
    }

    async fn remove_record(&self, id: Uuid) -> Tier<()> {
        let url = format!("{}/{}", self.records_url(), id);
        tracing::debug!(record_id = %id, "Deleting remote record");
        match Self::check_status(self.http_client.delete(url).send().await) {
            Tier::Ok(_) => Tier::Ok(()),
            Tier::Unavailable(reason) => Tier::Unavailable(reason),
        }
    }
}
