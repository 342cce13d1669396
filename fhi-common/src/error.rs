//! Error type shared by the intake and store crates
//!
//! Only local faults are errors. An unreachable record store is reported
//! through `fhi_intake::remote::Tier`, never through this type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// SQLite fault in the local cache or the record table
    #[error("storage: {0}")]
    Database(#[from] sqlx::Error),

    #[error("file access: {0}")]
    Io(#[from] std::io::Error),

    /// A record or payload that does not match the record model
    #[error("record encoding: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration: {0}")]
    Config(String),

    #[error("{0} not found")]
    NotFound(String),

    /// Edit rejected by a model rule (unknown row, full family group, ...)
    #[error("rejected: {0}")]
    InvalidInput(String),

    #[error("internal: {0}")]
    Internal(String),
}
