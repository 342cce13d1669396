//! Database access layer for fhi-store

use fhi_common::db::{create_records_table, open_database};
use fhi_common::Result;
use sqlx::SqlitePool;
use std::path::Path;

pub mod records;

pub use records::{delete_record, list_records, upsert_record};

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "fhi-store.db";

/// Open the store database, creating the file and schema on first start
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    let pool = open_database(db_path).await?;
    create_records_table(&pool).await?;
    Ok(pool)
}
