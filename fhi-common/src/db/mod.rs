//! SQLite plumbing shared by the store service and the local cache

pub mod init;

pub use init::{create_local_cache_table, create_records_table, open_database, open_in_memory};
