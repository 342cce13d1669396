//! HTTP API handlers for fhi-store

pub mod health;
pub mod records;

pub use health::{status_routes, BUILD_INFO};
pub use records::{delete_record, list_records, save_record};
