//! # FHI Common Library
//!
//! Shared code for the family health intake binaries:
//! - Family record data model (sections, members, health matrices)
//! - Wire types for the record store protocol
//! - Configuration loading and root folder resolution
//! - SQLite opening and table creation
//! - Id and timestamp helpers

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use model::{FamilyMember, FamilyRecord, HealthMatrix, MatrixSection, MatrixValue, MemberRole};
