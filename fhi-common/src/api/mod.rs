//! Shared HTTP API types
//!
//! Request/response shapes of the record store protocol, used by the store
//! service (server side) and the intake sync client (client side).

pub mod types;

pub use types::{ErrorBody, ErrorResponse, HealthResponse, SuccessResponse, RECORDS_PATH};
