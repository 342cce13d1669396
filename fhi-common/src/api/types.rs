//! Record store wire types
//!
//! ```text
//! GET    {base}/records        -> [FamilyRecord, ...]
//! POST   {base}/records        -> {"success": true}
//! DELETE {base}/records/{id}   -> {"success": true}
//! ```

use serde::{Deserialize, Serialize};

/// Collection path, relative to the endpoint base
pub const RECORDS_PATH: &str = "/records";

/// Acknowledgement returned by write operations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Error payload: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}
