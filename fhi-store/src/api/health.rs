//! Service status routes: liveness and build identification

use axum::{routing::get, Json, Router};
use fhi_common::api::HealthResponse;
use serde::Serialize;

use crate::AppState;

const MODULE: &str = "fhi-store";

/// Identity of the running binary, captured by `build.rs`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
}

pub const BUILD_INFO: BuildInfo = BuildInfo {
    version: env!("CARGO_PKG_VERSION"),
    git_hash: env!("GIT_HASH"),
    build_timestamp: env!("BUILD_TIMESTAMP"),
    build_profile: env!("BUILD_PROFILE"),
};

/// Does not touch the database
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: MODULE.to_string(),
        version: BUILD_INFO.version.to_string(),
    })
}

async fn build_info() -> Json<BuildInfo> {
    Json(BUILD_INFO)
}

/// `GET /health` and `GET /api/buildinfo`
pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/buildinfo", get(build_info))
}
