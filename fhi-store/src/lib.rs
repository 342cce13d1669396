//! fhi-store library - central record store
//!
//! Keeps every family record in SQLite and exposes it over a small CRUD
//! protocol under `/api/records`. Intake devices sync against it on a
//! best-effort basis.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Default listening port
pub const DEFAULT_PORT: u16 = 5741;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Record database
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get};

    let records = Router::new()
        .route(
            "/api/records",
            get(api::list_records).post(api::save_record),
        )
        .route("/api/records/:id", delete(api::delete_record));

    Router::new()
        .merge(records)
        .merge(api::status_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        // Intake pages may be served from another origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
