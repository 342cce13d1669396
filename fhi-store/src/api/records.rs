//! Record CRUD endpoints
//!
//! Deleting an unknown id still answers `{"success": true}`: the caller only
//! needs to know the record is gone.

use axum::{
    extract::{Path, State},
    Json,
};
use fhi_common::api::SuccessResponse;
use fhi_common::{uuid_utils, FamilyRecord};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::{db, AppState};

/// GET /api/records
pub async fn list_records(State(state): State<AppState>) -> ApiResult<Json<Vec<FamilyRecord>>> {
    let records = db::list_records(&state.db).await?;
    debug!(count = records.len(), "Listing records");
    Ok(Json(records))
}

/// POST /api/records
///
/// Upsert by id.
pub async fn save_record(
    State(state): State<AppState>,
    Json(record): Json<FamilyRecord>,
) -> ApiResult<Json<SuccessResponse>> {
    db::upsert_record(&state.db, &record).await?;
    info!(record_id = %record.id, "Record saved");
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /api/records/:id
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let id = uuid_utils::parse(&id)
        .map_err(|e| ApiError::BadRequest(format!("invalid record id '{}': {}", id, e)))?;

    let removed = db::delete_record(&state.db, id).await?;
    info!(record_id = %id, removed, "Record deleted");
    Ok(Json(SuccessResponse::ok()))
}
