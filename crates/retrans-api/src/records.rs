//! Handlers for `/records` endpoints.
//!
//! All writes are triple-keyed upserts: `POST /records` twice with the same
//! `(affiliate_id, program_id, date)` updates one row, it never duplicates.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/records` | Everything, date-ordered |
//! | `POST`   | `/records` | Upsert by triple; 201 either way |
//! | `POST`   | `/records/batch` | Ordered per-item outcomes |
//! | `GET`    | `/records/range?start&end` | Inclusive; both params required |
//! | `GET`    | `/records/:id` | 404 if not found |
//! | `PUT`    | `/records/:id` | Same resolution rules as the upsert |
//! | `DELETE` | `/records/:id` | The explicit admin delete path |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use retrans_core::{
  record::{BatchOutcome, RecordPatch, RecordUpsert, TransmissionRecord},
  store::ComplianceStore,
};
use serde::Deserialize;

use crate::error::ApiError;

/// `GET /records`
pub async fn list<S: ComplianceStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<TransmissionRecord>>, ApiError> {
  let records = store.list_records().await.map_err(ApiError::from_store)?;
  Ok(Json(records))
}

/// `POST /records`
pub async fn upsert<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<RecordUpsert>,
) -> Result<impl IntoResponse, ApiError> {
  let record = store
    .upsert_record(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(record)))
}

/// `POST /records/batch` — items applied independently and in order; the
/// response mirrors the request positionally.
pub async fn batch<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<Vec<RecordUpsert>>,
) -> Result<Json<Vec<BatchOutcome>>, ApiError> {
  let outcomes = store
    .upsert_batch(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(outcomes))
}

// ─── Range query ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub start: Option<NaiveDate>,
  pub end:   Option<NaiveDate>,
}

/// `GET /records/range?start=YYYY-MM-DD&end=YYYY-MM-DD`
pub async fn range<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<TransmissionRecord>>, ApiError> {
  let start = params
    .start
    .ok_or_else(|| ApiError::BadRequest("start date is required".into()))?;
  let end = params
    .end
    .ok_or_else(|| ApiError::BadRequest("end date is required".into()))?;
  if end < start {
    return Err(ApiError::BadRequest("end date precedes start date".into()));
  }

  let records = store
    .records_in_range(start, end)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(records))
}

// ─── Single-record endpoints ─────────────────────────────────────────────────

/// `GET /records/:id`
pub async fn get_one<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<TransmissionRecord>, ApiError> {
  let record = store
    .get_record(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))?;
  Ok(Json(record))
}

/// `PUT /records/:id`
pub async fn update<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<RecordPatch>,
) -> Result<Json<TransmissionRecord>, ApiError> {
  let record = store
    .update_record(id, patch)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(record))
}

/// `DELETE /records/:id`
pub async fn delete_one<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_record(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
