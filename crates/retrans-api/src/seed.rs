//! Handler for the `POST /seed` reference-data bootstrap.

use std::sync::Arc;

use axum::{Json, extract::State};
use retrans_core::{reference::SeedSummary, store::ComplianceStore};

use crate::error::ApiError;

/// `POST /seed` — idempotent: re-running never duplicates reference rows.
/// The response reports row counts after the pass.
pub async fn run<S: ComplianceStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<SeedSummary>, ApiError> {
  let summary = store
    .ensure_reference_data()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(summary))
}
