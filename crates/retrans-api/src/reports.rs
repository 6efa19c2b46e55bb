//! Handler for `GET /reports/export` — the printable HTML compliance report.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  response::Html,
};
use chrono::NaiveDate;
use retrans_core::store::ComplianceStore;
use retrans_report::{ReportInput, render_html};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ExportParams {
  pub start:        Option<NaiveDate>,
  pub end:          Option<NaiveDate>,
  /// Restrict the report to a single affiliate.
  pub affiliate_id: Option<i64>,
  /// Consolidate all affiliates into one row per program.
  #[serde(default)]
  pub summary:      bool,
}

/// `GET /reports/export?start&end[&affiliate_id][&summary=true]`
///
/// Returns one self-contained `text/html` document meant for browser
/// print-to-PDF.
pub async fn export<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ExportParams>,
) -> Result<Html<String>, ApiError> {
  let start = params
    .start
    .ok_or_else(|| ApiError::BadRequest("start date is required".into()))?;
  let end = params
    .end
    .ok_or_else(|| ApiError::BadRequest("end date is required".into()))?;
  if end < start {
    return Err(ApiError::BadRequest("end date precedes start date".into()));
  }

  let mut affiliates = store.list_affiliates().await.map_err(ApiError::from_store)?;
  let programs = store.list_programs().await.map_err(ApiError::from_store)?;
  let mut records = store
    .records_in_range(start, end)
    .await
    .map_err(ApiError::from_store)?;

  if let Some(affiliate_id) = params.affiliate_id {
    if !affiliates.iter().any(|a| a.id == affiliate_id) {
      return Err(ApiError::NotFound(format!("affiliate {affiliate_id} not found")));
    }
    affiliates.retain(|a| a.id == affiliate_id);
    records.retain(|r| r.affiliate_id == affiliate_id);
  }

  let html = render_html(&ReportInput {
    start,
    end,
    affiliates: &affiliates,
    programs: &programs,
    records: &records,
    summary: params.summary,
  });
  Ok(Html(html))
}
