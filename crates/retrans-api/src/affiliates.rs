//! Handlers for `/affiliates` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/affiliates` | Optional `?name=<name>` case-insensitive lookup |
//! | `POST`   | `/affiliates` | Body: `{"name":"Canal Norte","active":true}` |
//! | `GET`    | `/affiliates/:id` | 404 if not found |
//! | `PUT`    | `/affiliates/:id` | Partial update |
//! | `DELETE` | `/affiliates/:id` | Cascades join rows and records |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use retrans_core::{
  affiliate::{Affiliate, AffiliatePatch, NewAffiliate},
  store::ComplianceStore,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub name: Option<String>,
}

/// `GET /affiliates[?name=<name>]`
pub async fn list<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Affiliate>>, ApiError> {
  if let Some(name) = params.name {
    let found = store
      .find_affiliate_by_name(name)
      .await
      .map_err(ApiError::from_store)?;
    return Ok(Json(found.into_iter().collect()));
  }

  let affiliates = store.list_affiliates().await.map_err(ApiError::from_store)?;
  Ok(Json(affiliates))
}

/// `POST /affiliates`
pub async fn create<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewAffiliate>,
) -> Result<impl IntoResponse, ApiError> {
  let affiliate = store
    .add_affiliate(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(affiliate)))
}

/// `GET /affiliates/:id`
pub async fn get_one<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Affiliate>, ApiError> {
  let affiliate = store
    .get_affiliate(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("affiliate {id} not found")))?;
  Ok(Json(affiliate))
}

/// `PUT /affiliates/:id`
pub async fn update<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<AffiliatePatch>,
) -> Result<Json<Affiliate>, ApiError> {
  let affiliate = store
    .update_affiliate(id, patch)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(affiliate))
}

/// `DELETE /affiliates/:id`
pub async fn delete_one<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store
    .delete_affiliate(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
