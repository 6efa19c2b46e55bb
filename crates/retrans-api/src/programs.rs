//! Handlers for `/programs` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/programs` | Both association sets resolved per program |
//! | `POST`   | `/programs` | Body: `NewProgram` JSON |
//! | `POST`   | `/programs/by-weekdays` | Convenience create; rejects empty sets |
//! | `GET`    | `/programs/:id` | 404 if not found |
//! | `PUT`    | `/programs/:id` | `weekdays`/`affiliate_ids` trigger a full replace |
//! | `DELETE` | `/programs/:id` | Cascades join rows and records |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use retrans_core::{
  program::{NewProgram, Program, ProgramPatch, ProgramState},
  store::ComplianceStore,
};
use serde::Deserialize;

use crate::error::ApiError;

/// `GET /programs`
pub async fn list<S: ComplianceStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Program>>, ApiError> {
  let programs = store.list_programs().await.map_err(ApiError::from_store)?;
  Ok(Json(programs))
}

/// `POST /programs`
pub async fn create<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewProgram>,
) -> Result<impl IntoResponse, ApiError> {
  let program = store.add_program(body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(program)))
}

// ─── By-weekdays convenience create ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ByWeekdaysBody {
  pub name:          String,
  pub description:   Option<String>,
  #[serde(default = "default_start_time")]
  pub start_time:    String,
  pub weekdays:      Vec<String>,
  pub affiliate_ids: Vec<i64>,
}

fn default_start_time() -> String {
  "08:00".to_owned()
}

/// `POST /programs/by-weekdays` — the authoring-form create. Unlike the
/// plain create, this one insists on at least one weekday and one affiliate;
/// the description defaults to a human-readable schedule summary.
pub async fn create_by_weekdays<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<ByWeekdaysBody>,
) -> Result<impl IntoResponse, ApiError> {
  if body.weekdays.is_empty() {
    return Err(ApiError::BadRequest("at least one weekday is required".into()));
  }
  if body.affiliate_ids.is_empty() {
    return Err(ApiError::BadRequest("at least one affiliate is required".into()));
  }

  let description = body
    .description
    .unwrap_or_else(|| format!("Programa para {}", body.weekdays.join(", ")));

  let program = store
    .add_program(NewProgram {
      name:           body.name,
      description:    Some(description),
      start_time:     body.start_time,
      state:          ProgramState::Active,
      schedule_start: None,
      schedule_end:   None,
      weekdays:       body.weekdays,
      affiliate_ids:  body.affiliate_ids,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(program)))
}

// ─── Single-program endpoints ────────────────────────────────────────────────

/// `GET /programs/:id`
pub async fn get_one<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Program>, ApiError> {
  let program = store
    .get_program(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("program {id} not found")))?;
  Ok(Json(program))
}

/// `PUT /programs/:id`
pub async fn update<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(patch): Json<ProgramPatch>,
) -> Result<Json<Program>, ApiError> {
  let program = store
    .update_program(id, patch)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(program))
}

/// `DELETE /programs/:id`
pub async fn delete_one<S: ComplianceStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_program(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
