//! HTTP server assembly for Retrans.
//!
//! Wraps the [`retrans_api`] router with Basic auth and request tracing,
//! and owns the runtime configuration shape.

pub mod auth;

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use retrans_core::store::ComplianceStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` (fields
/// overridable via `RETRANS_*` environment variables).
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub auth_password_hash: String,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router: the JSON API nested under `/api`,
/// every route behind Basic auth, traced per request.
pub fn router<S>(store: Arc<S>, auth: Arc<AuthConfig>) -> Router
where
  S: ComplianceStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .nest("/api", retrans_api::api_router(store))
    .layer(axum::middleware::from_fn_with_state(
      auth,
      auth::require_basic_auth,
    ))
    .layer(TraceLayer::new_for_http())
}
