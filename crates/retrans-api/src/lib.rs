//! JSON REST API for Retrans.
//!
//! Exposes an axum [`Router`] backed by any
//! [`retrans_core::store::ComplianceStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", retrans_api::api_router(store.clone()))
//! ```

pub mod affiliates;
pub mod error;
pub mod programs;
pub mod records;
pub mod reports;
pub mod seed;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use retrans_core::store::ComplianceStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ComplianceStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Affiliates
    .route(
      "/affiliates",
      get(affiliates::list::<S>).post(affiliates::create::<S>),
    )
    .route(
      "/affiliates/{id}",
      get(affiliates::get_one::<S>)
        .put(affiliates::update::<S>)
        .delete(affiliates::delete_one::<S>),
    )
    // Programs
    .route(
      "/programs",
      get(programs::list::<S>).post(programs::create::<S>),
    )
    .route("/programs/by-weekdays", post(programs::create_by_weekdays::<S>))
    .route(
      "/programs/{id}",
      get(programs::get_one::<S>)
        .put(programs::update::<S>)
        .delete(programs::delete_one::<S>),
    )
    // Transmission records
    .route("/records", get(records::list::<S>).post(records::upsert::<S>))
    .route("/records/batch", post(records::batch::<S>))
    .route("/records/range", get(records::range::<S>))
    .route(
      "/records/{id}",
      get(records::get_one::<S>)
        .put(records::update::<S>)
        .delete(records::delete_one::<S>),
    )
    // Reference data + reports
    .route("/seed", post(seed::run::<S>))
    .route("/reports/export", get(reports::export::<S>))
    .with_state(store)
}
