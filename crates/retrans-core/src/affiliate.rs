//! Affiliate — a regional broadcast site that carries programs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named broadcast site. The name is the practical identifier in admin
/// flows; bulk setup looks affiliates up by name case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affiliate {
  pub id:          i64,
  pub name:        String,
  pub active:      bool,
  /// Ids of the programs this affiliate carries, via the join table.
  pub program_ids: Vec<i64>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::ComplianceStore::add_affiliate`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewAffiliate {
  pub name:   String,
  #[serde(default = "default_active")]
  pub active: bool,
}

fn default_active() -> bool { true }

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AffiliatePatch {
  pub name:   Option<String>,
  pub active: Option<bool>,
}
