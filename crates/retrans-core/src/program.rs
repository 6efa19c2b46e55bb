//! Program — a named show with a weekday schedule and a set of affiliates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramState {
  #[default]
  Active,
  Inactive,
  /// The program has permanently left the schedule.
  Ended,
}

impl ProgramState {
  pub fn slug(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Inactive => "inactive",
      Self::Ended => "ended",
    }
  }

  pub fn from_slug(s: &str) -> Option<Self> {
    match s {
      "active" => Some(Self::Active),
      "inactive" => Some(Self::Inactive),
      "ended" => Some(Self::Ended),
      _ => None,
    }
  }
}

/// A show in the catalog, with both association sets resolved.
///
/// `start_time` is the single canonical "HH:MM" field; any aliasing between
/// schedule-time spellings is resolved at the API boundary, never carried
/// into this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
  pub id:             i64,
  pub name:           String,
  pub description:    Option<String>,
  pub start_time:     String,
  pub state:          ProgramState,
  pub schedule_start: NaiveDate,
  pub schedule_end:   Option<NaiveDate>,
  /// Normalized (uppercase, diacritic-free) weekday names.
  pub weekdays:       Vec<String>,
  pub affiliate_ids:  Vec<i64>,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

/// Input to [`crate::store::ComplianceStore::add_program`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewProgram {
  pub name:           String,
  pub description:    Option<String>,
  #[serde(default = "default_start_time")]
  pub start_time:     String,
  #[serde(default)]
  pub state:          ProgramState,
  /// Defaults to today (Lima) when omitted.
  pub schedule_start: Option<NaiveDate>,
  pub schedule_end:   Option<NaiveDate>,
  #[serde(default)]
  pub weekdays:       Vec<String>,
  #[serde(default)]
  pub affiliate_ids:  Vec<i64>,
}

fn default_start_time() -> String { "08:00".to_owned() }

/// Partial update; `None` fields are left untouched. Supplying `weekdays`
/// or `affiliate_ids` triggers a full association replace for that set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramPatch {
  pub name:           Option<String>,
  pub description:    Option<String>,
  pub start_time:     Option<String>,
  pub state:          Option<ProgramState>,
  pub schedule_start: Option<NaiveDate>,
  pub schedule_end:   Option<NaiveDate>,
  pub weekdays:       Option<Vec<String>>,
  pub affiliate_ids:  Option<Vec<i64>>,
}
