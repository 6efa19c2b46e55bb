//! Transmission records — the logged outcome for one program at one
//! affiliate on one calendar date.
//!
//! Exactly one record exists per `(affiliate_id, program_id, date)` triple;
//! the store enforces this with a unique constraint and all writes go through
//! an upsert keyed on the triple.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::status::TransmissionStatus;

/// The deviation code that signals a free-text reason.
pub const OTHER_CODE: &str = "Otros";

/// Placeholder stored when "Otros" is selected but no wording is supplied.
pub const UNSPECIFIED_REASON: &str = "Sin especificar";

/// A stored outcome, in canonical shape: status as the enum, deviation as
/// the reason code string — never raw reference-row ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransmissionRecord {
  pub id:               i64,
  pub affiliate_id:     i64,
  pub program_id:       i64,
  pub date:             NaiveDate,
  pub status:           TransmissionStatus,
  /// Time the program actually went on air, "HH:MM".
  pub actual_time:      Option<String>,
  /// For late transmissions, the delayed start time.
  pub late_time:        Option<String>,
  pub deviation_code:   Option<String>,
  /// Operator wording; only meaningful alongside [`OTHER_CODE`].
  pub free_text_reason: Option<String>,
  pub notes:            Option<String>,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

/// Input to [`crate::store::ComplianceStore::upsert_record`].
///
/// `status` is a caller-supplied string (slug or display name); a string
/// that fails to resolve falls back to Pending rather than erroring, so a
/// sloppy client can never wedge a cell.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordUpsert {
  pub affiliate_id:     i64,
  pub program_id:       i64,
  pub date:             NaiveDate,
  pub status:           Option<String>,
  pub actual_time:      Option<String>,
  pub late_time:        Option<String>,
  pub deviation_code:   Option<String>,
  pub free_text_reason: Option<String>,
  pub notes:            Option<String>,
}

/// Update of an existing record by id; same field semantics as
/// [`RecordUpsert`] minus the triple.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPatch {
  pub status:           Option<String>,
  pub actual_time:      Option<String>,
  pub late_time:        Option<String>,
  pub deviation_code:   Option<String>,
  pub free_text_reason: Option<String>,
  pub notes:            Option<String>,
}

/// Per-item result of a batch upsert. Items are applied independently; one
/// failure never rolls back its neighbours.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchOutcome {
  Saved { record: TransmissionRecord },
  Failed { error: String },
}

// ─── Deviation resolution ────────────────────────────────────────────────────

/// Canonical `(deviation_code, free_text_reason)` pair for a record,
/// enforcing mutual exclusivity in storage:
///
/// - Aired / Pending never carry a deviation — both cleared.
/// - [`OTHER_CODE`] ⇒ free text stored, [`UNSPECIFIED_REASON`] when omitted.
/// - a concrete code ⇒ free text cleared, even if the caller sent one.
/// - free text with no code ⇒ treated as [`OTHER_CODE`] + that text.
/// - neither supplied ⇒ the prior pair is preserved (a status-only
///   correction must not destroy operator input).
pub fn resolve_deviation(
  status: TransmissionStatus,
  code: Option<&str>,
  free_text: Option<&str>,
  prior_code: Option<&str>,
  prior_free_text: Option<&str>,
) -> (Option<String>, Option<String>) {
  if matches!(status, TransmissionStatus::Aired | TransmissionStatus::Pending) {
    return (None, None);
  }

  match (code, free_text) {
    (Some(OTHER_CODE), text) => (
      Some(OTHER_CODE.to_owned()),
      Some(text.filter(|t| !t.trim().is_empty()).unwrap_or(UNSPECIFIED_REASON).to_owned()),
    ),
    (Some(c), _) => (Some(c.to_owned()), None),
    (None, Some(text)) if !text.trim().is_empty() => {
      (Some(OTHER_CODE.to_owned()), Some(text.to_owned()))
    }
    (None, _) => (
      prior_code.map(str::to_owned),
      prior_free_text.map(str::to_owned),
    ),
  }
}
