//! The four-valued transmission outcome.

use serde::{Deserialize, Serialize};

/// Outcome recorded for one program at one affiliate on one date.
///
/// The wire slug is the lowercase Spanish form used by the frontend; the
/// display name is the capitalised form stored in the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransmissionStatus {
  /// Not yet reported by an operator.
  #[default]
  #[serde(rename = "pendiente")]
  Pending,
  /// Aired as scheduled.
  #[serde(rename = "si")]
  Aired,
  /// Did not air.
  #[serde(rename = "no")]
  NotAired,
  /// Aired, but after the scheduled start time.
  #[serde(rename = "tarde")]
  Late,
}

impl TransmissionStatus {
  /// The lowercase wire slug.
  pub fn slug(self) -> &'static str {
    match self {
      Self::Pending => "pendiente",
      Self::Aired => "si",
      Self::NotAired => "no",
      Self::Late => "tarde",
    }
  }

  /// The capitalised name stored in the `transmission_statuses` table.
  pub fn display_name(self) -> &'static str {
    match self {
      Self::Pending => "Pendiente",
      Self::Aired => "Si",
      Self::NotAired => "No",
      Self::Late => "Tarde",
    }
  }

  /// Resolve a caller-supplied status string — slug or display name, any
  /// case. Returns `None` for anything unrecognised; callers that upsert
  /// records fall back to [`Self::Pending`] in that case.
  pub fn resolve(s: &str) -> Option<Self> {
    match s.trim().to_lowercase().as_str() {
      "pendiente" => Some(Self::Pending),
      "si" => Some(Self::Aired),
      "no" => Some(Self::NotAired),
      "tarde" => Some(Self::Late),
      _ => None,
    }
  }
}
