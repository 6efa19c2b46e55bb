//! Seed catalogs for the read-mostly reference tables.
//!
//! Seeding is upsert-by-natural-key (weekday name, status name, reason code)
//! and therefore idempotent: running it any number of times leaves exactly 7
//! weekday rows, 4 status rows and [`DEVIATION_REASONS`]`.len()` reason rows.

use serde::{Deserialize, Serialize};

use crate::status::TransmissionStatus;

/// Canonical diacritic-free weekday names, Monday first.
pub const WEEKDAY_NAMES: [&str; 7] = [
  "LUNES",
  "MARTES",
  "MIERCOLES",
  "JUEVES",
  "VIERNES",
  "SABADO",
  "DOMINGO",
];

/// All four statuses, in seed order.
pub const STATUSES: [TransmissionStatus; 4] = [
  TransmissionStatus::Pending,
  TransmissionStatus::Aired,
  TransmissionStatus::NotAired,
  TransmissionStatus::Late,
];

// ─── Deviation reasons ───────────────────────────────────────────────────────

/// Which outcome a deviation code may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliesTo {
  DidNotAir,
  AiredLate,
  Both,
}

impl AppliesTo {
  pub fn slug(self) -> &'static str {
    match self {
      Self::DidNotAir => "did_not_air",
      Self::AiredLate => "aired_late",
      Self::Both => "both",
    }
  }

  pub fn from_slug(s: &str) -> Option<Self> {
    match s {
      "did_not_air" => Some(Self::DidNotAir),
      "aired_late" => Some(Self::AiredLate),
      "both" => Some(Self::Both),
      _ => None,
    }
  }
}

/// A short code classifying why a program deviated from its schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviationReason {
  pub code:       String,
  pub label:      String,
  pub applies_to: AppliesTo,
}

/// The seeded reason catalog. "Otros" is the free-text escape hatch: records
/// carrying it store the operator's own wording in `free_text_reason`.
pub const DEVIATION_REASONS: [(&str, &str, AppliesTo); 6] = [
  ("Fta", "Falta", AppliesTo::DidNotAir),
  ("Enf", "Enfermedad", AppliesTo::DidNotAir),
  ("P.Tec", "Problema tecnico", AppliesTo::Both),
  ("F.Serv", "Falla de servicios", AppliesTo::Both),
  ("Tde", "Tarde", AppliesTo::AiredLate),
  ("Otros", "Otros", AppliesTo::Both),
];

/// Per-table row counts reported after a seed pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeedSummary {
  pub weekdays: usize,
  pub statuses: usize,
  pub reasons:  usize,
}
