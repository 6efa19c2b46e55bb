//! Aggregate counts and grid-cell consolidation.

use chrono::NaiveDate;
use retrans_core::{
  program::Program, record::TransmissionRecord, schedule::is_due,
  status::TransmissionStatus,
};

// ─── Aggregate stats ─────────────────────────────────────────────────────────

/// Headline numbers for a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportStats {
  pub total:         usize,
  pub aired:         usize,
  pub not_aired:     usize,
  pub late:          usize,
  pub pending:       usize,
  /// aired / total as a percentage rounded to nearest integer; 0 when empty.
  pub effectiveness: u32,
}

impl ReportStats {
  pub fn from_records(records: &[TransmissionRecord]) -> Self {
    let mut s = Self { total: records.len(), ..Self::default() };
    for r in records {
      match r.status {
        TransmissionStatus::Aired => s.aired += 1,
        TransmissionStatus::NotAired => s.not_aired += 1,
        TransmissionStatus::Late => s.late += 1,
        TransmissionStatus::Pending => s.pending += 1,
      }
    }
    if s.total > 0 {
      s.effectiveness = ((s.aired as f64 / s.total as f64) * 100.0).round() as u32;
    }
    s
  }
}

// ─── Grid cells ──────────────────────────────────────────────────────────────

/// What one grid cell shows. `NotScheduled` is semantically distinct from
/// `Pending`: unscheduled is not the same as awaiting a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
  NotScheduled,
  Pending,
  Aired,
  NotAired,
  Late,
}

impl CellState {
  pub fn from_status(status: TransmissionStatus) -> Self {
    match status {
      TransmissionStatus::Pending => Self::Pending,
      TransmissionStatus::Aired => Self::Aired,
      TransmissionStatus::NotAired => Self::NotAired,
      TransmissionStatus::Late => Self::Late,
    }
  }

  pub fn glyph(self) -> &'static str {
    match self {
      Self::NotScheduled => "-",
      Self::Pending => "?",
      Self::Aired => "Si",
      Self::NotAired => "No",
      Self::Late => "Tarde",
    }
  }

  pub fn css_class(self) -> &'static str {
    match self {
      Self::NotScheduled => "not-scheduled",
      Self::Pending => "pending",
      Self::Aired => "aired",
      Self::NotAired => "not-aired",
      Self::Late => "late",
    }
  }
}

/// State of the `(program, date)` cell. A stored record always wins; with no
/// record the cell is Pending when the program is due that date and
/// NotScheduled otherwise.
pub fn cell_state(
  program: &Program,
  date: NaiveDate,
  record: Option<&TransmissionRecord>,
) -> CellState {
  match record {
    Some(r) => CellState::from_status(r.status),
    None if is_due(program, date) => CellState::Pending,
    None => CellState::NotScheduled,
  }
}

/// Collapse the cells of several affiliates into one (summary mode).
///
/// Precedence: any NotAired wins; else all-Aired; else any Late; else
/// Pending. Cells with no scheduled entry at all stay NotScheduled.
pub fn consolidate(states: &[CellState]) -> CellState {
  let scheduled: Vec<CellState> = states
    .iter()
    .copied()
    .filter(|s| *s != CellState::NotScheduled)
    .collect();

  if scheduled.is_empty() {
    CellState::NotScheduled
  } else if scheduled.contains(&CellState::NotAired) {
    CellState::NotAired
  } else if scheduled.iter().all(|s| *s == CellState::Aired) {
    CellState::Aired
  } else if scheduled.contains(&CellState::Late) {
    CellState::Late
  } else {
    CellState::Pending
  }
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, Utc};

  use super::*;

  fn record(status: TransmissionStatus) -> TransmissionRecord {
    let now: DateTime<Utc> = Utc::now();
    TransmissionRecord {
      id:               1,
      affiliate_id:     1,
      program_id:       1,
      date:             NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
      status,
      actual_time:      None,
      late_time:        None,
      deviation_code:   None,
      free_text_reason: None,
      notes:            None,
      created_at:       now,
      updated_at:       now,
    }
  }

  #[test]
  fn effectiveness_rounds_to_nearest_integer() {
    let mut records: Vec<_> =
      (0..6).map(|_| record(TransmissionStatus::Aired)).collect();
    records.extend((0..4).map(|_| record(TransmissionStatus::NotAired)));

    let stats = ReportStats::from_records(&records);
    assert_eq!(stats.total, 10);
    assert_eq!(stats.aired, 6);
    assert_eq!(stats.effectiveness, 60);
  }

  #[test]
  fn effectiveness_zero_when_empty() {
    let stats = ReportStats::from_records(&[]);
    assert_eq!(stats.total, 0);
    assert_eq!(stats.effectiveness, 0);
  }

  #[test]
  fn consolidation_precedence() {
    use CellState::*;

    // Any No wins, even over Aired and Late.
    assert_eq!(consolidate(&[Aired, NotAired, Late]), NotAired);
    // All Aired.
    assert_eq!(consolidate(&[Aired, Aired]), Aired);
    // Mixed Aired/Late without a No resolves to Late.
    assert_eq!(consolidate(&[Aired, Late]), Late);
    // Pending beats nothing.
    assert_eq!(consolidate(&[Aired, Pending]), Pending);
    assert_eq!(consolidate(&[Pending, Pending]), Pending);
    // NotScheduled entries are ignored unless they are all there is.
    assert_eq!(consolidate(&[NotScheduled, Aired]), Aired);
    assert_eq!(consolidate(&[NotScheduled, NotScheduled]), NotScheduled);
    assert_eq!(consolidate(&[]), NotScheduled);
  }

  #[test]
  fn mixed_aired_pending_is_not_all_aired() {
    use CellState::*;
    assert_ne!(consolidate(&[Aired, Pending, Aired]), Aired);
  }
}
