//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`. Enums are stored by their slug / display name.

use chrono::{DateTime, NaiveDate, Utc};
use retrans_core::{
  affiliate::Affiliate,
  program::{Program, ProgramState},
  record::TransmissionRecord,
  status::TransmissionStatus,
};

use crate::{Error, Result};

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Calendar dates ──────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `affiliates` row.
pub struct RawAffiliate {
  pub affiliate_id: i64,
  pub name:         String,
  pub active:       bool,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawAffiliate {
  pub fn into_affiliate(self, program_ids: Vec<i64>) -> Result<Affiliate> {
    Ok(Affiliate {
      id:          self.affiliate_id,
      name:        self.name,
      active:      self.active,
      program_ids,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `programs` row; association sets are
/// fetched separately and supplied to [`Self::into_program`].
pub struct RawProgram {
  pub program_id:     i64,
  pub name:           String,
  pub description:    Option<String>,
  pub start_time:     String,
  pub state:          String,
  pub schedule_start: String,
  pub schedule_end:   Option<String>,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawProgram {
  pub fn into_program(
    self,
    weekdays: Vec<String>,
    affiliate_ids: Vec<i64>,
  ) -> Result<Program> {
    let state = ProgramState::from_slug(&self.state)
      .ok_or_else(|| Error::Decode(format!("unknown program state: {:?}", self.state)))?;

    Ok(Program {
      id: self.program_id,
      name: self.name,
      description: self.description,
      start_time: self.start_time,
      state,
      schedule_start: decode_date(&self.schedule_start)?,
      schedule_end: self.schedule_end.as_deref().map(decode_date).transpose()?,
      weekdays,
      affiliate_ids,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// A `transmission_records` row joined with its status name and reason code.
pub struct RawRecord {
  pub record_id:        i64,
  pub affiliate_id:     i64,
  pub program_id:       i64,
  pub date:             String,
  pub status_name:      String,
  pub actual_time:      Option<String>,
  pub late_time:        Option<String>,
  pub deviation_code:   Option<String>,
  pub free_text_reason: Option<String>,
  pub notes:            Option<String>,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawRecord {
  pub fn into_record(self) -> Result<TransmissionRecord> {
    let status = TransmissionStatus::resolve(&self.status_name)
      .ok_or_else(|| Error::Decode(format!("unknown status name: {:?}", self.status_name)))?;

    Ok(TransmissionRecord {
      id: self.record_id,
      affiliate_id: self.affiliate_id,
      program_id: self.program_id,
      date: decode_date(&self.date)?,
      status,
      actual_time: self.actual_time,
      late_time: self.late_time,
      deviation_code: self.deviation_code,
      free_text_reason: self.free_text_reason,
      notes: self.notes,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
