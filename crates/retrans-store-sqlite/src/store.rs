//! [`SqliteStore`] — the SQLite implementation of [`ComplianceStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension as _, params};

use retrans_core::{
  Error as CoreError,
  affiliate::{Affiliate, AffiliatePatch, NewAffiliate},
  program::{NewProgram, Program, ProgramPatch},
  record::{BatchOutcome, RecordPatch, RecordUpsert, TransmissionRecord, resolve_deviation},
  reference::{DEVIATION_REASONS, STATUSES, SeedSummary, WEEKDAY_NAMES},
  schedule::{normalize_weekday_name, today_in_lima},
  status::TransmissionStatus,
  store::ComplianceStore,
};

use crate::{
  Error, Result,
  encode::{RawAffiliate, RawProgram, RawRecord, encode_date, encode_dt},
  schema::SCHEMA,
};

/// Domain-level outcome computed inside a database closure. The outer
/// `tokio_rusqlite::Result` carries database faults; this carries the
/// business verdict.
type Domain<T> = std::result::Result<T, CoreError>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Retrans compliance store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn assemble_program_by_id(&self, id: i64) -> Result<Option<Program>> {
    let parts = self
      .conn
      .call(move |conn| Ok(assemble_program(conn, id)?))
      .await?;

    parts
      .map(|(raw, weekdays, affiliate_ids)| raw.into_program(weekdays, affiliate_ids))
      .transpose()
  }
}

// ─── Row helpers (run inside connection closures) ────────────────────────────

fn raw_affiliate_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAffiliate> {
  Ok(RawAffiliate {
    affiliate_id: row.get(0)?,
    name:         row.get(1)?,
    active:       row.get(2)?,
    created_at:   row.get(3)?,
    updated_at:   row.get(4)?,
  })
}

fn raw_program_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawProgram> {
  Ok(RawProgram {
    program_id:     row.get(0)?,
    name:           row.get(1)?,
    description:    row.get(2)?,
    start_time:     row.get(3)?,
    state:          row.get(4)?,
    schedule_start: row.get(5)?,
    schedule_end:   row.get(6)?,
    created_at:     row.get(7)?,
    updated_at:     row.get(8)?,
  })
}

const RECORD_SELECT: &str = "SELECT
    r.record_id, r.affiliate_id, r.program_id, r.date,
    s.name, r.actual_time, r.late_time, d.code,
    r.free_text_reason, r.notes, r.created_at, r.updated_at
  FROM transmission_records r
  JOIN transmission_statuses s ON s.status_id = r.status_id
  LEFT JOIN deviation_reasons d ON d.reason_id = r.reason_id";

fn raw_record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
  Ok(RawRecord {
    record_id:        row.get(0)?,
    affiliate_id:     row.get(1)?,
    program_id:       row.get(2)?,
    date:             row.get(3)?,
    status_name:      row.get(4)?,
    actual_time:      row.get(5)?,
    late_time:        row.get(6)?,
    deviation_code:   row.get(7)?,
    free_text_reason: row.get(8)?,
    notes:            row.get(9)?,
    created_at:       row.get(10)?,
    updated_at:       row.get(11)?,
  })
}

fn affiliate_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM affiliates WHERE affiliate_id = ?1",
        params![id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn program_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM programs WHERE program_id = ?1",
        params![id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn fetch_raw_affiliate(conn: &Connection, id: i64) -> rusqlite::Result<Option<RawAffiliate>> {
  conn
    .query_row(
      "SELECT affiliate_id, name, active, created_at, updated_at
       FROM affiliates WHERE affiliate_id = ?1",
      params![id],
      raw_affiliate_from_row,
    )
    .optional()
}

fn affiliate_program_ids(conn: &Connection, id: i64) -> rusqlite::Result<Vec<i64>> {
  let mut stmt = conn.prepare(
    "SELECT program_id FROM program_affiliates WHERE affiliate_id = ?1 ORDER BY program_id",
  )?;
  stmt
    .query_map(params![id], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<_>>>()
}

fn fetch_raw_program(conn: &Connection, id: i64) -> rusqlite::Result<Option<RawProgram>> {
  conn
    .query_row(
      "SELECT program_id, name, description, start_time, state,
              schedule_start, schedule_end, created_at, updated_at
       FROM programs WHERE program_id = ?1",
      params![id],
      raw_program_from_row,
    )
    .optional()
}

fn program_weekday_names(conn: &Connection, id: i64) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(
    "SELECT w.name FROM program_weekdays pw
     JOIN weekdays w ON w.weekday_id = pw.weekday_id
     WHERE pw.program_id = ?1
     ORDER BY w.weekday_id",
  )?;
  stmt
    .query_map(params![id], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<_>>>()
}

fn program_affiliate_ids(conn: &Connection, id: i64) -> rusqlite::Result<Vec<i64>> {
  let mut stmt = conn.prepare(
    "SELECT affiliate_id FROM program_affiliates WHERE program_id = ?1 ORDER BY affiliate_id",
  )?;
  stmt
    .query_map(params![id], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<_>>>()
}

fn assemble_program(
  conn: &Connection,
  id: i64,
) -> rusqlite::Result<Option<(RawProgram, Vec<String>, Vec<i64>)>> {
  let raw = match fetch_raw_program(conn, id)? {
    Some(r) => r,
    None => return Ok(None),
  };
  let weekdays = program_weekday_names(conn, id)?;
  let affiliate_ids = program_affiliate_ids(conn, id)?;
  Ok(Some((raw, weekdays, affiliate_ids)))
}

fn seed_reference_rows(conn: &Connection) -> rusqlite::Result<()> {
  for name in WEEKDAY_NAMES {
    conn.execute(
      "INSERT INTO weekdays (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
      params![name],
    )?;
  }
  for status in STATUSES {
    conn.execute(
      "INSERT INTO transmission_statuses (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
      params![status.display_name()],
    )?;
  }
  for (code, label, applies_to) in DEVIATION_REASONS {
    conn.execute(
      "INSERT INTO deviation_reasons (code, label, applies_to) VALUES (?1, ?2, ?3)
       ON CONFLICT(code) DO NOTHING",
      params![code, label, applies_to.slug()],
    )?;
  }
  Ok(())
}

/// Resolve weekday names to reference-row ids, normalizing accents and case.
/// An empty weekday table is reseeded first — the store must stay usable
/// against an uninitialised database.
fn weekday_ids_by_name(
  conn: &Connection,
  names: &[String],
) -> rusqlite::Result<Domain<Vec<i64>>> {
  let count: i64 = conn.query_row("SELECT COUNT(*) FROM weekdays", [], |r| r.get(0))?;
  if count == 0 {
    tracing::warn!("weekday reference table is empty; reseeding reference data");
    seed_reference_rows(conn)?;
  }

  let mut ids = Vec::with_capacity(names.len());
  for name in names {
    let normalized = normalize_weekday_name(name);
    let id: Option<i64> = conn
      .query_row(
        "SELECT weekday_id FROM weekdays WHERE name = ?1",
        params![normalized],
        |r| r.get(0),
      )
      .optional()?;
    match id {
      Some(id) if !ids.contains(&id) => ids.push(id),
      Some(_) => {} // duplicate name in the input; keep one join row
      None => return Ok(Err(CoreError::UnknownWeekday(name.clone()))),
    }
  }
  Ok(Ok(ids))
}

fn status_row_id(conn: &Connection, status: TransmissionStatus) -> rusqlite::Result<Option<i64>> {
  conn
    .query_row(
      "SELECT status_id FROM transmission_statuses WHERE name = ?1",
      params![status.display_name()],
      |r| r.get(0),
    )
    .optional()
}

fn reason_row_id(conn: &Connection, code: &str) -> rusqlite::Result<Option<i64>> {
  conn
    .query_row(
      "SELECT reason_id FROM deviation_reasons WHERE code = ?1",
      params![code],
      |r| r.get(0),
    )
    .optional()
}

fn fetch_raw_record_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<RawRecord>> {
  conn
    .query_row(
      &format!("{RECORD_SELECT} WHERE r.record_id = ?1"),
      params![id],
      raw_record_from_row,
    )
    .optional()
}

fn fetch_raw_record_by_triple(
  conn: &Connection,
  affiliate_id: i64,
  program_id: i64,
  date: &str,
) -> rusqlite::Result<Option<RawRecord>> {
  conn
    .query_row(
      &format!(
        "{RECORD_SELECT} WHERE r.affiliate_id = ?1 AND r.program_id = ?2 AND r.date = ?3"
      ),
      params![affiliate_id, program_id, date],
      raw_record_from_row,
    )
    .optional()
}

/// The triple-keyed upsert. Looks up by `(affiliate, program, date)`,
/// updates in place or inserts, enforcing the deviation exclusivity rule.
fn upsert_in_conn(conn: &Connection, input: RecordUpsert) -> rusqlite::Result<Domain<RawRecord>> {
  if !affiliate_exists(conn, input.affiliate_id)? {
    return Ok(Err(CoreError::AffiliateNotFound(input.affiliate_id)));
  }
  if !program_exists(conn, input.program_id)? {
    return Ok(Err(CoreError::ProgramNotFound(input.program_id)));
  }

  let date_str = encode_date(input.date);
  let existing = fetch_raw_record_by_triple(conn, input.affiliate_id, input.program_id, &date_str)?;

  // A supplied status string that fails to resolve falls back to Pending;
  // no status at all keeps the stored one (Pending on first insert).
  let status = match &input.status {
    Some(s) => TransmissionStatus::resolve(s).unwrap_or_default(),
    None => existing
      .as_ref()
      .and_then(|r| TransmissionStatus::resolve(&r.status_name))
      .unwrap_or_default(),
  };
  let status_id = match status_row_id(conn, status)? {
    Some(id) => id,
    None => {
      return Ok(Err(CoreError::Validation(
        "transmission statuses are not seeded; run the reference-data seed first".to_owned(),
      )));
    }
  };

  // A supplied deviation code must resolve to a seeded reason row.
  if let Some(code) = input.deviation_code.as_deref()
    && reason_row_id(conn, code)?.is_none()
  {
    return Ok(Err(CoreError::UnknownDeviationCode(code.to_owned())));
  }

  let (deviation_code, free_text_reason) = resolve_deviation(
    status,
    input.deviation_code.as_deref(),
    input.free_text_reason.as_deref(),
    existing.as_ref().and_then(|r| r.deviation_code.as_deref()),
    existing.as_ref().and_then(|r| r.free_text_reason.as_deref()),
  );

  // A preserved prior code always resolves: it was stored through this path.
  let reason_id = match deviation_code.as_deref() {
    Some(code) => reason_row_id(conn, code)?,
    None => None,
  };

  let now_str = encode_dt(Utc::now());
  let record_id = match &existing {
    Some(r) => {
      conn.execute(
        "UPDATE transmission_records
         SET status_id = ?1, actual_time = ?2, late_time = ?3, reason_id = ?4,
             free_text_reason = ?5, notes = ?6, updated_at = ?7
         WHERE record_id = ?8",
        params![
          status_id,
          input.actual_time,
          input.late_time,
          reason_id,
          free_text_reason,
          input.notes,
          now_str,
          r.record_id,
        ],
      )?;
      r.record_id
    }
    None => {
      conn.execute(
        "INSERT INTO transmission_records (
           affiliate_id, program_id, date, status_id, actual_time, late_time,
           reason_id, free_text_reason, notes, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
          input.affiliate_id,
          input.program_id,
          date_str,
          status_id,
          input.actual_time,
          input.late_time,
          reason_id,
          free_text_reason,
          input.notes,
          now_str,
          now_str,
        ],
      )?;
      conn.last_insert_rowid()
    }
  };

  match fetch_raw_record_by_id(conn, record_id)? {
    Some(raw) => Ok(Ok(raw)),
    None => Ok(Err(CoreError::RecordNotFound(record_id))),
  }
}

// ─── ComplianceStore impl ────────────────────────────────────────────────────

impl ComplianceStore for SqliteStore {
  type Error = Error;

  // ── Reference data ────────────────────────────────────────────────────────

  async fn ensure_reference_data(&self) -> Result<SeedSummary> {
    let summary = self
      .conn
      .call(|conn| {
        seed_reference_rows(conn)?;
        let weekdays: i64 = conn.query_row("SELECT COUNT(*) FROM weekdays", [], |r| r.get(0))?;
        let statuses: i64 =
          conn.query_row("SELECT COUNT(*) FROM transmission_statuses", [], |r| r.get(0))?;
        let reasons: i64 =
          conn.query_row("SELECT COUNT(*) FROM deviation_reasons", [], |r| r.get(0))?;
        Ok(SeedSummary {
          weekdays: weekdays as usize,
          statuses: statuses as usize,
          reasons:  reasons as usize,
        })
      })
      .await?;
    Ok(summary)
  }

  // ── Affiliates ────────────────────────────────────────────────────────────

  async fn add_affiliate(&self, input: NewAffiliate) -> Result<Affiliate> {
    if input.name.trim().is_empty() {
      return Err(CoreError::Validation("affiliate name is required".to_owned()).into());
    }

    let raw = self
      .conn
      .call(move |conn| {
        let now_str = encode_dt(Utc::now());
        conn.execute(
          "INSERT INTO affiliates (name, active, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![input.name.trim(), input.active, now_str, now_str],
        )?;
        let id = conn.last_insert_rowid();
        Ok(fetch_raw_affiliate(conn, id)?)
      })
      .await?;

    match raw {
      Some(raw) => raw.into_affiliate(Vec::new()),
      None => Err(Error::Decode("affiliate row vanished after insert".to_owned())),
    }
  }

  async fn get_affiliate(&self, id: i64) -> Result<Option<Affiliate>> {
    let parts = self
      .conn
      .call(move |conn| {
        let raw = match fetch_raw_affiliate(conn, id)? {
          Some(r) => r,
          None => return Ok(None),
        };
        let program_ids = affiliate_program_ids(conn, id)?;
        Ok(Some((raw, program_ids)))
      })
      .await?;

    parts
      .map(|(raw, program_ids)| raw.into_affiliate(program_ids))
      .transpose()
  }

  async fn find_affiliate_by_name(&self, name: String) -> Result<Option<Affiliate>> {
    let parts = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT affiliate_id, name, active, created_at, updated_at
             FROM affiliates WHERE name = ?1 COLLATE NOCASE LIMIT 1",
            params![name.trim()],
            raw_affiliate_from_row,
          )
          .optional()?;
        let raw = match raw {
          Some(r) => r,
          None => return Ok(None),
        };
        let program_ids = affiliate_program_ids(conn, raw.affiliate_id)?;
        Ok(Some((raw, program_ids)))
      })
      .await?;

    parts
      .map(|(raw, program_ids)| raw.into_affiliate(program_ids))
      .transpose()
  }

  async fn list_affiliates(&self) -> Result<Vec<Affiliate>> {
    let parts: Vec<(RawAffiliate, Vec<i64>)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT affiliate_id, name, active, created_at, updated_at
           FROM affiliates ORDER BY affiliate_id",
        )?;
        let raws = stmt
          .query_map([], raw_affiliate_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(raws.len());
        for raw in raws {
          let program_ids = affiliate_program_ids(conn, raw.affiliate_id)?;
          out.push((raw, program_ids));
        }
        Ok(out)
      })
      .await?;

    parts
      .into_iter()
      .map(|(raw, program_ids)| raw.into_affiliate(program_ids))
      .collect()
  }

  async fn update_affiliate(&self, id: i64, patch: AffiliatePatch) -> Result<Affiliate> {
    let out = self
      .conn
      .call(move |conn| {
        let current = match fetch_raw_affiliate(conn, id)? {
          Some(r) => r,
          None => return Ok(Err(CoreError::AffiliateNotFound(id))),
        };

        let name = patch.name.unwrap_or(current.name);
        if name.trim().is_empty() {
          return Ok(Err(CoreError::Validation("affiliate name is required".to_owned())));
        }
        let active = patch.active.unwrap_or(current.active);

        conn.execute(
          "UPDATE affiliates SET name = ?1, active = ?2, updated_at = ?3
           WHERE affiliate_id = ?4",
          params![name.trim(), active, encode_dt(Utc::now()), id],
        )?;
        Ok(Ok(()))
      })
      .await?;
    out?;

    self
      .get_affiliate(id)
      .await?
      .ok_or_else(|| CoreError::AffiliateNotFound(id).into())
  }

  async fn delete_affiliate(&self, id: i64) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM affiliates WHERE affiliate_id = ?1", params![id])?)
      })
      .await?;
    if deleted == 0 {
      return Err(CoreError::AffiliateNotFound(id).into());
    }
    Ok(())
  }

  // ── Programs ──────────────────────────────────────────────────────────────

  async fn add_program(&self, input: NewProgram) -> Result<Program> {
    if input.name.trim().is_empty() {
      return Err(CoreError::Validation("program name is required".to_owned()).into());
    }
    let schedule_start = input.schedule_start.unwrap_or_else(today_in_lima);

    let out = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        for aff_id in &input.affiliate_ids {
          if !affiliate_exists(&tx, *aff_id)? {
            return Ok(Err(CoreError::AffiliateNotFound(*aff_id)));
          }
        }
        let weekday_ids = match weekday_ids_by_name(&tx, &input.weekdays)? {
          Ok(ids) => ids,
          Err(e) => return Ok(Err(e)),
        };

        let now_str = encode_dt(Utc::now());
        tx.execute(
          "INSERT INTO programs (
             name, description, start_time, state, schedule_start, schedule_end,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          params![
            input.name.trim(),
            input.description,
            input.start_time,
            input.state.slug(),
            encode_date(schedule_start),
            input.schedule_end.map(encode_date),
            now_str,
            now_str,
          ],
        )?;
        let program_id = tx.last_insert_rowid();

        for weekday_id in &weekday_ids {
          tx.execute(
            "INSERT INTO program_weekdays (program_id, weekday_id) VALUES (?1, ?2)",
            params![program_id, weekday_id],
          )?;
        }
        for aff_id in &input.affiliate_ids {
          tx.execute(
            "INSERT INTO program_affiliates (program_id, affiliate_id) VALUES (?1, ?2)",
            params![program_id, aff_id],
          )?;
        }

        let parts = assemble_program(&tx, program_id)?;
        tx.commit()?;

        match parts {
          Some(parts) => Ok(Ok(parts)),
          None => Ok(Err(CoreError::ProgramNotFound(program_id))),
        }
      })
      .await?;

    let (raw, weekdays, affiliate_ids) = out?;
    raw.into_program(weekdays, affiliate_ids)
  }

  async fn get_program(&self, id: i64) -> Result<Option<Program>> {
    self.assemble_program_by_id(id).await
  }

  async fn list_programs(&self) -> Result<Vec<Program>> {
    let parts: Vec<(RawProgram, Vec<String>, Vec<i64>)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT program_id, name, description, start_time, state,
                  schedule_start, schedule_end, created_at, updated_at
           FROM programs ORDER BY program_id",
        )?;
        let raws = stmt
          .query_map([], raw_program_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(raws.len());
        for raw in raws {
          let weekdays = program_weekday_names(conn, raw.program_id)?;
          let affiliate_ids = program_affiliate_ids(conn, raw.program_id)?;
          out.push((raw, weekdays, affiliate_ids));
        }
        Ok(out)
      })
      .await?;

    parts
      .into_iter()
      .map(|(raw, weekdays, affiliate_ids)| raw.into_program(weekdays, affiliate_ids))
      .collect()
  }

  async fn update_program(&self, id: i64, patch: ProgramPatch) -> Result<Program> {
    let weekdays = patch.weekdays.clone();
    let affiliate_ids = patch.affiliate_ids.clone();

    let out = self
      .conn
      .call(move |conn| {
        let current = match fetch_raw_program(conn, id)? {
          Some(r) => r,
          None => return Ok(Err(CoreError::ProgramNotFound(id))),
        };

        let name = patch.name.unwrap_or(current.name);
        if name.trim().is_empty() {
          return Ok(Err(CoreError::Validation("program name is required".to_owned())));
        }
        let description = patch.description.or(current.description);
        let start_time = patch.start_time.unwrap_or(current.start_time);
        let state = patch
          .state
          .map(|s| s.slug().to_owned())
          .unwrap_or(current.state);
        let schedule_start = patch
          .schedule_start
          .map(encode_date)
          .unwrap_or(current.schedule_start);
        let schedule_end = patch.schedule_end.map(encode_date).or(current.schedule_end);

        conn.execute(
          "UPDATE programs
           SET name = ?1, description = ?2, start_time = ?3, state = ?4,
               schedule_start = ?5, schedule_end = ?6, updated_at = ?7
           WHERE program_id = ?8",
          params![
            name.trim(),
            description,
            start_time,
            state,
            schedule_start,
            schedule_end,
            encode_dt(Utc::now()),
            id,
          ],
        )?;
        Ok(Ok(()))
      })
      .await?;
    out?;

    if weekdays.is_some() || affiliate_ids.is_some() {
      let current = self
        .get_program(id)
        .await?
        .ok_or(CoreError::ProgramNotFound(id))?;
      let affiliate_ids = affiliate_ids.unwrap_or(current.affiliate_ids);
      let weekdays = weekdays.unwrap_or(current.weekdays);
      return self.replace_associations(id, affiliate_ids, weekdays).await;
    }

    self
      .get_program(id)
      .await?
      .ok_or_else(|| CoreError::ProgramNotFound(id).into())
  }

  async fn replace_associations(
    &self,
    program_id: i64,
    affiliate_ids: Vec<i64>,
    weekday_names: Vec<String>,
  ) -> Result<Program> {
    let out = self
      .conn
      .call(move |conn| {
        // Single transaction: join rows are never observable half-replaced.
        let tx = conn.transaction()?;

        if !program_exists(&tx, program_id)? {
          return Ok(Err(CoreError::ProgramNotFound(program_id)));
        }
        for aff_id in &affiliate_ids {
          if !affiliate_exists(&tx, *aff_id)? {
            return Ok(Err(CoreError::AffiliateNotFound(*aff_id)));
          }
        }
        let weekday_ids = match weekday_ids_by_name(&tx, &weekday_names)? {
          Ok(ids) => ids,
          Err(e) => return Ok(Err(e)),
        };

        tx.execute(
          "DELETE FROM program_weekdays WHERE program_id = ?1",
          params![program_id],
        )?;
        tx.execute(
          "DELETE FROM program_affiliates WHERE program_id = ?1",
          params![program_id],
        )?;
        for weekday_id in &weekday_ids {
          tx.execute(
            "INSERT INTO program_weekdays (program_id, weekday_id) VALUES (?1, ?2)",
            params![program_id, weekday_id],
          )?;
        }
        let mut seen = Vec::with_capacity(affiliate_ids.len());
        for aff_id in &affiliate_ids {
          if seen.contains(aff_id) {
            continue;
          }
          seen.push(*aff_id);
          tx.execute(
            "INSERT INTO program_affiliates (program_id, affiliate_id) VALUES (?1, ?2)",
            params![program_id, aff_id],
          )?;
        }
        tx.execute(
          "UPDATE programs SET updated_at = ?1 WHERE program_id = ?2",
          params![encode_dt(Utc::now()), program_id],
        )?;

        let parts = assemble_program(&tx, program_id)?;
        tx.commit()?;

        match parts {
          Some(parts) => Ok(Ok(parts)),
          None => Ok(Err(CoreError::ProgramNotFound(program_id))),
        }
      })
      .await?;

    let (raw, weekdays, affiliate_ids) = out?;
    raw.into_program(weekdays, affiliate_ids)
  }

  async fn delete_program(&self, id: i64) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM programs WHERE program_id = ?1", params![id])?)
      })
      .await?;
    if deleted == 0 {
      return Err(CoreError::ProgramNotFound(id).into());
    }
    Ok(())
  }

  // ── Transmission records ──────────────────────────────────────────────────

  async fn upsert_record(&self, input: RecordUpsert) -> Result<TransmissionRecord> {
    let out = self
      .conn
      .call(move |conn| Ok(upsert_in_conn(conn, input)?))
      .await?;
    out?.into_record()
  }

  async fn upsert_batch(&self, inputs: Vec<RecordUpsert>) -> Result<Vec<BatchOutcome>> {
    let mut outcomes = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.into_iter().enumerate() {
      match self.upsert_record(input).await {
        Ok(record) => outcomes.push(BatchOutcome::Saved { record }),
        Err(e) => {
          tracing::warn!(index, error = %e, "batch upsert item failed");
          outcomes.push(BatchOutcome::Failed { error: e.to_string() });
        }
      }
    }
    Ok(outcomes)
  }

  async fn get_record(&self, id: i64) -> Result<Option<TransmissionRecord>> {
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_raw_record_by_id(conn, id)?))
      .await?;
    raw.map(RawRecord::into_record).transpose()
  }

  async fn update_record(&self, id: i64, patch: RecordPatch) -> Result<TransmissionRecord> {
    // Same resolution path as the triple upsert: one rule for both.
    let current = self
      .get_record(id)
      .await?
      .ok_or(CoreError::RecordNotFound(id))?;

    self
      .upsert_record(RecordUpsert {
        affiliate_id:     current.affiliate_id,
        program_id:       current.program_id,
        date:             current.date,
        status:           patch.status,
        actual_time:      patch.actual_time,
        late_time:        patch.late_time,
        deviation_code:   patch.deviation_code,
        free_text_reason: patch.free_text_reason,
        notes:            patch.notes,
      })
      .await
  }

  async fn list_records(&self) -> Result<Vec<TransmissionRecord>> {
    let raws: Vec<RawRecord> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("{RECORD_SELECT} ORDER BY r.date, r.record_id"))?;
        let rows = stmt
          .query_map([], raw_record_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn records_in_range(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<TransmissionRecord>> {
    let start_str = encode_date(start);
    let end_str = encode_date(end);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{RECORD_SELECT} WHERE r.date >= ?1 AND r.date <= ?2 ORDER BY r.date, r.record_id"
        ))?;
        let rows = stmt
          .query_map(params![start_str, end_str], raw_record_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn delete_record(&self, id: i64) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM transmission_records WHERE record_id = ?1",
          params![id],
        )?)
      })
      .await?;
    if deleted == 0 {
      return Err(CoreError::RecordNotFound(id).into());
    }
    Ok(())
  }
}
