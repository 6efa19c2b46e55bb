//! The `ComplianceStore` trait.
//!
//! Implemented by storage backends (e.g. `retrans-store-sqlite`). Higher
//! layers (`retrans-api`, `retrans-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  affiliate::{Affiliate, AffiliatePatch, NewAffiliate},
  error::Classify,
  program::{NewProgram, Program, ProgramPatch},
  record::{BatchOutcome, RecordPatch, RecordUpsert, TransmissionRecord},
  reference::SeedSummary,
};

/// Abstraction over a Retrans storage backend.
///
/// All record writes are triple-keyed upserts: there is exactly one
/// [`TransmissionRecord`] per `(affiliate_id, program_id, date)`, and the
/// backend enforces that with a unique constraint, not convention.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ComplianceStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Reference data ────────────────────────────────────────────────────

  /// Seed the weekday/status/reason reference tables, upserting by natural
  /// key. Idempotent: re-running never duplicates rows. Returns the row
  /// counts after the pass.
  ///
  /// Also invoked internally by association resolution when the weekday
  /// table is found empty (self-healing against an uninitialised store).
  fn ensure_reference_data(
    &self,
  ) -> impl Future<Output = Result<SeedSummary, Self::Error>> + Send + '_;

  // ── Affiliates ────────────────────────────────────────────────────────

  fn add_affiliate(
    &self,
    input: NewAffiliate,
  ) -> impl Future<Output = Result<Affiliate, Self::Error>> + Send + '_;

  /// Returns `None` if not found.
  fn get_affiliate(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Affiliate>, Self::Error>> + Send + '_;

  /// Case-insensitive lookup by name, used by bulk setup flows.
  fn find_affiliate_by_name(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Option<Affiliate>, Self::Error>> + Send + '_;

  fn list_affiliates(
    &self,
  ) -> impl Future<Output = Result<Vec<Affiliate>, Self::Error>> + Send + '_;

  fn update_affiliate(
    &self,
    id: i64,
    patch: AffiliatePatch,
  ) -> impl Future<Output = Result<Affiliate, Self::Error>> + Send + '_;

  /// Cascades: join rows and transmission records for the affiliate go too.
  fn delete_affiliate(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Programs ──────────────────────────────────────────────────────────

  fn add_program(
    &self,
    input: NewProgram,
  ) -> impl Future<Output = Result<Program, Self::Error>> + Send + '_;

  fn get_program(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Program>, Self::Error>> + Send + '_;

  fn list_programs(
    &self,
  ) -> impl Future<Output = Result<Vec<Program>, Self::Error>> + Send + '_;

  /// Scalar-field update; replaces associations for whichever sets the
  /// patch supplies, via [`Self::replace_associations`] semantics.
  fn update_program(
    &self,
    id: i64,
    patch: ProgramPatch,
  ) -> impl Future<Output = Result<Program, Self::Error>> + Send + '_;

  /// Full-replace of both association sets: delete all join rows for the
  /// program, insert fresh ones. Weekday names are resolved
  /// case-insensitively and accent-normalized; an empty weekday reference
  /// table is reseeded first. Runs in a single transaction.
  fn replace_associations(
    &self,
    program_id: i64,
    affiliate_ids: Vec<i64>,
    weekday_names: Vec<String>,
  ) -> impl Future<Output = Result<Program, Self::Error>> + Send + '_;

  /// Cascades: weekday/affiliate join rows and dependent transmission
  /// records are removed with the program. Deliberate, not a leak.
  fn delete_program(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Transmission records ──────────────────────────────────────────────

  /// Look up by `(affiliate_id, program_id, date)`; update in place if
  /// found, insert otherwise. Status defaults to Pending when absent or
  /// unresolvable. Deviation code / free-text exclusivity is enforced here,
  /// not trusted from the caller.
  fn upsert_record(
    &self,
    input: RecordUpsert,
  ) -> impl Future<Output = Result<TransmissionRecord, Self::Error>> + Send + '_;

  /// Apply each upsert independently, in order. Per-item outcomes; a
  /// failure never aborts or rolls back the rest of the batch.
  fn upsert_batch(
    &self,
    inputs: Vec<RecordUpsert>,
  ) -> impl Future<Output = Result<Vec<BatchOutcome>, Self::Error>> + Send + '_;

  fn get_record(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<TransmissionRecord>, Self::Error>> + Send + '_;

  fn update_record(
    &self,
    id: i64,
    patch: RecordPatch,
  ) -> impl Future<Output = Result<TransmissionRecord, Self::Error>> + Send + '_;

  fn list_records(
    &self,
  ) -> impl Future<Output = Result<Vec<TransmissionRecord>, Self::Error>> + Send + '_;

  /// All records with `start <= date <= end`.
  fn records_in_range(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<TransmissionRecord>, Self::Error>> + Send + '_;

  /// Records are never auto-deleted; this is the explicit admin path.
  fn delete_record(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
