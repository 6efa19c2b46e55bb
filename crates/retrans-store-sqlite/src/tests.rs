//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use retrans_core::{
  affiliate::{AffiliatePatch, NewAffiliate},
  program::{NewProgram, ProgramState},
  record::{BatchOutcome, OTHER_CODE, RecordPatch, RecordUpsert, UNSPECIFIED_REASON},
  status::TransmissionStatus,
  store::ComplianceStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  let s = SqliteStore::open_in_memory().await.expect("in-memory store");
  s.ensure_reference_data().await.expect("seed");
  s
}

fn d(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn new_affiliate(name: &str) -> NewAffiliate {
  NewAffiliate { name: name.into(), active: true }
}

fn new_program(name: &str, weekdays: &[&str], affiliate_ids: Vec<i64>) -> NewProgram {
  NewProgram {
    name:           name.into(),
    description:    None,
    start_time:     "08:00".into(),
    state:          ProgramState::Active,
    schedule_start: Some(d("2025-03-01")),
    schedule_end:   None,
    weekdays:       weekdays.iter().map(|w| w.to_string()).collect(),
    affiliate_ids,
  }
}

fn upsert(affiliate_id: i64, program_id: i64, date: &str, status: Option<&str>) -> RecordUpsert {
  RecordUpsert {
    affiliate_id,
    program_id,
    date: d(date),
    status: status.map(str::to_owned),
    actual_time: None,
    late_time: None,
    deviation_code: None,
    free_text_reason: None,
    notes: None,
  }
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn seed_is_idempotent() {
  let s = SqliteStore::open_in_memory().await.unwrap();

  let first = s.ensure_reference_data().await.unwrap();
  assert_eq!(first.weekdays, 7);
  assert_eq!(first.statuses, 4);
  assert_eq!(first.reasons, 6);

  let second = s.ensure_reference_data().await.unwrap();
  assert_eq!(second.weekdays, 7);
  assert_eq!(second.statuses, 4);
  assert_eq!(second.reasons, 6);
}

// ─── Affiliates ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_affiliate() {
  let s = store().await;

  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  assert_eq!(a.name, "Canal Norte");
  assert!(a.active);

  let fetched = s.get_affiliate(a.id).await.unwrap().unwrap();
  assert_eq!(fetched.id, a.id);
  assert_eq!(fetched.name, "Canal Norte");
}

#[tokio::test]
async fn get_affiliate_missing_returns_none() {
  let s = store().await;
  assert!(s.get_affiliate(999).await.unwrap().is_none());
}

#[tokio::test]
async fn find_affiliate_by_name_is_case_insensitive() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();

  let found = s
    .find_affiliate_by_name("canal norte".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.id, a.id);

  assert!(
    s.find_affiliate_by_name("no such".into())
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn update_affiliate_patch() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();

  let updated = s
    .update_affiliate(a.id, AffiliatePatch { name: None, active: Some(false) })
    .await
    .unwrap();
  assert_eq!(updated.name, "Canal Norte");
  assert!(!updated.active);
}

#[tokio::test]
async fn delete_affiliate_missing_errors() {
  let s = store().await;
  let err = s.delete_affiliate(42).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(retrans_core::Error::AffiliateNotFound(42))
  ));
}

// ─── Programs ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_program_normalizes_weekdays_and_links_affiliates() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();

  let p = s
    .add_program(new_program("Noticias", &["Lunes", "MIÉRCOLES"], vec![a.id]))
    .await
    .unwrap();
  assert_eq!(p.weekdays, vec!["LUNES", "MIERCOLES"]);
  assert_eq!(p.affiliate_ids, vec![a.id]);
  assert_eq!(p.start_time, "08:00");

  // The link is visible from the affiliate side too.
  let a = s.get_affiliate(a.id).await.unwrap().unwrap();
  assert_eq!(a.program_ids, vec![p.id]);
}

#[tokio::test]
async fn get_program_round_trips() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["LUNES"], vec![a.id]))
    .await
    .unwrap();

  let fetched = s.get_program(p.id).await.unwrap().unwrap();
  assert_eq!(fetched.id, p.id);
  assert_eq!(fetched.name, "Noticias");
  assert_eq!(fetched.weekdays, vec!["LUNES"]);
  assert_eq!(fetched.affiliate_ids, vec![a.id]);

  assert!(s.get_program(999).await.unwrap().is_none());
}

#[tokio::test]
async fn add_program_rejects_unknown_weekday() {
  let s = store().await;
  let err = s
    .add_program(new_program("Noticias", &["FUNDAY"], vec![]))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(retrans_core::Error::UnknownWeekday(_))
  ));
}

#[tokio::test]
async fn add_program_reseeds_empty_weekday_table() {
  // No explicit seed: association resolution must heal the empty table.
  let s = SqliteStore::open_in_memory().await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["SABADO"], vec![]))
    .await
    .unwrap();
  assert_eq!(p.weekdays, vec!["SABADO"]);
}

#[tokio::test]
async fn replace_associations_is_a_full_replace() {
  let s = store().await;
  let a1 = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  let a2 = s.add_affiliate(new_affiliate("Canal Sur")).await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["LUNES"], vec![a1.id]))
    .await
    .unwrap();

  let p = s
    .replace_associations(p.id, vec![a2.id], vec!["JUEVES".into(), "VIERNES".into()])
    .await
    .unwrap();
  assert_eq!(p.weekdays, vec!["JUEVES", "VIERNES"]);
  assert_eq!(p.affiliate_ids, vec![a2.id]);

  let a1 = s.get_affiliate(a1.id).await.unwrap().unwrap();
  assert!(a1.program_ids.is_empty());
}

#[tokio::test]
async fn update_program_scalars_keep_associations() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["LUNES"], vec![a.id]))
    .await
    .unwrap();

  let p = s
    .update_program(
      p.id,
      retrans_core::program::ProgramPatch {
        start_time: Some("09:30".into()),
        state: Some(ProgramState::Inactive),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(p.start_time, "09:30");
  assert_eq!(p.state, ProgramState::Inactive);
  assert_eq!(p.weekdays, vec!["LUNES"]);
  assert_eq!(p.affiliate_ids, vec![a.id]);
}

#[tokio::test]
async fn delete_program_cascades_records() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["LUNES"], vec![a.id]))
    .await
    .unwrap();
  let r = s
    .upsert_record(upsert(a.id, p.id, "2025-03-03", Some("si")))
    .await
    .unwrap();

  s.delete_program(p.id).await.unwrap();
  assert!(s.get_record(r.id).await.unwrap().is_none());
}

// ─── Transmission records ────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_is_keyed_on_the_triple() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["LUNES"], vec![a.id]))
    .await
    .unwrap();

  let first = s
    .upsert_record(upsert(a.id, p.id, "2025-03-03", Some("pendiente")))
    .await
    .unwrap();
  let second = s
    .upsert_record(upsert(a.id, p.id, "2025-03-03", Some("si")))
    .await
    .unwrap();

  assert_eq!(first.id, second.id);
  assert_eq!(second.status, TransmissionStatus::Aired);
  assert_eq!(s.list_records().await.unwrap().len(), 1);

  // A different date is a different row.
  s.upsert_record(upsert(a.id, p.id, "2025-03-10", Some("si")))
    .await
    .unwrap();
  assert_eq!(s.list_records().await.unwrap().len(), 2);
}

#[tokio::test]
async fn upsert_unknown_affiliate_errors() {
  let s = store().await;
  let err = s
    .upsert_record(upsert(99, 1, "2025-03-03", Some("si")))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(retrans_core::Error::AffiliateNotFound(99))
  ));
}

#[tokio::test]
async fn unresolvable_status_falls_back_to_pending() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["LUNES"], vec![a.id]))
    .await
    .unwrap();

  let r = s
    .upsert_record(upsert(a.id, p.id, "2025-03-03", Some("garbage")))
    .await
    .unwrap();
  assert_eq!(r.status, TransmissionStatus::Pending);

  let r = s
    .upsert_record(upsert(a.id, p.id, "2025-03-04", None))
    .await
    .unwrap();
  assert_eq!(r.status, TransmissionStatus::Pending);
}

#[tokio::test]
async fn other_code_stores_free_text_and_concrete_code_clears_it() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["LUNES"], vec![a.id]))
    .await
    .unwrap();

  let mut input = upsert(a.id, p.id, "2025-03-03", Some("no"));
  input.deviation_code = Some(OTHER_CODE.into());
  input.free_text_reason = Some("generator failure".into());
  let r = s.upsert_record(input).await.unwrap();
  assert_eq!(r.deviation_code.as_deref(), Some(OTHER_CODE));
  assert_eq!(r.free_text_reason.as_deref(), Some("generator failure"));

  // Switching to a concrete code wipes the wording.
  let mut input = upsert(a.id, p.id, "2025-03-03", Some("no"));
  input.deviation_code = Some("Fta".into());
  let r = s.upsert_record(input).await.unwrap();
  assert_eq!(r.deviation_code.as_deref(), Some("Fta"));
  assert_eq!(r.free_text_reason, None);
}

#[tokio::test]
async fn other_code_without_text_gets_placeholder() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["LUNES"], vec![a.id]))
    .await
    .unwrap();

  let mut input = upsert(a.id, p.id, "2025-03-03", Some("tarde"));
  input.deviation_code = Some(OTHER_CODE.into());
  let r = s.upsert_record(input).await.unwrap();
  assert_eq!(r.free_text_reason.as_deref(), Some(UNSPECIFIED_REASON));
}

#[tokio::test]
async fn status_only_update_preserves_deviation() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["LUNES"], vec![a.id]))
    .await
    .unwrap();

  let mut input = upsert(a.id, p.id, "2025-03-03", Some("no"));
  input.deviation_code = Some("Fta".into());
  s.upsert_record(input).await.unwrap();

  // Re-sending the status with no deviation must not destroy it.
  let r = s
    .upsert_record(upsert(a.id, p.id, "2025-03-03", Some("no")))
    .await
    .unwrap();
  assert_eq!(r.deviation_code.as_deref(), Some("Fta"));
}

#[tokio::test]
async fn aired_clears_deviation() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["LUNES"], vec![a.id]))
    .await
    .unwrap();

  let mut input = upsert(a.id, p.id, "2025-03-03", Some("no"));
  input.deviation_code = Some("Enf".into());
  s.upsert_record(input).await.unwrap();

  let r = s
    .upsert_record(upsert(a.id, p.id, "2025-03-03", Some("si")))
    .await
    .unwrap();
  assert_eq!(r.status, TransmissionStatus::Aired);
  assert_eq!(r.deviation_code, None);
  assert_eq!(r.free_text_reason, None);
}

#[tokio::test]
async fn upsert_unknown_deviation_code_errors() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["LUNES"], vec![a.id]))
    .await
    .unwrap();

  let mut input = upsert(a.id, p.id, "2025-03-03", Some("no"));
  input.deviation_code = Some("Xyz".into());
  let err = s.upsert_record(input).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(retrans_core::Error::UnknownDeviationCode(_))
  ));
}

#[tokio::test]
async fn update_record_by_id() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["LUNES"], vec![a.id]))
    .await
    .unwrap();
  let r = s
    .upsert_record(upsert(a.id, p.id, "2025-03-03", None))
    .await
    .unwrap();

  let updated = s
    .update_record(
      r.id,
      RecordPatch {
        status: Some("tarde".into()),
        late_time: Some("08:12".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(updated.id, r.id);
  assert_eq!(updated.status, TransmissionStatus::Late);
  assert_eq!(updated.late_time.as_deref(), Some("08:12"));
}

#[tokio::test]
async fn records_in_range_is_inclusive() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["LUNES"], vec![a.id]))
    .await
    .unwrap();

  for date in ["2025-03-02", "2025-03-03", "2025-03-08", "2025-03-09"] {
    s.upsert_record(upsert(a.id, p.id, date, Some("si")))
      .await
      .unwrap();
  }

  let hits = s
    .records_in_range(d("2025-03-03"), d("2025-03-08"))
    .await
    .unwrap();
  assert_eq!(hits.len(), 2);
  assert_eq!(hits[0].date, d("2025-03-03"));
  assert_eq!(hits[1].date, d("2025-03-08"));
}

#[tokio::test]
async fn batch_failures_do_not_abort_the_rest() {
  let s = store().await;
  let a = s.add_affiliate(new_affiliate("Canal Norte")).await.unwrap();
  let p = s
    .add_program(new_program("Noticias", &["LUNES"], vec![a.id]))
    .await
    .unwrap();

  let outcomes = s
    .upsert_batch(vec![
      upsert(a.id, p.id, "2025-03-03", Some("si")),
      upsert(999, p.id, "2025-03-03", Some("si")),
      upsert(a.id, p.id, "2025-03-04", Some("no")),
    ])
    .await
    .unwrap();

  assert_eq!(outcomes.len(), 3);
  assert!(matches!(outcomes[0], BatchOutcome::Saved { .. }));
  assert!(matches!(outcomes[1], BatchOutcome::Failed { .. }));
  assert!(matches!(outcomes[2], BatchOutcome::Saved { .. }));
  assert_eq!(s.list_records().await.unwrap().len(), 2);
}

#[tokio::test]
async fn delete_record_missing_errors() {
  let s = store().await;
  let err = s.delete_record(7).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(retrans_core::Error::RecordNotFound(7))
  ));
}
