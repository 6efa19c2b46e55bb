//! The schedule resolver — pure functions deciding whether a program is due
//! to air on a given calendar date.
//!
//! Weekday names arrive in two representations (accented and diacritic-free);
//! everything here compares through [`normalize_weekday_name`] so the two
//! are interchangeable. No side effects anywhere; safe to call per cell on
//! every render.

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, Utc, Weekday};

use crate::{program::Program, reference::WEEKDAY_NAMES};

/// Substrings in a program's display name that pin it to Saturday.
const SATURDAY_MARKERS: [&str; 2] = ["(SÁBADO)", "(SABADO)"];

/// Lima has no daylight saving; a fixed UTC-5 offset is exact year-round.
const LIMA_UTC_OFFSET_SECS: i32 = -5 * 3600;

/// Today's calendar date in America/Lima.
pub fn today_in_lima() -> NaiveDate {
  let lima = FixedOffset::east_opt(LIMA_UTC_OFFSET_SECS).expect("fixed offset in range");
  Utc::now().with_timezone(&lima).date_naive()
}

/// Uppercase a weekday name and strip the two accented vowels that occur in
/// Spanish weekday names. Idempotent: normalizing twice equals normalizing
/// once.
pub fn normalize_weekday_name(name: &str) -> String {
  let upper = name.trim().to_uppercase();
  match upper.as_str() {
    "MIÉRCOLES" => "MIERCOLES".to_owned(),
    "SÁBADO" => "SABADO".to_owned(),
    _ => upper,
  }
}

/// The canonical (diacritic-free, uppercase) weekday name for a date.
pub fn weekday_name(date: NaiveDate) -> &'static str {
  match date.weekday() {
    Weekday::Mon => WEEKDAY_NAMES[0],
    Weekday::Tue => WEEKDAY_NAMES[1],
    Weekday::Wed => WEEKDAY_NAMES[2],
    Weekday::Thu => WEEKDAY_NAMES[3],
    Weekday::Fri => WEEKDAY_NAMES[4],
    Weekday::Sat => WEEKDAY_NAMES[5],
    Weekday::Sun => WEEKDAY_NAMES[6],
  }
}

/// Whether `program` is scheduled to air on `date`.
///
/// - An empty weekday set is never due — not "due every day".
/// - A Saturday marker in the display name is a hard override: the program
///   is due on Saturday and only on Saturday, whatever its stored set says.
/// - Otherwise, membership of the date's weekday in the stored set, both
///   sides normalized.
pub fn is_due(program: &Program, date: NaiveDate) -> bool {
  if program.weekdays.is_empty() {
    return false;
  }

  let target = weekday_name(date);

  if SATURDAY_MARKERS.iter().any(|m| program.name.contains(m)) {
    return target == "SABADO";
  }

  program
    .weekdays
    .iter()
    .any(|d| normalize_weekday_name(d) == target)
}

/// Monday-to-Saturday dates of the week containing `anchor` — the six
/// columns of the schedule grid.
pub fn week_dates(anchor: NaiveDate) -> Vec<NaiveDate> {
  let monday = anchor - Duration::days(i64::from(anchor.weekday().num_days_from_monday()));
  (0..6).map(|offset| monday + Duration::days(offset)).collect()
}

/// Every date in `[start, end]`, inclusive on both ends. Empty when the
/// range is inverted.
pub fn dates_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
  let mut dates = Vec::new();
  let mut current = start;
  while current <= end {
    dates.push(current);
    current += Duration::days(1);
  }
  dates
}
