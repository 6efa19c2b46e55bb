//! Self-contained HTML document renderer.
//!
//! One string out, inline CSS, no external resources. The document is meant
//! to be printed to PDF from a browser, so everything it needs must travel
//! with it.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::NaiveDate;
use retrans_core::{
  record::TransmissionRecord, schedule::dates_in_range,
  status::TransmissionStatus,
};

use crate::{
  ReportInput,
  stats::{CellState, ReportStats, cell_state, consolidate},
};

// ─── Escaping ────────────────────────────────────────────────────────────────

/// Escape user-supplied text for embedding in HTML body or attributes.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}

// ─── Styles ──────────────────────────────────────────────────────────────────

const STYLE: &str = "\
  body { font-family: Arial, Helvetica, sans-serif; margin: 24px; color: #1a1a1a; }\n\
  h1 { font-size: 20px; margin-bottom: 2px; }\n\
  h2 { font-size: 15px; margin: 18px 0 6px; }\n\
  .range { color: #555; margin-bottom: 14px; }\n\
  .stats { display: flex; gap: 10px; margin-bottom: 16px; }\n\
  .stat { border: 1px solid #ccc; border-radius: 4px; padding: 8px 14px; text-align: center; }\n\
  .stat .value { font-size: 18px; font-weight: bold; }\n\
  .stat .label { font-size: 11px; color: #555; text-transform: uppercase; }\n\
  table { border-collapse: collapse; width: 100%; margin-bottom: 16px; }\n\
  th, td { border: 1px solid #bbb; padding: 4px 6px; font-size: 12px; text-align: center; }\n\
  th { background: #f0f0f0; }\n\
  td.program-name { text-align: left; white-space: nowrap; }\n\
  td.aired { background: #e6f4e6; }\n\
  td.not-aired { background: #fbe3e3; font-weight: bold; }\n\
  td.late { background: #fdf3d7; }\n\
  td.pending { background: #eef2fa; color: #555; }\n\
  td.not-scheduled { color: #bbb; }\n\
  .code { font-size: 10px; color: #844; display: block; }\n\
  .footer { margin-top: 20px; font-size: 10px; color: #888; }\n\
  @media print { body { margin: 8px; } .stat { border-color: #999; } }\n";

// ─── Renderer ────────────────────────────────────────────────────────────────

type RecordKey = (i64, i64, NaiveDate);

/// Render the full report document.
pub fn render_html(input: &ReportInput<'_>) -> String {
  let dates = dates_in_range(input.start, input.end);

  let by_key: HashMap<RecordKey, &TransmissionRecord> = input
    .records
    .iter()
    .map(|r| ((r.affiliate_id, r.program_id, r.date), r))
    .collect();
  let affiliate_names: HashMap<i64, &str> = input
    .affiliates
    .iter()
    .map(|a| (a.id, a.name.as_str()))
    .collect();
  let program_names: HashMap<i64, &str> = input
    .programs
    .iter()
    .map(|p| (p.id, p.name.as_str()))
    .collect();

  let stats = ReportStats::from_records(input.records);

  let mut doc = String::with_capacity(16 * 1024);
  doc.push_str("<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n");
  doc.push_str("<title>Informe de retransmisiones</title>\n<style>\n");
  doc.push_str(STYLE);
  doc.push_str("</style>\n</head>\n<body>\n");

  doc.push_str("<h1>Informe de retransmisiones</h1>\n");
  let _ = writeln!(
    doc,
    "<div class=\"range\">Del {} al {}</div>",
    input.start.format("%d/%m/%Y"),
    input.end.format("%d/%m/%Y"),
  );

  push_stat_blocks(&mut doc, &stats);

  if input.summary {
    push_summary_grid(&mut doc, input, &dates, &by_key);
  } else {
    push_detail_grids(&mut doc, input, &dates, &by_key);
  }

  push_deviation_table(&mut doc, input, &affiliate_names, &program_names);

  let _ = writeln!(
    doc,
    "<div class=\"footer\">Generado el {}</div>",
    chrono::Utc::now().format("%d/%m/%Y %H:%M UTC"),
  );
  doc.push_str("</body>\n</html>\n");
  doc
}

fn push_stat_blocks(doc: &mut String, stats: &ReportStats) {
  doc.push_str("<div class=\"stats\">\n");
  let blocks: [(&str, String); 6] = [
    ("Total", stats.total.to_string()),
    ("Si", stats.aired.to_string()),
    ("No", stats.not_aired.to_string()),
    ("Tarde", stats.late.to_string()),
    ("Pendiente", stats.pending.to_string()),
    ("Efectividad", format!("{}%", stats.effectiveness)),
  ];
  for (label, value) in blocks {
    let _ = writeln!(
      doc,
      "<div class=\"stat\"><div class=\"value\">{value}</div><div class=\"label\">{label}</div></div>",
    );
  }
  doc.push_str("</div>\n");
}

fn push_grid_header(doc: &mut String, dates: &[NaiveDate]) {
  doc.push_str("<tr><th>Programa</th>");
  for d in dates {
    let _ = write!(doc, "<th>{}</th>", d.format("%d/%m"));
  }
  doc.push_str("</tr>\n");
}

fn push_cell(doc: &mut String, state: CellState, code: Option<&str>) {
  let _ = write!(doc, "<td class=\"{}\">{}", state.css_class(), state.glyph());
  if let Some(code) = code {
    let _ = write!(doc, "<span class=\"code\">{}</span>", escape_html(code));
  }
  doc.push_str("</td>");
}

/// Detail mode: one grid per affiliate, programs carried by that affiliate
/// as rows, dates as columns.
fn push_detail_grids(
  doc: &mut String,
  input: &ReportInput<'_>,
  dates: &[NaiveDate],
  by_key: &HashMap<RecordKey, &TransmissionRecord>,
) {
  for affiliate in input.affiliates {
    let programs: Vec<_> = input
      .programs
      .iter()
      .filter(|p| p.affiliate_ids.contains(&affiliate.id))
      .collect();
    if programs.is_empty() {
      continue;
    }

    let _ = writeln!(doc, "<h2>{}</h2>", escape_html(&affiliate.name));
    doc.push_str("<table>\n");
    push_grid_header(doc, dates);

    for program in programs {
      let _ = write!(
        doc,
        "<tr><td class=\"program-name\">{}</td>",
        escape_html(&program.name),
      );
      for date in dates {
        let record = by_key.get(&(affiliate.id, program.id, *date)).copied();
        let state = cell_state(program, *date, record);
        push_cell(doc, state, record.and_then(|r| r.deviation_code.as_deref()));
      }
      doc.push_str("</tr>\n");
    }
    doc.push_str("</table>\n");
  }
}

/// Summary mode: one row per program, each cell consolidated across every
/// affiliate that carries the program.
fn push_summary_grid(
  doc: &mut String,
  input: &ReportInput<'_>,
  dates: &[NaiveDate],
  by_key: &HashMap<RecordKey, &TransmissionRecord>,
) {
  doc.push_str("<h2>Resumen general</h2>\n<table>\n");
  push_grid_header(doc, dates);

  for program in input.programs {
    let _ = write!(
      doc,
      "<tr><td class=\"program-name\">{}</td>",
      escape_html(&program.name),
    );
    for date in dates {
      let mut states = Vec::with_capacity(program.affiliate_ids.len());
      let mut first_no_code: Option<&str> = None;
      for affiliate_id in &program.affiliate_ids {
        let record = by_key.get(&(*affiliate_id, program.id, *date)).copied();
        let state = cell_state(program, *date, record);
        if state == CellState::NotAired && first_no_code.is_none() {
          first_no_code = record.and_then(|r| r.deviation_code.as_deref());
        }
        states.push(state);
      }
      let consolidated = consolidate(&states);
      let code = (consolidated == CellState::NotAired)
        .then_some(first_no_code)
        .flatten();
      push_cell(doc, consolidated, code);
    }
    doc.push_str("</tr>\n");
  }
  doc.push_str("</table>\n");
}

/// Flat table of every record that is not a clean "Si", with its reason.
fn push_deviation_table(
  doc: &mut String,
  input: &ReportInput<'_>,
  affiliate_names: &HashMap<i64, &str>,
  program_names: &HashMap<i64, &str>,
) {
  let deviations: Vec<_> = input
    .records
    .iter()
    .filter(|r| r.status != TransmissionStatus::Aired)
    .collect();
  if deviations.is_empty() {
    return;
  }

  doc.push_str("<h2>Desviaciones</h2>\n<table>\n");
  doc.push_str(
    "<tr><th>Fecha</th><th>Filial</th><th>Programa</th><th>Estado</th>\
     <th>Codigo</th><th>Motivo</th><th>Notas</th></tr>\n",
  );
  for r in deviations {
    let affiliate = affiliate_names.get(&r.affiliate_id).copied().unwrap_or("?");
    let program = program_names.get(&r.program_id).copied().unwrap_or("?");
    let _ = writeln!(
      doc,
      "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
      r.date.format("%d/%m/%Y"),
      escape_html(affiliate),
      escape_html(program),
      r.status.display_name(),
      escape_html(r.deviation_code.as_deref().unwrap_or("")),
      escape_html(r.free_text_reason.as_deref().unwrap_or("")),
      escape_html(r.notes.as_deref().unwrap_or("")),
    );
  }
  doc.push_str("</table>\n");
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use retrans_core::{
    affiliate::Affiliate,
    program::{Program, ProgramState},
  };

  use super::*;

  fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  fn affiliate(id: i64, name: &str) -> Affiliate {
    Affiliate {
      id,
      name: name.into(),
      active: true,
      program_ids: vec![1],
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  fn program(id: i64, name: &str, affiliate_ids: Vec<i64>) -> Program {
    Program {
      id,
      name: name.into(),
      description: None,
      start_time: "08:00".into(),
      state: ProgramState::Active,
      schedule_start: d("2025-03-01"),
      schedule_end: None,
      weekdays: vec!["LUNES".into(), "MARTES".into()],
      affiliate_ids,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  fn record(
    affiliate_id: i64,
    date: &str,
    status: TransmissionStatus,
    code: Option<&str>,
  ) -> TransmissionRecord {
    TransmissionRecord {
      id: 1,
      affiliate_id,
      program_id: 1,
      date: d(date),
      status,
      actual_time: None,
      late_time: None,
      deviation_code: code.map(str::to_owned),
      free_text_reason: None,
      notes: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn escapes_html_metacharacters() {
    assert_eq!(
      escape_html("<b>\"a & b\"</b>"),
      "&lt;b&gt;&quot;a &amp; b&quot;&lt;/b&gt;"
    );
  }

  #[test]
  fn detail_report_is_self_contained() {
    let affiliates = [affiliate(1, "Canal <Norte>")];
    let programs = [program(1, "Noticias", vec![1])];
    // 2025-03-03 is a Monday: due, not aired.
    let records = [record(1, "2025-03-03", TransmissionStatus::NotAired, Some("Fta"))];

    let html = render_html(&ReportInput {
      start:      d("2025-03-03"),
      end:        d("2025-03-08"),
      affiliates: &affiliates,
      programs:   &programs,
      records:    &records,
      summary:    false,
    });

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<style>"));
    // user text escaped, never raw
    assert!(html.contains("Canal &lt;Norte&gt;"));
    assert!(!html.contains("Canal <Norte>"));
    // the not-aired cell carries its deviation code
    assert!(html.contains("Fta"));
    assert!(html.contains("Desviaciones"));
    // no external resources
    assert!(!html.contains("<link"));
    assert!(!html.contains("<script"));
  }

  #[test]
  fn summary_mode_consolidates_affiliates() {
    let affiliates = [affiliate(1, "Canal Norte"), affiliate(2, "Canal Sur")];
    let programs = [program(1, "Noticias", vec![1, 2])];
    let records = [
      record(1, "2025-03-03", TransmissionStatus::Aired, None),
      record(2, "2025-03-03", TransmissionStatus::NotAired, Some("Enf")),
    ];

    let html = render_html(&ReportInput {
      start:      d("2025-03-03"),
      end:        d("2025-03-03"),
      affiliates: &affiliates,
      programs:   &programs,
      records:    &records,
      summary:    true,
    });

    // One consolidated row; the No wins and shows its code.
    assert!(html.contains("Resumen general"));
    assert!(html.contains("class=\"not-aired\""));
    assert!(html.contains("Enf"));
  }

  #[test]
  fn stats_block_shows_effectiveness() {
    let affiliates = [affiliate(1, "Canal Norte")];
    let programs = [program(1, "Noticias", vec![1])];
    let records: Vec<_> = (0..6)
      .map(|i| {
        let mut r = record(1, "2025-03-03", TransmissionStatus::Aired, None);
        r.id = i;
        r
      })
      .chain((0..4).map(|i| {
        let mut r = record(1, "2025-03-04", TransmissionStatus::NotAired, None);
        r.id = 10 + i;
        r
      }))
      .collect();

    let html = render_html(&ReportInput {
      start:      d("2025-03-03"),
      end:        d("2025-03-04"),
      affiliates: &affiliates,
      programs:   &programs,
      records:    &records,
      summary:    false,
    });
    assert!(html.contains("60%"));
  }
}
