//! Printable compliance-report assembly for Retrans.
//!
//! Turns affiliates, programs and transmission records over a date range
//! into a self-contained HTML document (inline CSS, no external resources)
//! meant for browser print-to-PDF. Pure synchronous; no HTTP or database
//! dependencies.

use chrono::NaiveDate;
use retrans_core::{
  affiliate::Affiliate, program::Program, record::TransmissionRecord,
};

mod html;
mod stats;

pub use html::{escape_html, render_html};
pub use stats::{CellState, ReportStats, cell_state, consolidate};

/// Everything the renderer needs. The caller decides which affiliates,
/// programs and records are in scope (e.g. a single-affiliate export passes
/// one affiliate and its records only).
pub struct ReportInput<'a> {
  pub start:      NaiveDate,
  pub end:        NaiveDate,
  pub affiliates: &'a [Affiliate],
  pub programs:   &'a [Program],
  pub records:    &'a [TransmissionRecord],
  /// Summary mode consolidates all affiliates into one row per program;
  /// detail mode renders a grid per affiliate.
  pub summary:    bool,
}
