//! Error type for `retrans-store-sqlite`.

use retrans_core::{Classify, ErrorClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Core(#[from] retrans_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uniqueness violation: {0}")]
  Conflict(String),

  #[error("cannot decode stored value: {0}")]
  Decode(String),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Classify for Error {
  fn class(&self) -> ErrorClass {
    match self {
      Self::Core(e) => e.class(),
      Self::Conflict(_) => ErrorClass::Conflict,
      Self::Database(_) | Self::Decode(_) | Self::DateParse(_) => ErrorClass::Internal,
    }
  }
}
