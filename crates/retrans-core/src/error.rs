//! Error types for `retrans-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("affiliate not found: {0}")]
  AffiliateNotFound(i64),

  #[error("program not found: {0}")]
  ProgramNotFound(i64),

  #[error("transmission record not found: {0}")]
  RecordNotFound(i64),

  #[error("unknown weekday name: {0:?}")]
  UnknownWeekday(String),

  #[error("unknown deviation code: {0:?}")]
  UnknownDeviationCode(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse category of a failure, used by transport layers to pick a status
/// code without knowing the concrete backend error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
  /// Caller supplied bad or missing input.
  Validation,
  /// A referenced entity or reference row does not exist.
  NotFound,
  /// A uniqueness constraint was violated.
  Conflict,
  /// Anything else — storage faults, codec failures.
  Internal,
}

/// Implemented by every store error so `retrans-api` can stay generic over
/// the backend.
pub trait Classify {
  fn class(&self) -> ErrorClass;
}

impl Classify for Error {
  fn class(&self) -> ErrorClass {
    match self {
      Self::Validation(_) => ErrorClass::Validation,
      Self::AffiliateNotFound(_)
      | Self::ProgramNotFound(_)
      | Self::RecordNotFound(_)
      | Self::UnknownWeekday(_)
      | Self::UnknownDeviationCode(_) => ErrorClass::NotFound,
      Self::Serialization(_) => ErrorClass::Internal,
    }
  }
}
