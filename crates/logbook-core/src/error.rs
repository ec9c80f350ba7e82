//! Error types for `logbook-core`.
//!
//! Every failure in the core is a value. [`ParseError`] comes from the
//! temporal-string codec, [`ValidationError`] from operator input and the
//! deduction workflow, and [`Error`] wraps both alongside the lifecycle
//! errors raised by archive/restore/delete.

use thiserror::Error;
use uuid::Uuid;

use crate::document::Direction;

/// A display, storage, or ISO timestamp string that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  #[error("No input provided")]
  Empty,

  #[error("Incorrect format. Example: \"June 12, 2025 at 10:30 AM\"")]
  Shape,

  #[error("February only has {max} days in {year}.")]
  FebruaryDays { max: u32, year: i32 },

  #[error("{month} only has {max} days.")]
  MonthDays { month: &'static str, max: u32 },

  #[error("Hour must be between 1 and 12.")]
  Hour(u32),

  #[error("Minute must be between 00 and 59.")]
  Minute(u32),

  #[error("expected \"YYYY-MM-DD HH:MM:SS\", got {0:?}")]
  Storage(String),

  #[error("unknown time zone {0:?}")]
  UnknownTimeZone(String),

  #[error("unrecognised timestamp {0:?}")]
  Unrecognised(String),
}

/// Operator input that the core refuses to persist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("Deducted days is required")]
  DeductedDaysRequired,

  #[error("Must be a valid number")]
  NotANumber(String),

  #[error("Cannot be negative")]
  NegativeDeduction,

  #[error("Processing days cannot be negative. Reduce the deducted days.")]
  NegativeProcessingDays,

  #[error("Processing days cannot be zero. Reduce the deducted days.")]
  ZeroProcessingDays,

  #[error("Remarks are required")]
  RemarksRequired,

  #[error("document has not been released yet")]
  NotReleased,

  #[error("invalid release date: {0}")]
  ReleaseDate(#[source] ParseError),

  #[error("sent date must fall in years 0 to 9999, got {0}")]
  SentYearOutOfRange(i32),

  /// A routing edit on an incoming document, or an incoming edit on an
  /// outgoing one.
  #[error("this edit does not apply to {0} documents")]
  WrongDirection(Direction),
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("document not found: {0}")]
  DocumentNotFound(Uuid),

  #[error("document {0} is already archived")]
  AlreadyArchived(Uuid),

  #[error("document {0} is not archived")]
  NotArchived(Uuid),

  #[error(transparent)]
  Parse(#[from] ParseError),

  #[error(transparent)]
  Validation(#[from] ValidationError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
