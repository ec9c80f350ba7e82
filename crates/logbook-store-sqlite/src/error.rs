//! Error type for `logbook-store-sqlite`.

use logbook_core::{ParseError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] logbook_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column held a value the domain types cannot represent.
  #[error("corrupt row: {0}")]
  Decode(String),
}

impl From<ValidationError> for Error {
  fn from(e: ValidationError) -> Self { Self::Core(e.into()) }
}

impl From<ParseError> for Error {
  fn from(e: ParseError) -> Self { Self::Core(e.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
