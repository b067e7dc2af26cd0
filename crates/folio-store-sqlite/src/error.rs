//! Error type for `folio-store-sqlite`.

use folio_core::{ErrorKind, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] folio_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl Error {
  /// Whether this is a primary-key clash on insert.
  pub(crate) fn is_unique_violation(&self) -> bool {
    let Error::Database(tokio_rusqlite::Error::Rusqlite(e)) = self else {
      return false;
    };
    e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation)
  }
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::Database(_) => ErrorKind::Unavailable,
      Error::Json(_) => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
