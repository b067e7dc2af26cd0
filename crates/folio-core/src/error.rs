//! Error types for `folio-core`.

use thiserror::Error;

use crate::collection::Collection;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{collection} record not found: {id}")]
  NotFound { collection: Collection, id: String },

  #[error("invalid record: {0}")]
  Validation(String),

  #[error("cannot move from {from} to {to}")]
  InvalidTransition { from: &'static str, to: &'static str },

  #[error("id {0} already exists")]
  DuplicateId(String),

  #[error("backend unavailable: {0}")]
  Unavailable(String),

  #[error("password hashing failed: {0}")]
  Credentials(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn not_found(collection: Collection, id: impl Into<String>) -> Self {
    Self::NotFound { collection, id: id.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Backend-agnostic classification of a store failure.
///
/// Callers decide their recovery policy from the kind alone: shape problems
/// are recovered locally, connectivity problems are surfaced or degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Validation,
  InvalidTransition,
  /// The backing persistence could not be reached, timed out, or kept
  /// producing id clashes.
  Unavailable,
  Internal,
}

/// Implemented by every backend error type so generic callers can classify
/// failures without knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> ErrorKind;

  fn is_unavailable(&self) -> bool { self.kind() == ErrorKind::Unavailable }
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::NotFound { .. } => ErrorKind::NotFound,
      Error::Validation(_) => ErrorKind::Validation,
      Error::InvalidTransition { .. } => ErrorKind::InvalidTransition,
      Error::DuplicateId(_) | Error::Unavailable(_) => ErrorKind::Unavailable,
      Error::Credentials(_) | Error::Serialization(_) => ErrorKind::Internal,
    }
  }
}
