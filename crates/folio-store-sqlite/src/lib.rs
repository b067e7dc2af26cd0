//! SQLite backend for the Folio content store.
//!
//! Records are kept document-database style: one `records` table of flat
//! JSON field maps keyed by collection and id. Wraps [`tokio_rusqlite`] so
//! all database access runs on a dedicated thread without blocking the async
//! runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{QuarantinedRecord, SqliteStore};

#[cfg(test)]
mod tests;
