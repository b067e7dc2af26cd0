//! File-backed Folio content store.
//!
//! Each collection lives in `<root>/<collection>.json` as a JSON array of
//! records; the admin credential record is the object in `admin.json`. Every
//! write replaces the whole file through a temp-file-and-rename, and a single
//! async lock serialises read-modify-write cycles within the process.

mod files;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{LocalStore, QuarantinedRecord};
