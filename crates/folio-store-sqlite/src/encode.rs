//! Encoding and decoding between typed records and the rows of the
//! `records` table.
//!
//! Bodies are compact JSON field maps in exactly the storage format of the
//! entity model. `created_at` is duplicated into its own column so listing
//! can be ordered in SQL.

use chrono::{DateTime, Utc};
use folio_core::{
  Error as CoreError,
  model::{Record, decode_record},
};

use crate::Result;

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── Records ─────────────────────────────────────────────────────────────────

/// A record ready to be written.
pub struct EncodedRecord {
  pub record_id:  String,
  pub created_at: i64,
  pub body:       String,
}

pub fn encode_record<T: Record>(record: &T) -> Result<EncodedRecord> {
  Ok(EncodedRecord {
    record_id:  record.id().to_owned(),
    created_at: record.created_at().timestamp_millis(),
    body:       serde_json::to_string(record)?,
  })
}

pub fn encode_all<T: Record>(records: &[T]) -> Result<Vec<EncodedRecord>> {
  records.iter().map(encode_record).collect()
}

/// Raw strings read directly from a `records` row.
pub struct RawRecord {
  pub record_id: String,
  pub body:      String,
}

impl RawRecord {
  /// Decode the body, failing with a validation error if it is not a
  /// well-formed record or disagrees with its row key.
  pub fn decode<T: Record>(&self) -> Result<T, CoreError> {
    let value: serde_json::Value = serde_json::from_str(&self.body)
      .map_err(|e| CoreError::Validation(format!("unparseable body: {e}")))?;
    let record: T = decode_record(value)?;
    if record.id() != self.record_id {
      return Err(CoreError::Validation(format!(
        "body id {:?} does not match row id {:?}",
        record.id(),
        self.record_id
      )));
    }
    Ok(record)
  }
}
