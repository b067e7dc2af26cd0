//! Seed/fallback loader — default documents and services.
//!
//! The loader only supplies data. Writing defaults into an empty collection
//! is the store's job; serving them read-only while the store is unreachable
//! is the [`Showcase`](crate::showcase::Showcase)'s.
//!
//! Payloads are decoded once per loader and cached for its lifetime. A
//! missing or unreadable payload yields an empty set, never an error.

use std::{
  path::PathBuf,
  sync::{Arc, LazyLock},
};

use tokio::sync::OnceCell;

use crate::model::{DocumentItem, Record, ServiceItem, decode_record};

/// File name of the default document payload.
pub const DOCUMENTS_PAYLOAD: &str = "initial-documents.json";
/// File name of the default service payload.
pub const SERVICES_PAYLOAD: &str = "initial-services.json";

const BUNDLED_DOCUMENTS: &str = include_str!("../seed/initial-documents.json");
const BUNDLED_SERVICES: &str = include_str!("../seed/initial-services.json");

static BUNDLED: LazyLock<Arc<SeedLoader>> =
  LazyLock::new(|| Arc::new(SeedLoader::new(SeedSource::Bundled)));

/// Where a [`SeedLoader`] reads its payloads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
  /// The payloads compiled into this crate.
  Bundled,
  /// A static-asset directory containing [`DOCUMENTS_PAYLOAD`] and
  /// [`SERVICES_PAYLOAD`].
  Dir(PathBuf),
  /// No defaults at all.
  Empty,
}

#[derive(Debug)]
pub struct SeedLoader {
  source:    SeedSource,
  documents: OnceCell<Vec<DocumentItem>>,
  services:  OnceCell<Vec<ServiceItem>>,
}

impl SeedLoader {
  pub fn new(source: SeedSource) -> Self {
    Self { source, documents: OnceCell::new(), services: OnceCell::new() }
  }

  /// The process-wide loader over the bundled payloads.
  pub fn bundled() -> Arc<SeedLoader> { Arc::clone(&BUNDLED) }

  /// A loader that never supplies anything — stores opened with it start
  /// empty.
  pub fn empty() -> Arc<SeedLoader> { Arc::new(Self::new(SeedSource::Empty)) }

  pub fn source(&self) -> &SeedSource { &self.source }

  /// The default document set.
  pub async fn load_default_documents(&self) -> Vec<DocumentItem> {
    self
      .documents
      .get_or_init(|| self.load(DOCUMENTS_PAYLOAD, BUNDLED_DOCUMENTS))
      .await
      .clone()
  }

  /// The default service set.
  pub async fn load_default_services(&self) -> Vec<ServiceItem> {
    self
      .services
      .get_or_init(|| self.load(SERVICES_PAYLOAD, BUNDLED_SERVICES))
      .await
      .clone()
  }

  async fn load<T: Record>(&self, file_name: &str, bundled: &str) -> Vec<T> {
    let raw = match &self.source {
      SeedSource::Bundled => bundled.to_owned(),
      SeedSource::Empty => return Vec::new(),
      SeedSource::Dir(dir) => {
        let path = dir.join(file_name);
        match tokio::fs::read_to_string(&path).await {
          Ok(raw) => raw,
          Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "seed payload unavailable");
            return Vec::new();
          }
        }
      }
    };
    let records = parse_payload(&raw);
    tracing::debug!(collection = %T::COLLECTION, count = records.len(), "loaded seed payload");
    records
  }
}

/// Decode a payload array, dropping records that fail validation.
fn parse_payload<T: Record>(raw: &str) -> Vec<T> {
  let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
    Ok(values) => values,
    Err(e) => {
      tracing::warn!(collection = %T::COLLECTION, error = %e, "malformed seed payload");
      return Vec::new();
    }
  };
  values
    .into_iter()
    .filter_map(|v| match decode_record::<T>(v) {
      Ok(record) => Some(record),
      Err(e) => {
        tracing::warn!(collection = %T::COLLECTION, error = %e, "dropping seed record");
        None
      }
    })
    .collect()
}
