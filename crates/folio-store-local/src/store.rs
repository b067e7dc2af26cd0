//! [`LocalStore`] — the file-backed implementation of [`ContentStore`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use folio_core::{
  Error as CoreError,
  collection::Collection,
  credentials::{AdminCredentials, StoredCredentials},
  model::{
    ContactMessage, DocumentItem, DocumentPatch, ItemStatus, MessageStatus,
    NewDocument, NewMessage, NewService, Record, ServiceItem, ServicePatch,
    decode_record, new_id, sort_newest_first,
  },
  seed::SeedLoader,
  store::ContentStore,
};

use crate::{
  Error, Result,
  files::{self, Contents},
};

/// A record moved out of its collection file because it failed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarantinedRecord {
  pub record_id:      String,
  pub body:           Value,
  pub reason:         String,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub quarantined_at: DateTime<Utc>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Folio content store kept as JSON files in one directory.
///
/// Cloning is cheap; clones share the directory lock.
#[derive(Clone)]
pub struct LocalStore {
  inner: Arc<Inner>,
}

struct Inner {
  root:  PathBuf,
  seeds: Arc<SeedLoader>,
  lock:  Mutex<()>,
}

impl LocalStore {
  /// Open a store rooted at `root`, creating the directory if needed.
  pub async fn open(root: impl Into<PathBuf>, seeds: Arc<SeedLoader>) -> Result<Self> {
    let root = root.into();
    tokio::fs::create_dir_all(&root)
      .await
      .map_err(Error::io(&root))?;
    tracing::debug!(root = %root.display(), "opened local store");
    Ok(Self { inner: Arc::new(Inner { root, seeds, lock: Mutex::new(()) }) })
  }

  pub fn root(&self) -> &Path { &self.inner.root }

  /// Records quarantined out of `collection`, oldest first.
  pub async fn quarantined(&self, collection: Collection) -> Result<Vec<QuarantinedRecord>> {
    let _guard = self.inner.lock.lock().await;
    let entries = self.read_quarantine(collection).await?;
    Ok(
      entries
        .into_iter()
        .filter_map(|v| match serde_json::from_value(v) {
          Ok(entry) => Some(entry),
          Err(e) => {
            tracing::warn!(collection = %collection, error = %e, "unreadable quarantine entry");
            None
          }
        })
        .collect(),
    )
  }

  fn path(&self, file: &str) -> PathBuf { self.inner.root.join(format!("{file}.json")) }

  fn quarantine_path(&self, collection: Collection) -> PathBuf {
    self.inner.root.join(format!("{collection}.quarantine.json"))
  }

  // ── Initialisation ──────────────────────────────────────────────────────

  async fn seed_values(&self, collection: Collection) -> Result<Vec<Value>> {
    fn to_values<T: Serialize>(records: &[T]) -> serde_json::Result<Vec<Value>> {
      records.iter().map(serde_json::to_value).collect()
    }

    Ok(match collection {
      Collection::Documents => to_values(&self.inner.seeds.load_default_documents().await)?,
      Collection::Services => to_values(&self.inner.seeds.load_default_services().await)?,
      Collection::Messages | Collection::Admin => Vec::new(),
    })
  }

  /// The raw field maps of a collection. The first access migrates the legacy
  /// file if there is one and seeds the defaults otherwise; either way the
  /// collection file exists afterwards, so an emptied collection stays empty.
  async fn load_raw(&self, collection: Collection) -> Result<Vec<Value>> {
    let path = self.path(collection.name());
    if let Some(values) = files::read_array(&path).await? {
      return Ok(values);
    }

    if let Some(legacy) = collection.legacy_name() {
      let legacy_path = self.path(legacy);
      if let Some(values) = files::read_array(&legacy_path).await? {
        files::write_json(&path, &values).await?;
        files::remove(&legacy_path).await?;
        tracing::info!(collection = %collection, records = values.len(), "migrated legacy collection");
        return Ok(values);
      }
    }

    let values = self.seed_values(collection).await?;
    files::write_json(&path, &values).await?;
    tracing::info!(collection = %collection, records = values.len(), "seeded collection");
    Ok(values)
  }

  // ── Generic record access ───────────────────────────────────────────────

  /// Every valid record of `T`'s collection, newest first. Invalid records
  /// are moved to the quarantine file. Callers hold the lock.
  async fn load_all<T: Record>(&self) -> Result<Vec<T>> {
    let values = self.load_raw(T::COLLECTION).await?;

    let mut records: Vec<T> = Vec::with_capacity(values.len());
    let mut rejected = Vec::new();
    for value in values {
      match decode_record::<T>(value.clone()) {
        Ok(record) if records.iter().any(|r| r.id() == record.id()) => {
          rejected.push((value, format!("duplicate id {:?}", record.id())));
        }
        Ok(record) => records.push(record),
        Err(e) => rejected.push((value, e.to_string())),
      }
    }
    if !rejected.is_empty() {
      self.quarantine(T::COLLECTION, rejected).await?;
      self.save(&records).await?;
    }

    sort_newest_first(&mut records);
    Ok(records)
  }

  async fn save<T: Record>(&self, records: &[T]) -> Result<()> {
    files::write_json(&self.path(T::COLLECTION.name()), records).await
  }

  /// Load, change one record in place, save. Returns the changed record.
  async fn modify<T, F>(&self, id: &str, change: F) -> Result<T>
  where
    T: Record,
    F: FnOnce(&mut T) -> folio_core::Result<()>,
  {
    let mut records: Vec<T> = self.load_all().await?;
    let record = records
      .iter_mut()
      .find(|r| r.id() == id)
      .ok_or_else(|| CoreError::not_found(T::COLLECTION, id))?;
    change(record)?;
    let updated = record.clone();
    self.save(&records).await?;
    Ok(updated)
  }

  async fn remove<T: Record>(&self, id: &str) -> Result<()> {
    let mut records: Vec<T> = self.load_all().await?;
    let before = records.len();
    records.retain(|r| r.id() != id);
    if records.len() == before {
      return Err(CoreError::not_found(T::COLLECTION, id).into());
    }
    self.save(&records).await
  }

  async fn create<T, B>(&self, build: B) -> Result<T>
  where
    T: Record,
    B: Fn(String) -> folio_core::Result<T>,
  {
    let mut records: Vec<T> = self.load_all().await?;
    let record = insert_fresh(&mut records, new_id, build)?;
    self.save(&records).await?;
    Ok(record)
  }

  // ── Quarantine ──────────────────────────────────────────────────────────

  /// Raw quarantine entries. Entries are appended, never rewritten, so one
  /// that no longer parses as a [`QuarantinedRecord`] is still kept.
  async fn read_quarantine(&self, collection: Collection) -> Result<Vec<Value>> {
    Ok(
      files::read_array(&self.quarantine_path(collection))
        .await?
        .unwrap_or_default(),
    )
  }

  async fn quarantine(&self, collection: Collection, rejected: Vec<(Value, String)>) -> Result<()> {
    let mut entries = self.read_quarantine(collection).await?;
    let now = Utc::now();
    for (body, reason) in rejected {
      let record_id = body
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
      tracing::warn!(
        collection = %collection,
        id = %record_id,
        reason = %reason,
        "quarantining malformed record"
      );
      entries.push(serde_json::to_value(QuarantinedRecord {
        record_id,
        body,
        reason,
        quarantined_at: now,
      })?);
    }
    files::write_json(&self.quarantine_path(collection), &entries).await
  }

  // ── Admin record ────────────────────────────────────────────────────────

  async fn write_admin(&self, creds: &StoredCredentials) -> Result<()> {
    files::write_json(&self.path(Collection::Admin.name()), creds).await
  }
}

/// Push a record built under a fresh id. An id already present is retried
/// once under a new id before giving up.
pub(crate) fn insert_fresh<T, G, B>(records: &mut Vec<T>, mut next_id: G, build: B) -> Result<T>
where
  T: Record,
  G: FnMut() -> String,
  B: Fn(String) -> folio_core::Result<T>,
{
  let taken = |records: &[T], id: &str| records.iter().any(|r| r.id() == id);

  let mut record = build(next_id())?;
  if taken(records, record.id()) {
    tracing::warn!(collection = %T::COLLECTION, id = record.id(), "id clash, regenerating");
    record = build(next_id())?;
    if taken(records, record.id()) {
      return Err(CoreError::DuplicateId(record.id().to_owned()).into());
    }
  }
  records.push(record.clone());
  Ok(record)
}

// ─── ContentStore impl ───────────────────────────────────────────────────────

impl ContentStore for LocalStore {
  type Error = crate::Error;

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn list_documents(&self) -> Result<Vec<DocumentItem>> {
    let _guard = self.inner.lock.lock().await;
    self.load_all().await
  }

  async fn get_document(&self, id: &str) -> Result<Option<DocumentItem>> {
    let _guard = self.inner.lock.lock().await;
    let docs: Vec<DocumentItem> = self.load_all().await?;
    Ok(docs.into_iter().find(|d| d.id == id))
  }

  async fn create_document(&self, input: NewDocument) -> Result<DocumentItem> {
    let _guard = self.inner.lock.lock().await;
    let doc = self
      .create(|id| input.clone().into_item(id, Utc::now()))
      .await?;
    tracing::debug!(id = %doc.id, "created document");
    Ok(doc)
  }

  async fn update_document(&self, id: &str, patch: DocumentPatch) -> Result<DocumentItem> {
    let _guard = self.inner.lock.lock().await;
    let doc = self
      .modify(id, |doc: &mut DocumentItem| doc.apply(patch))
      .await?;
    tracing::debug!(id, "updated document");
    Ok(doc)
  }

  async fn set_document_status(&self, id: &str, status: ItemStatus) -> Result<DocumentItem> {
    let _guard = self.inner.lock.lock().await;
    let doc = self
      .modify(id, |doc: &mut DocumentItem| {
        doc.status = doc.status.transition(status)?;
        Ok(())
      })
      .await?;
    tracing::debug!(id, status = %status, "set document status");
    Ok(doc)
  }

  async fn purge_document(&self, id: &str) -> Result<()> {
    let _guard = self.inner.lock.lock().await;
    self.remove::<DocumentItem>(id).await?;
    tracing::info!(id, "purged document");
    Ok(())
  }

  // ── Services ──────────────────────────────────────────────────────────────

  async fn list_services(&self) -> Result<Vec<ServiceItem>> {
    let _guard = self.inner.lock.lock().await;
    self.load_all().await
  }

  async fn get_service(&self, id: &str) -> Result<Option<ServiceItem>> {
    let _guard = self.inner.lock.lock().await;
    let services: Vec<ServiceItem> = self.load_all().await?;
    Ok(services.into_iter().find(|s| s.id == id))
  }

  async fn create_service(&self, input: NewService) -> Result<ServiceItem> {
    let _guard = self.inner.lock.lock().await;
    let service = self
      .create(|id| input.clone().into_item(id, Utc::now()))
      .await?;
    tracing::debug!(id = %service.id, "created service");
    Ok(service)
  }

  async fn update_service(&self, id: &str, patch: ServicePatch) -> Result<ServiceItem> {
    let _guard = self.inner.lock.lock().await;
    let service = self
      .modify(id, |service: &mut ServiceItem| service.apply(patch))
      .await?;
    tracing::debug!(id, "updated service");
    Ok(service)
  }

  async fn delete_service(&self, id: &str) -> Result<()> {
    let _guard = self.inner.lock.lock().await;
    self.remove::<ServiceItem>(id).await?;
    tracing::info!(id, "deleted service");
    Ok(())
  }

  // ── Messages ──────────────────────────────────────────────────────────────

  async fn list_messages(&self) -> Result<Vec<ContactMessage>> {
    let _guard = self.inner.lock.lock().await;
    self.load_all().await
  }

  async fn get_message(&self, id: &str) -> Result<Option<ContactMessage>> {
    let _guard = self.inner.lock.lock().await;
    let messages: Vec<ContactMessage> = self.load_all().await?;
    Ok(messages.into_iter().find(|m| m.id == id))
  }

  async fn create_message(&self, input: NewMessage) -> Result<ContactMessage> {
    let _guard = self.inner.lock.lock().await;
    let msg = self
      .create(|id| input.clone().into_message(id, Utc::now()))
      .await?;
    tracing::info!(id = %msg.id, "received contact message");
    Ok(msg)
  }

  async fn set_message_status(&self, id: &str, status: MessageStatus) -> Result<ContactMessage> {
    let _guard = self.inner.lock.lock().await;
    let msg = self
      .modify(id, |msg: &mut ContactMessage| {
        msg.status = msg.status.transition(status)?;
        Ok(())
      })
      .await?;
    tracing::debug!(id, status = %status, "set message status");
    Ok(msg)
  }

  async fn delete_message(&self, id: &str) -> Result<()> {
    let _guard = self.inner.lock.lock().await;
    self.remove::<ContactMessage>(id).await?;
    tracing::info!(id, "deleted message");
    Ok(())
  }

  // ── Admin credentials ─────────────────────────────────────────────────────

  async fn get_admin_credentials(&self) -> Result<StoredCredentials> {
    let _guard = self.inner.lock.lock().await;
    let path = self.path(Collection::Admin.name());

    match files::read(&path).await? {
      Contents::Json(value) => match StoredCredentials::from_stored(value.clone()) {
        Ok((creds, false)) => return Ok(creds),
        Ok((creds, true)) => {
          self.write_admin(&creds).await?;
          tracing::info!("upgraded plaintext admin credentials");
          return Ok(creds);
        }
        Err(e) => self.quarantine(Collection::Admin, vec![(value, e.to_string())]).await?,
      },
      Contents::Corrupt => {
        files::set_aside(&path).await?;
      }
      Contents::Missing => {}
    }

    let defaults = AdminCredentials::default_pair().hash()?;
    self.write_admin(&defaults).await?;
    tracing::info!("seeded default admin credentials");
    Ok(defaults)
  }

  async fn set_admin_credentials(&self, creds: AdminCredentials) -> Result<StoredCredentials> {
    let stored = creds.hash()?;
    let _guard = self.inner.lock.lock().await;
    self.write_admin(&stored).await?;
    tracing::info!(username = %stored.username, "replaced admin credentials");
    Ok(stored)
  }
}
