//! [`SqliteStore`] — the SQLite implementation of [`ContentStore`].

use std::{future::Future, path::Path, sync::Arc};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use folio_core::{
  Error as CoreError,
  collection::Collection,
  credentials::{AdminCredentials, CREDENTIALS_ID, StoredCredentials},
  model::{
    ContactMessage, DocumentItem, DocumentPatch, ItemStatus, MessageStatus,
    NewDocument, NewMessage, NewService, Record, ServiceItem, ServicePatch,
    new_id,
  },
  seed::SeedLoader,
  store::ContentStore,
};

use crate::{
  Result,
  encode::{EncodedRecord, RawRecord, encode_all, encode_dt, encode_record},
  schema::SCHEMA,
};

/// A record moved out of its collection because it failed validation.
#[derive(Debug, Clone)]
pub struct QuarantinedRecord {
  pub record_id: String,
  pub body:      String,
  pub reason:    String,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Folio content store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  seeds: Arc<SeedLoader>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, seeds: Arc<SeedLoader>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, seeds };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory(seeds: Arc<SeedLoader>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, seeds };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the connection. Every clone of this store fails afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Records quarantined out of `collection`, oldest first.
  pub async fn quarantined(&self, collection: Collection) -> Result<Vec<QuarantinedRecord>> {
    let name = collection.name();
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT record_id, body, reason FROM quarantine
           WHERE collection = ?1
           ORDER BY quarantined_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![name], |row| {
            Ok(QuarantinedRecord {
              record_id: row.get(0)?,
              body:      row.get(1)?,
              reason:    row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  // ── Initialisation ──────────────────────────────────────────────────────

  async fn is_initialized(&self, collection: Collection) -> Result<bool> {
    let name = collection.name();
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM collections WHERE name = ?1",
              rusqlite::params![name],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }

  /// Seed or migrate `T`'s collection if it has never been initialised.
  ///
  /// The check, the legacy move, the seed insert and the marker are a single
  /// transaction, so concurrent first reads cannot seed twice.
  async fn ensure_initialized<T, F, Fut>(&self, defaults: F) -> Result<()>
  where
    T: Record,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Vec<T>>,
  {
    let collection = T::COLLECTION;
    if self.is_initialized(collection).await? {
      return Ok(());
    }

    let seeds = encode_all(&defaults().await)?;
    let name = collection.name();
    let legacy = collection.legacy_name();
    let now = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let marked = tx
          .query_row(
            "SELECT 1 FROM collections WHERE name = ?1",
            rusqlite::params![name],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if marked {
          return Ok(Init::AlreadyDone);
        }

        let mut outcome = Init::Seeded(0);
        if let Some(legacy) = legacy {
          let moved = tx.execute(
            "UPDATE records SET collection = ?1 WHERE collection = ?2",
            rusqlite::params![name, legacy],
          )?;
          if moved > 0 {
            outcome = Init::Migrated(moved);
          }
        }

        if matches!(outcome, Init::Seeded(_)) {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO records (collection, record_id, created_at, body)
             VALUES (?1, ?2, ?3, ?4)",
          )?;
          let mut inserted = 0;
          for seed in &seeds {
            inserted += stmt.execute(rusqlite::params![
              name,
              seed.record_id,
              seed.created_at,
              seed.body,
            ])?;
          }
          drop(stmt);
          outcome = Init::Seeded(inserted);
        }

        tx.execute(
          "INSERT INTO collections (name, initialized_at) VALUES (?1, ?2)",
          rusqlite::params![name, now],
        )?;
        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    match outcome {
      Init::AlreadyDone => {}
      Init::Migrated(n) => {
        tracing::info!(collection = %collection, records = n, "migrated legacy collection")
      }
      Init::Seeded(n) => tracing::info!(collection = %collection, records = n, "seeded collection"),
    }
    Ok(())
  }

  async fn ensure_documents(&self) -> Result<()> {
    self
      .ensure_initialized(|| self.seeds.load_default_documents())
      .await
  }

  async fn ensure_services(&self) -> Result<()> {
    self
      .ensure_initialized(|| self.seeds.load_default_services())
      .await
  }

  async fn ensure_messages(&self) -> Result<()> {
    self
      .ensure_initialized(|| async { Vec::<ContactMessage>::new() })
      .await
  }

  // ── Generic record access ───────────────────────────────────────────────

  /// Every valid record of `T`'s collection, newest first. Invalid records
  /// are moved to quarantine.
  async fn load_all<T: Record>(&self) -> Result<Vec<T>> {
    let name = T::COLLECTION.name();
    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT record_id, body FROM records
           WHERE collection = ?1
           ORDER BY created_at DESC, record_id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![name], |row| {
            Ok(RawRecord { record_id: row.get(0)?, body: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut records = Vec::with_capacity(raws.len());
    let mut rejected = Vec::new();
    for raw in raws {
      match raw.decode::<T>() {
        Ok(record) => records.push(record),
        Err(e) => rejected.push((raw, e.to_string())),
      }
    }
    if !rejected.is_empty() {
      self.quarantine(T::COLLECTION, rejected).await?;
    }
    Ok(records)
  }

  async fn load_one<T: Record>(&self, id: &str) -> Result<Option<T>> {
    let name = T::COLLECTION.name();
    let id_str = id.to_owned();
    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT record_id, body FROM records WHERE collection = ?1 AND record_id = ?2",
              rusqlite::params![name, id_str],
              |row| Ok(RawRecord { record_id: row.get(0)?, body: row.get(1)? }),
            )
            .optional()?,
        )
      })
      .await?;

    let Some(raw) = raw else { return Ok(None) };
    match raw.decode::<T>() {
      Ok(record) => Ok(Some(record)),
      Err(e) => {
        let reason = e.to_string();
        self.quarantine(T::COLLECTION, vec![(raw, reason)]).await?;
        Ok(None)
      }
    }
  }

  /// Like [`Self::load_one`] but an absent record is a `NotFound` error.
  async fn require<T: Record>(&self, id: &str) -> Result<T> {
    self
      .load_one(id)
      .await?
      .ok_or_else(|| CoreError::not_found(T::COLLECTION, id).into())
  }

  async fn insert(&self, collection: Collection, rec: EncodedRecord) -> Result<()> {
    let name = collection.name();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO records (collection, record_id, created_at, body)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![name, rec.record_id, rec.created_at, rec.body],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Build a record under a freshly generated id and insert it. An id clash
  /// is retried once under a new id before giving up.
  pub(crate) async fn insert_fresh<T, G, B>(&self, mut next_id: G, build: B) -> Result<T>
  where
    T: Record,
    G: FnMut() -> String,
    B: Fn(String) -> folio_core::Result<T>,
  {
    let record = build(next_id())?;
    match self.insert(T::COLLECTION, encode_record(&record)?).await {
      Err(e) if e.is_unique_violation() => {
        tracing::warn!(collection = %T::COLLECTION, id = record.id(), "id clash, regenerating");
        let retry = build(next_id())?;
        match self.insert(T::COLLECTION, encode_record(&retry)?).await {
          Err(e) if e.is_unique_violation() => {
            Err(CoreError::DuplicateId(retry.id().to_owned()).into())
          }
          other => other.map(|()| retry),
        }
      }
      other => other.map(|()| record),
    }
  }

  async fn replace<T: Record>(&self, record: &T) -> Result<()> {
    let name = T::COLLECTION.name();
    let rec = encode_record(record)?;
    let record_id = rec.record_id.clone();
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE records SET body = ?3, created_at = ?4
           WHERE collection = ?1 AND record_id = ?2",
          rusqlite::params![name, rec.record_id, rec.body, rec.created_at],
        )?)
      })
      .await?;
    if changed == 0 {
      return Err(CoreError::not_found(T::COLLECTION, record_id).into());
    }
    Ok(())
  }

  async fn remove(&self, collection: Collection, id: &str) -> Result<()> {
    let name = collection.name();
    let id_str = id.to_owned();
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM records WHERE collection = ?1 AND record_id = ?2",
          rusqlite::params![name, id_str],
        )?)
      })
      .await?;
    if removed == 0 {
      return Err(CoreError::not_found(collection, id).into());
    }
    Ok(())
  }

  /// Move rejected rows out of `records` in one transaction.
  async fn quarantine(
    &self,
    collection: Collection,
    rejected: Vec<(RawRecord, String)>,
  ) -> Result<()> {
    for (raw, reason) in &rejected {
      tracing::warn!(
        collection = %collection,
        id = %raw.record_id,
        reason = %reason,
        "quarantining malformed record"
      );
    }
    let name = collection.name();
    let now = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (raw, reason) in rejected {
          tx.execute(
            "INSERT INTO quarantine
               (quarantine_id, collection, record_id, body, reason, quarantined_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
              Uuid::new_v4().to_string(),
              name,
              raw.record_id,
              raw.body,
              reason,
              now,
            ],
          )?;
          tx.execute(
            "DELETE FROM records WHERE collection = ?1 AND record_id = ?2",
            rusqlite::params![name, raw.record_id],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Admin record ────────────────────────────────────────────────────────

  async fn load_admin_raw(&self) -> Result<Option<RawRecord>> {
    let name = Collection::Admin.name();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT record_id, body FROM records WHERE collection = ?1 AND record_id = ?2",
              rusqlite::params![name, CREDENTIALS_ID],
              |row| Ok(RawRecord { record_id: row.get(0)?, body: row.get(1)? }),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }

  /// Write the credential record. With `only_if_absent` an existing record
  /// wins, which keeps concurrent first accesses from overwriting each other.
  async fn write_admin(&self, creds: &StoredCredentials, only_if_absent: bool) -> Result<()> {
    let name = Collection::Admin.name();
    let body = serde_json::to_string(creds)?;
    let created_at = Utc::now().timestamp_millis();
    let sql = if only_if_absent {
      "INSERT OR IGNORE INTO records (collection, record_id, created_at, body)
       VALUES (?1, ?2, ?3, ?4)"
    } else {
      "INSERT INTO records (collection, record_id, created_at, body)
       VALUES (?1, ?2, ?3, ?4)
       ON CONFLICT (collection, record_id)
       DO UPDATE SET body = excluded.body, created_at = excluded.created_at"
    };
    self
      .conn
      .call(move |conn| {
        conn.execute(sql, rusqlite::params![name, CREDENTIALS_ID, created_at, body])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// What [`SqliteStore::ensure_initialized`] did.
enum Init {
  AlreadyDone,
  Migrated(usize),
  Seeded(usize),
}

// ─── ContentStore impl ───────────────────────────────────────────────────────

impl ContentStore for SqliteStore {
  type Error = crate::Error;

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn list_documents(&self) -> Result<Vec<DocumentItem>> {
    self.ensure_documents().await?;
    self.load_all().await
  }

  async fn get_document(&self, id: &str) -> Result<Option<DocumentItem>> {
    self.ensure_documents().await?;
    self.load_one(id).await
  }

  async fn create_document(&self, input: NewDocument) -> Result<DocumentItem> {
    self.ensure_documents().await?;
    let doc = self
      .insert_fresh(new_id, |id| input.clone().into_item(id, Utc::now()))
      .await?;
    tracing::debug!(id = %doc.id, "created document");
    Ok(doc)
  }

  async fn update_document(&self, id: &str, patch: DocumentPatch) -> Result<DocumentItem> {
    self.ensure_documents().await?;
    let mut doc: DocumentItem = self.require(id).await?;
    doc.apply(patch)?;
    self.replace(&doc).await?;
    tracing::debug!(id, "updated document");
    Ok(doc)
  }

  async fn set_document_status(&self, id: &str, status: ItemStatus) -> Result<DocumentItem> {
    self.ensure_documents().await?;
    let mut doc: DocumentItem = self.require(id).await?;
    doc.status = doc.status.transition(status)?;
    self.replace(&doc).await?;
    tracing::debug!(id, status = %status, "set document status");
    Ok(doc)
  }

  async fn purge_document(&self, id: &str) -> Result<()> {
    self.ensure_documents().await?;
    self.remove(Collection::Documents, id).await?;
    tracing::info!(id, "purged document");
    Ok(())
  }

  // ── Services ──────────────────────────────────────────────────────────────

  async fn list_services(&self) -> Result<Vec<ServiceItem>> {
    self.ensure_services().await?;
    self.load_all().await
  }

  async fn get_service(&self, id: &str) -> Result<Option<ServiceItem>> {
    self.ensure_services().await?;
    self.load_one(id).await
  }

  async fn create_service(&self, input: NewService) -> Result<ServiceItem> {
    self.ensure_services().await?;
    let service = self
      .insert_fresh(new_id, |id| input.clone().into_item(id, Utc::now()))
      .await?;
    tracing::debug!(id = %service.id, "created service");
    Ok(service)
  }

  async fn update_service(&self, id: &str, patch: ServicePatch) -> Result<ServiceItem> {
    self.ensure_services().await?;
    let mut service: ServiceItem = self.require(id).await?;
    service.apply(patch)?;
    self.replace(&service).await?;
    tracing::debug!(id, "updated service");
    Ok(service)
  }

  async fn delete_service(&self, id: &str) -> Result<()> {
    self.ensure_services().await?;
    self.remove(Collection::Services, id).await?;
    tracing::info!(id, "deleted service");
    Ok(())
  }

  // ── Messages ──────────────────────────────────────────────────────────────

  async fn list_messages(&self) -> Result<Vec<ContactMessage>> {
    self.ensure_messages().await?;
    self.load_all().await
  }

  async fn get_message(&self, id: &str) -> Result<Option<ContactMessage>> {
    self.ensure_messages().await?;
    self.load_one(id).await
  }

  async fn create_message(&self, input: NewMessage) -> Result<ContactMessage> {
    self.ensure_messages().await?;
    let msg = self
      .insert_fresh(new_id, |id| input.clone().into_message(id, Utc::now()))
      .await?;
    tracing::info!(id = %msg.id, "received contact message");
    Ok(msg)
  }

  async fn set_message_status(&self, id: &str, status: MessageStatus) -> Result<ContactMessage> {
    self.ensure_messages().await?;
    let mut msg: ContactMessage = self.require(id).await?;
    msg.status = msg.status.transition(status)?;
    self.replace(&msg).await?;
    tracing::debug!(id, status = %status, "set message status");
    Ok(msg)
  }

  async fn delete_message(&self, id: &str) -> Result<()> {
    self.ensure_messages().await?;
    self.remove(Collection::Messages, id).await?;
    tracing::info!(id, "deleted message");
    Ok(())
  }

  // ── Admin credentials ─────────────────────────────────────────────────────

  async fn get_admin_credentials(&self) -> Result<StoredCredentials> {
    if let Some(raw) = self.load_admin_raw().await? {
      let decoded = serde_json::from_str(&raw.body)
        .map_err(|e| CoreError::Validation(format!("unparseable body: {e}")))
        .and_then(StoredCredentials::from_stored);
      match decoded {
        Ok((creds, false)) => return Ok(creds),
        Ok((creds, true)) => {
          self.write_admin(&creds, false).await?;
          tracing::info!("upgraded plaintext admin credentials");
          return Ok(creds);
        }
        Err(e) => {
          self.quarantine(Collection::Admin, vec![(raw, e.to_string())]).await?;
        }
      }
    }

    let defaults = AdminCredentials::default_pair().hash()?;
    self.write_admin(&defaults, true).await?;
    tracing::info!("seeded default admin credentials");

    let raw = self
      .load_admin_raw()
      .await?
      .ok_or_else(|| CoreError::not_found(Collection::Admin, CREDENTIALS_ID))?;
    let value = serde_json::from_str(&raw.body)?;
    Ok(StoredCredentials::from_stored(value)?.0)
  }

  async fn set_admin_credentials(&self, creds: AdminCredentials) -> Result<StoredCredentials> {
    let stored = creds.hash()?;
    self.write_admin(&stored, false).await?;
    tracing::info!(username = %stored.username, "replaced admin credentials");
    Ok(stored)
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Write a row verbatim, bypassing validation.
  pub(crate) async fn insert_raw(
    &self,
    collection: &'static str,
    record_id: &str,
    created_at: i64,
    body: &str,
  ) -> Result<()> {
    let record_id = record_id.to_owned();
    let body = body.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO records (collection, record_id, created_at, body)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![collection, record_id, created_at, body],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub(crate) async fn count_rows(&self, collection: &'static str) -> Result<usize> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM records WHERE collection = ?1",
          rusqlite::params![collection],
          |row| row.get::<_, i64>(0),
        )?)
      })
      .await?;
    Ok(n as usize)
  }
}
