//! Entity model — the records owned by the content store.
//!
//! Every record serializes as a flat field map with camelCase keys and a
//! millisecond `createdAt`. Enum tags (`"visible"`, `"Diploma"`, `"unread"`,
//! ...) are part of the storage format and must not be renamed without a
//! migration.

use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result, collection::Collection};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// What kind of credential a [`DocumentItem`] shows.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, EnumIter, IntoStaticStr,
)]
pub enum Category {
  #[serde(rename = "Diploma")]
  #[strum(to_string = "Diploma")]
  Diploma,
  #[serde(rename = "Sertifikat", alias = "Certificate")]
  #[strum(to_string = "Sertifikat", serialize = "Certificate")]
  Certificate,
}

/// Visibility of a [`DocumentItem`]. `Deleted` is a soft delete.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemStatus {
  Visible,
  Hidden,
  Deleted,
}

/// Where a [`ContactMessage`] is in the admin's inbox workflow.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageStatus {
  Unread,
  Read,
  Replied,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A displayed credential (diploma or certificate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentItem {
  pub id:          String,
  pub title:       String,
  #[serde(default)]
  pub description: String,
  pub image_url:   String,
  pub category:    Category,
  pub status:      ItemStatus,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub created_at:  DateTime<Utc>,
}

/// A catalog entry describing an offered service. Services have no status;
/// deleting one removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
  pub id:          String,
  pub title:       String,
  pub description: String,
  pub image_url:   String,
  /// Promotional badges, in display order.
  #[serde(default)]
  pub highlights:  Vec<String>,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub created_at:  DateTime<Utc>,
}

/// An inbound message from a visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
  pub id:         String,
  pub name:       String,
  pub email:      String,
  #[serde(default)]
  pub subject:    String,
  pub message:    String,
  pub status:     MessageStatus,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub created_at: DateTime<Utc>,
}

// ─── Record trait ────────────────────────────────────────────────────────────

/// Ties an entity to its collection so backends can store every kind of
/// record through the same code path.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
  const COLLECTION: Collection;

  fn id(&self) -> &str;

  fn created_at(&self) -> DateTime<Utc>;

  /// Check required fields. A stored record failing this is quarantined.
  fn validate(&self) -> Result<()>;
}

impl Record for DocumentItem {
  const COLLECTION: Collection = Collection::Documents;

  fn id(&self) -> &str { &self.id }

  fn created_at(&self) -> DateTime<Utc> { self.created_at }

  fn validate(&self) -> Result<()> {
    require("id", &self.id)?;
    require("title", &self.title)?;
    require("imageUrl", &self.image_url)
  }
}

impl Record for ServiceItem {
  const COLLECTION: Collection = Collection::Services;

  fn id(&self) -> &str { &self.id }

  fn created_at(&self) -> DateTime<Utc> { self.created_at }

  fn validate(&self) -> Result<()> {
    require("id", &self.id)?;
    require("title", &self.title)?;
    require("description", &self.description)?;
    require("imageUrl", &self.image_url)
  }
}

impl Record for ContactMessage {
  const COLLECTION: Collection = Collection::Messages;

  fn id(&self) -> &str { &self.id }

  fn created_at(&self) -> DateTime<Utc> { self.created_at }

  fn validate(&self) -> Result<()> {
    require("id", &self.id)?;
    require("name", &self.name)?;
    require_email(&self.email)?;
    require("message", &self.message)
  }
}

/// Decode a stored field map into a typed record, rejecting anything with a
/// missing, mistyped or blank required field.
pub fn decode_record<T: Record>(value: serde_json::Value) -> Result<T> {
  let record: T = serde_json::from_value(value)
    .map_err(|e| Error::Validation(format!("{}: {e}", T::COLLECTION)))?;
  record.validate()?;
  Ok(record)
}

/// Sort newest first. Ties are broken by id so repeated reads are stable.
pub fn sort_newest_first<T: Record>(records: &mut [T]) {
  records.sort_by(|a, b| {
    b.created_at()
      .cmp(&a.created_at())
      .then_with(|| a.id().cmp(b.id()))
  });
}

/// Generate a fresh record id.
pub fn new_id() -> String { Uuid::new_v4().to_string() }

fn require(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Validation(format!("{field} is required")));
  }
  Ok(())
}

fn require_email(value: &str) -> Result<()> {
  require("email", value)?;
  if !value.contains('@') {
    return Err(Error::Validation(format!("{value:?} is not an email address")));
  }
  Ok(())
}

/// `createdAt` is stored in whole milliseconds; new records start there so
/// the returned record equals the one read back.
fn stored_time(at: DateTime<Utc>) -> DateTime<Utc> { at.trunc_subsecs(3) }

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Fields supplied when creating a document. The store assigns the id, the
/// creation time, and the initial `Visible` status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
  pub title:       String,
  #[serde(default)]
  pub description: String,
  pub image_url:   String,
  pub category:    Category,
}

impl NewDocument {
  pub fn into_item(self, id: String, created_at: DateTime<Utc>) -> Result<DocumentItem> {
    let item = DocumentItem {
      id,
      title: self.title.trim().to_owned(),
      description: self.description,
      image_url: self.image_url.trim().to_owned(),
      category: self.category,
      status: ItemStatus::Visible,
      created_at: stored_time(created_at),
    };
    item.validate()?;
    Ok(item)
  }
}

/// A partial update to a document's content fields. Status changes go
/// through their own operation so lifecycle rules apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub image_url:   Option<String>,
  pub category:    Option<Category>,
}

impl DocumentItem {
  /// Apply `patch` in place. The record is left untouched if the result
  /// would be invalid.
  pub fn apply(&mut self, patch: DocumentPatch) -> Result<()> {
    let mut next = self.clone();
    if let Some(title) = patch.title {
      next.title = title.trim().to_owned();
    }
    if let Some(description) = patch.description {
      next.description = description;
    }
    if let Some(image_url) = patch.image_url {
      next.image_url = image_url.trim().to_owned();
    }
    if let Some(category) = patch.category {
      next.category = category;
    }
    next.validate()?;
    *self = next;
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
  pub title:       String,
  pub description: String,
  pub image_url:   String,
  #[serde(default)]
  pub highlights:  Vec<String>,
}

impl NewService {
  pub fn into_item(self, id: String, created_at: DateTime<Utc>) -> Result<ServiceItem> {
    let item = ServiceItem {
      id,
      title: self.title.trim().to_owned(),
      description: self.description,
      image_url: self.image_url.trim().to_owned(),
      highlights: normalize_highlights(self.highlights),
      created_at: stored_time(created_at),
    };
    item.validate()?;
    Ok(item)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub image_url:   Option<String>,
  pub highlights:  Option<Vec<String>>,
}

impl ServiceItem {
  pub fn apply(&mut self, patch: ServicePatch) -> Result<()> {
    let mut next = self.clone();
    if let Some(title) = patch.title {
      next.title = title.trim().to_owned();
    }
    if let Some(description) = patch.description {
      next.description = description;
    }
    if let Some(image_url) = patch.image_url {
      next.image_url = image_url.trim().to_owned();
    }
    if let Some(highlights) = patch.highlights {
      next.highlights = normalize_highlights(highlights);
    }
    next.validate()?;
    *self = next;
    Ok(())
  }
}

/// Trim every highlight and drop the blank ones, keeping order.
pub fn normalize_highlights(highlights: Vec<String>) -> Vec<String> {
  highlights
    .into_iter()
    .map(|h| h.trim().to_owned())
    .filter(|h| !h.is_empty())
    .collect()
}

/// A public contact-form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
  pub name:    String,
  pub email:   String,
  #[serde(default)]
  pub subject: String,
  pub message: String,
}

impl NewMessage {
  pub fn into_message(self, id: String, created_at: DateTime<Utc>) -> Result<ContactMessage> {
    let msg = ContactMessage {
      id,
      name: self.name.trim().to_owned(),
      email: self.email.trim().to_owned(),
      subject: self.subject.trim().to_owned(),
      message: self.message,
      status: MessageStatus::Unread,
      created_at: stored_time(created_at),
    };
    msg.validate()?;
    Ok(msg)
  }
}
