//! The `ContentStore` trait.
//!
//! The trait is implemented by storage backends (`folio-store-sqlite`,
//! `folio-store-local`). Higher layers (`folio-api`, the showcase) depend on
//! this abstraction, never on a concrete backend; the binary picks the
//! implementation at startup.
//!
//! Every operation may fail and every operation is asynchronous, whatever the
//! backend does internally. Mutations are durable when their future resolves.

use std::future::Future;

use crate::{
  Error, StoreError,
  collection::Collection,
  credentials::{AdminCredentials, StoredCredentials},
  model::{
    Category, ContactMessage, DocumentItem, DocumentPatch, ItemStatus,
    MessageStatus, NewDocument, NewMessage, NewService, ServiceItem,
    ServicePatch,
  },
};

/// Abstraction over a Folio content store backend.
///
/// Reads of a collection that has never been initialised seed it from the
/// store's [`SeedLoader`](crate::seed::SeedLoader) (or migrate legacy data)
/// exactly once. Records failing validation are quarantined out of read
/// results. Mutations of an absent id fail with a `NotFound`-kind error.
pub trait ContentStore: Send + Sync {
  type Error: StoreError + From<Error>;

  // ── Documents ─────────────────────────────────────────────────────────

  /// All documents regardless of status, newest first.
  fn list_documents(
    &self,
  ) -> impl Future<Output = Result<Vec<DocumentItem>, Self::Error>> + Send + '_;

  /// Retrieve a document by id. Returns `None` if not found.
  fn get_document<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<DocumentItem>, Self::Error>> + Send + 'a;

  /// Persist a new document. The store assigns a fresh id and the creation
  /// time; the status is always `Visible`.
  fn create_document(
    &self,
    input: NewDocument,
  ) -> impl Future<Output = Result<DocumentItem, Self::Error>> + Send + '_;

  /// Update content fields of an existing document.
  fn update_document<'a>(
    &'a self,
    id: &'a str,
    patch: DocumentPatch,
  ) -> impl Future<Output = Result<DocumentItem, Self::Error>> + Send + 'a;

  /// Hide, show, soft-delete or restore a document.
  ///
  /// Fails with an `InvalidTransition`-kind error when the lifecycle forbids
  /// the move (see [`ItemStatus::can_transition_to`]).
  fn set_document_status<'a>(
    &'a self,
    id: &'a str,
    status: ItemStatus,
  ) -> impl Future<Output = Result<DocumentItem, Self::Error>> + Send + 'a;

  /// Physically remove a document. Irreversible.
  fn purge_document<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Documents with `Visible` status, newest first.
  fn list_visible_documents(
    &self,
  ) -> impl Future<Output = Result<Vec<DocumentItem>, Self::Error>> + Send + '_ {
    async move {
      let mut docs = self.list_documents().await?;
      docs.retain(|d| d.status.is_visible());
      Ok(docs)
    }
  }

  /// Visible documents of one category, newest first.
  fn list_documents_by_category(
    &self,
    category: Category,
  ) -> impl Future<Output = Result<Vec<DocumentItem>, Self::Error>> + Send + '_ {
    async move {
      let mut docs = self.list_visible_documents().await?;
      docs.retain(|d| d.category == category);
      Ok(docs)
    }
  }

  // ── Services ──────────────────────────────────────────────────────────

  fn list_services(
    &self,
  ) -> impl Future<Output = Result<Vec<ServiceItem>, Self::Error>> + Send + '_;

  fn get_service<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<ServiceItem>, Self::Error>> + Send + 'a;

  fn create_service(
    &self,
    input: NewService,
  ) -> impl Future<Output = Result<ServiceItem, Self::Error>> + Send + '_;

  fn update_service<'a>(
    &'a self,
    id: &'a str,
    patch: ServicePatch,
  ) -> impl Future<Output = Result<ServiceItem, Self::Error>> + Send + 'a;

  /// Remove a service. Services have no soft-delete state.
  fn delete_service<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Messages ──────────────────────────────────────────────────────────

  fn list_messages(
    &self,
  ) -> impl Future<Output = Result<Vec<ContactMessage>, Self::Error>> + Send + '_;

  fn get_message<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<ContactMessage>, Self::Error>> + Send + 'a;

  /// Record a visitor's submission. Always created `Unread`.
  fn create_message(
    &self,
    input: NewMessage,
  ) -> impl Future<Output = Result<ContactMessage, Self::Error>> + Send + '_;

  /// Explicit status change by an operator (reply, mark unread, ...).
  fn set_message_status<'a>(
    &'a self,
    id: &'a str,
    status: MessageStatus,
  ) -> impl Future<Output = Result<ContactMessage, Self::Error>> + Send + 'a;

  fn delete_message<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// The admin opened a message: mark it read if it was unread. A read or
  /// replied message is returned unchanged.
  fn open_message<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<ContactMessage, Self::Error>> + Send + 'a {
    async move {
      let msg = self
        .get_message(id)
        .await?
        .ok_or_else(|| Error::not_found(Collection::Messages, id))?;
      let next = msg.status.on_open();
      if next == msg.status {
        return Ok(msg);
      }
      self.set_message_status(id, next).await
    }
  }

  // ── Admin credentials ─────────────────────────────────────────────────

  /// The current credential record, seeding the default pair on first
  /// access.
  fn get_admin_credentials(
    &self,
  ) -> impl Future<Output = Result<StoredCredentials, Self::Error>> + Send + '_;

  /// Replace the credential record wholesale.
  fn set_admin_credentials(
    &self,
    creds: AdminCredentials,
  ) -> impl Future<Output = Result<StoredCredentials, Self::Error>> + Send + '_;
}
