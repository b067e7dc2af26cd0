//! Integration tests for `SqliteStore` against an in-memory database.

use std::{collections::HashSet, sync::Arc};

use folio_core::{
  ErrorKind, StoreError as _,
  collection::Collection,
  credentials::AdminCredentials,
  model::{
    Category, DocumentItem, DocumentPatch, ItemStatus, MessageStatus,
    NewDocument, NewMessage, NewService, ServiceItem, ServicePatch,
  },
  seed::SeedLoader,
  session::Session,
  showcase::Showcase,
  store::ContentStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory(SeedLoader::bundled())
    .await
    .expect("in-memory store")
}

async fn empty_store() -> SqliteStore {
  SqliteStore::open_in_memory(SeedLoader::empty())
    .await
    .expect("in-memory store")
}

fn new_doc(title: &str, category: Category) -> NewDocument {
  NewDocument {
    title:       title.into(),
    description: "desc".into(),
    image_url:   "https://example.com/img.png".into(),
    category,
  }
}

fn new_message() -> NewMessage {
  NewMessage {
    name:    "Leyla".into(),
    email:   "leyla@example.com".into(),
    subject: "Diploma print".into(),
    message: "How much for two copies?".into(),
  }
}

fn ids(docs: &[DocumentItem]) -> Vec<&str> { docs.iter().map(|d| d.id.as_str()).collect() }

fn ids_of_services(services: &[ServiceItem]) -> Vec<&str> {
  services.iter().map(|s| s.id.as_str()).collect()
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_collection_returns_seed_set() {
  let s = store().await;
  let defaults = SeedLoader::bundled().load_default_documents().await;

  let docs = s.list_documents().await.unwrap();
  assert_eq!(docs.len(), defaults.len());
  for d in &defaults {
    assert!(docs.contains(d));
  }
}

#[tokio::test]
async fn seeding_happens_once() {
  let s = store().await;
  let first = s.list_documents().await.unwrap();
  let second = s.list_documents().await.unwrap();
  assert_eq!(first, second);
  assert_eq!(s.count_rows("documents").await.unwrap(), first.len());
}

#[tokio::test]
async fn purged_collection_is_not_reseeded() {
  let s = store().await;
  for d in s.list_documents().await.unwrap() {
    s.purge_document(&d.id).await.unwrap();
  }
  assert!(s.list_documents().await.unwrap().is_empty());
  assert!(s.list_documents().await.unwrap().is_empty());
}

#[tokio::test]
async fn services_are_seeded_too() {
  let s = store().await;
  let services = s.list_services().await.unwrap();
  assert_eq!(services.len(), 2);
  assert_eq!(ids_of_services(&services), ["s1", "s2"]);
}

#[tokio::test]
async fn empty_loader_leaves_store_empty() {
  let s = empty_store().await;
  assert!(s.list_documents().await.unwrap().is_empty());
  assert!(s.list_services().await.unwrap().is_empty());
}

#[tokio::test]
async fn messages_start_empty() {
  let s = store().await;
  assert!(s.list_messages().await.unwrap().is_empty());
}

// ─── Legacy migration ────────────────────────────────────────────────────────

#[tokio::test]
async fn legacy_documents_are_migrated_once() {
  let s = store().await;
  s.insert_raw(
    "docs",
    "old1",
    10,
    r#"{"id":"old1","title":"Old","description":"","imageUrl":"u","category":"Diploma","status":"hidden","createdAt":10}"#,
  )
  .await
  .unwrap();

  let docs = s.list_documents().await.unwrap();
  assert_eq!(ids(&docs), ["old1"]);
  assert_eq!(docs[0].status, ItemStatus::Hidden);
  assert_eq!(s.count_rows("docs").await.unwrap(), 0);

  // No seeds were added alongside the migrated data.
  assert_eq!(s.list_documents().await.unwrap().len(), 1);
}

// ─── Quarantine ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_records_are_quarantined() {
  let s = store().await;
  s.list_documents().await.unwrap();

  s.insert_raw("documents", "bad1", 99, r#"{"id":"bad1","title":"No image"}"#)
    .await
    .unwrap();
  s.insert_raw("documents", "bad2", 98, "not json at all").await.unwrap();

  let docs = s.list_documents().await.unwrap();
  assert_eq!(docs.len(), 2);
  assert!(!ids(&docs).contains(&"bad1"));

  let quarantined = s.quarantined(Collection::Documents).await.unwrap();
  let q_ids: HashSet<_> = quarantined.iter().map(|q| q.record_id.as_str()).collect();
  assert_eq!(q_ids, HashSet::from(["bad1", "bad2"]));
  assert_eq!(s.count_rows("documents").await.unwrap(), 2);
}

#[tokio::test]
async fn get_of_malformed_record_returns_none() {
  let s = store().await;
  s.list_services().await.unwrap();
  s.insert_raw("services", "x", 1, r#"{"id":"x","title":"t","description":"","imageUrl":"u","createdAt":1}"#)
    .await
    .unwrap();

  assert!(s.get_service("x").await.unwrap().is_none());
  assert_eq!(s.quarantined(Collection::Services).await.unwrap().len(), 1);
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn created_document_is_visible_and_listed() {
  let s = store().await;
  let doc = s
    .create_document(new_doc("Master's degree", Category::Diploma))
    .await
    .unwrap();
  assert_eq!(doc.status, ItemStatus::Visible);

  let all = s.list_documents().await.unwrap();
  assert_eq!(all[0].id, doc.id, "newest first");
  assert!(s.list_visible_documents().await.unwrap().contains(&doc));
  assert_eq!(s.get_document(&doc.id).await.unwrap(), Some(doc));
}

#[tokio::test]
async fn created_ids_are_unique() {
  let s = empty_store().await;
  let mut seen = HashSet::new();
  for i in 0..20 {
    let doc = s
      .create_document(new_doc(&format!("Doc {i}"), Category::Certificate))
      .await
      .unwrap();
    assert!(seen.insert(doc.id));
  }
}

#[tokio::test]
async fn create_rejects_blank_title() {
  let s = store().await;
  let err = s.create_document(new_doc("  ", Category::Diploma)).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn hidden_document_leaves_visible_listing_only() {
  let s = store().await;
  let doc = s.create_document(new_doc("Cert", Category::Certificate)).await.unwrap();

  s.set_document_status(&doc.id, ItemStatus::Hidden).await.unwrap();

  assert!(!ids(&s.list_visible_documents().await.unwrap()).contains(&doc.id.as_str()));
  assert!(ids(&s.list_documents().await.unwrap()).contains(&doc.id.as_str()));
}

#[tokio::test]
async fn soft_delete_then_purge() {
  let s = store().await;
  let doc = s.create_document(new_doc("Cert", Category::Certificate)).await.unwrap();

  s.set_document_status(&doc.id, ItemStatus::Deleted).await.unwrap();
  assert!(!ids(&s.list_visible_documents().await.unwrap()).contains(&doc.id.as_str()));
  assert!(ids(&s.list_documents().await.unwrap()).contains(&doc.id.as_str()));

  s.purge_document(&doc.id).await.unwrap();
  assert!(!ids(&s.list_documents().await.unwrap()).contains(&doc.id.as_str()));
}

#[tokio::test]
async fn deleted_document_can_be_restored_but_not_hidden() {
  let s = store().await;
  let doc = s.create_document(new_doc("Cert", Category::Certificate)).await.unwrap();
  s.set_document_status(&doc.id, ItemStatus::Deleted).await.unwrap();

  let err = s.set_document_status(&doc.id, ItemStatus::Hidden).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidTransition);

  let restored = s.set_document_status(&doc.id, ItemStatus::Visible).await.unwrap();
  assert_eq!(restored.status, ItemStatus::Visible);
}

#[tokio::test]
async fn update_document_fields() {
  let s = store().await;
  let doc = s.create_document(new_doc("Old title", Category::Diploma)).await.unwrap();

  let patch = DocumentPatch {
    title: Some("New title".into()),
    category: Some(Category::Certificate),
    ..Default::default()
  };
  let updated = s.update_document(&doc.id, patch).await.unwrap();
  assert_eq!(updated.id, doc.id);
  assert_eq!(updated.title, "New title");
  assert_eq!(updated.description, doc.description);
  assert_eq!(updated.created_at, doc.created_at);

  let fetched = s.get_document(&doc.id).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
}

#[tokio::test]
async fn mutations_of_missing_ids_are_not_found() {
  let s = store().await;
  let patch = DocumentPatch::default();
  assert_eq!(
    s.update_document("missing", patch).await.unwrap_err().kind(),
    ErrorKind::NotFound
  );
  assert_eq!(
    s.set_document_status("missing", ItemStatus::Hidden).await.unwrap_err().kind(),
    ErrorKind::NotFound
  );
  assert_eq!(s.purge_document("missing").await.unwrap_err().kind(), ErrorKind::NotFound);
  assert_eq!(s.delete_service("missing").await.unwrap_err().kind(), ErrorKind::NotFound);
  assert_eq!(s.delete_message("missing").await.unwrap_err().kind(), ErrorKind::NotFound);
  assert_eq!(s.open_message("missing").await.unwrap_err().kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn category_listing_filters_visible_documents() {
  let s = store().await;
  let diplomas = s.list_documents_by_category(Category::Diploma).await.unwrap();
  assert_eq!(diplomas.len(), 1);
  assert!(diplomas.iter().all(|d| d.category == Category::Diploma));

  s.set_document_status(&diplomas[0].id, ItemStatus::Hidden).await.unwrap();
  assert!(s.list_documents_by_category(Category::Diploma).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_id_is_retried_once() {
  let s = store().await;
  s.list_documents().await.unwrap();

  let mut ids = ["1".to_string(), "fresh".to_string()].into_iter();
  let input = new_doc("Retry", Category::Diploma);
  let doc = s
    .insert_fresh(
      || ids.next().unwrap(),
      |id| input.clone().into_item(id, chrono::Utc::now()),
    )
    .await
    .unwrap();
  assert_eq!(doc.id, "fresh");
}

#[tokio::test]
async fn persistent_duplicate_id_surfaces_as_unavailable() {
  let s = store().await;
  s.list_documents().await.unwrap();

  let input = new_doc("Retry", Category::Diploma);
  let err = s
    .insert_fresh(
      || "1".to_string(),
      |id| input.clone().into_item(id, chrono::Utc::now()),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(folio_core::Error::DuplicateId(_))));
  assert_eq!(err.kind(), ErrorKind::Unavailable);
}

// ─── Services ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn service_round_trip_preserves_highlights() {
  let s = store().await;
  let input = NewService {
    title:       "Lamination".into(),
    description: "Hot lamination of A4 documents".into(),
    image_url:   "https://example.com/lam.png".into(),
    highlights:  vec!["FREE".into(), "Same day".into(), "A3 too".into()],
  };
  let created = s.create_service(input.clone()).await.unwrap();
  let fetched = s.get_service(&created.id).await.unwrap().unwrap();

  assert_eq!(fetched, created);
  assert_eq!(fetched.title, input.title);
  assert_eq!(fetched.description, input.description);
  assert_eq!(fetched.image_url, input.image_url);
  assert_eq!(fetched.highlights, input.highlights);
}

#[tokio::test]
async fn update_and_delete_service() {
  let s = store().await;
  let patch = ServicePatch {
    highlights: Some(vec![" New ".into(), "".into()]),
    ..Default::default()
  };
  let updated = s.update_service("s1", patch).await.unwrap();
  assert_eq!(updated.highlights, ["New"]);

  s.delete_service("s1").await.unwrap();
  assert!(s.get_service("s1").await.unwrap().is_none());
  assert_eq!(s.list_services().await.unwrap().len(), 1);
}

// ─── Messages ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn message_lifecycle() {
  let s = store().await;
  let msg = s.create_message(new_message()).await.unwrap();
  assert_eq!(msg.status, MessageStatus::Unread);

  let opened = s.open_message(&msg.id).await.unwrap();
  assert_eq!(opened.status, MessageStatus::Read);

  let replied = s.set_message_status(&msg.id, MessageStatus::Replied).await.unwrap();
  assert_eq!(replied.status, MessageStatus::Replied);

  // Opening again must not regress the status.
  let reopened = s.open_message(&msg.id).await.unwrap();
  assert_eq!(reopened.status, MessageStatus::Replied);
  let err = s.set_message_status(&msg.id, MessageStatus::Read).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidTransition);

  s.set_message_status(&msg.id, MessageStatus::Unread).await.unwrap();

  s.delete_message(&msg.id).await.unwrap();
  assert!(s.list_messages().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_message_is_rejected() {
  let s = store().await;
  let mut input = new_message();
  input.message = String::new();
  let err = s.create_message(input).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert!(s.list_messages().await.unwrap().is_empty());
}

// ─── Credentials & session ───────────────────────────────────────────────────

#[tokio::test]
async fn default_credentials_are_seeded() {
  let s = store().await;
  let creds = s.get_admin_credentials().await.unwrap();
  assert_eq!(creds.username, "admin");
  assert!(creds.verify("admin", "admin123"));

  // Stable across reads.
  assert_eq!(s.get_admin_credentials().await.unwrap(), creds);
  assert_eq!(s.count_rows("admin").await.unwrap(), 1);
}

#[tokio::test]
async fn replaced_credentials_are_returned() {
  let s = store().await;
  s.set_admin_credentials(AdminCredentials::new("owner", "n3w-pass"))
    .await
    .unwrap();

  let creds = s.get_admin_credentials().await.unwrap();
  assert_eq!(creds.username, "owner");
  assert!(creds.verify("owner", "n3w-pass"));
  assert!(!creds.verify("admin", "admin123"));
  assert_eq!(s.count_rows("admin").await.unwrap(), 1);
}

#[tokio::test]
async fn legacy_plaintext_credentials_are_upgraded() {
  let s = store().await;
  s.insert_raw("admin", "credentials", 1, r#"{"username":"boss","password":"pw"}"#)
    .await
    .unwrap();

  let creds = s.get_admin_credentials().await.unwrap();
  assert_eq!(creds.username, "boss");
  assert!(creds.verify("boss", "pw"));
  assert_eq!(s.get_admin_credentials().await.unwrap(), creds);
}

#[tokio::test]
async fn login_requires_exact_match() {
  let s = store().await;
  assert!(Session::login(&s, "admin", "admin123").await.unwrap().is_logged_in());
  assert!(!Session::login(&s, "admin", "admin1234").await.unwrap().is_logged_in());
  assert!(!Session::login(&s, "Admin", "admin123").await.unwrap().is_logged_in());
}

#[tokio::test]
async fn session_revalidates_against_current_credentials() {
  let s = store().await;
  let session = Session::login(&s, "admin", "admin123").await.unwrap();
  let session = session.revalidate(&s).await.unwrap();
  assert_eq!(session.username(), Some("admin"));

  s.set_admin_credentials(AdminCredentials::new("owner", "x"))
    .await
    .unwrap();
  let session = session.revalidate(&s).await.unwrap();
  assert_eq!(session, Session::LoggedOut);

  let session = Session::login(&s, "owner", "x").await.unwrap();
  assert_eq!(session.logout(), Session::LoggedOut);
}

// ─── Showcase ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn showcase_serves_live_data() {
  let s = Arc::new(store().await);
  let showcase = Showcase::new(Arc::clone(&s), SeedLoader::bundled());

  let doc = s.create_document(new_doc("Live", Category::Diploma)).await.unwrap();
  let listing = showcase.documents(None).await.unwrap();
  assert!(!listing.degraded);
  assert!(listing.items.contains(&doc));

  let (counters, degraded) = showcase.counters().await.unwrap();
  assert!(!degraded);
  assert_eq!(counters.diplomas, 2);
  assert_eq!(counters.certificates, 1);
}

#[tokio::test]
async fn showcase_falls_back_when_store_is_unreachable() {
  let s = store().await;
  let showcase = Showcase::new(Arc::new(s.clone()), SeedLoader::bundled());
  s.close().await.unwrap();

  let listing = showcase.documents(None).await.unwrap();
  assert!(listing.degraded);
  assert_eq!(listing.items.len(), 2);

  let certs = showcase.documents(Some(Category::Certificate)).await.unwrap();
  assert!(certs.degraded);
  assert_eq!(certs.items.len(), 1);

  let services = showcase.services().await.unwrap();
  assert!(services.degraded);
  assert_eq!(services.items.len(), 2);
}

#[tokio::test]
async fn writes_to_unreachable_store_surface_unavailable() {
  let s = store().await;
  let handle = s.clone();
  s.close().await.unwrap();

  let err = handle
    .create_document(new_doc("Lost", Category::Diploma))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Unavailable);
}

// ─── End to end ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn seeded_documents_through_hide_and_purge() {
  let s = store().await;

  let visible = s.list_visible_documents().await.unwrap();
  assert_eq!(visible.len(), 2);
  assert!(visible.iter().any(|d| d.category == Category::Diploma));
  assert!(visible.iter().any(|d| d.category == Category::Certificate));

  let (first, second) = (visible[0].clone(), visible[1].clone());

  s.set_document_status(&first.id, ItemStatus::Hidden).await.unwrap();
  assert_eq!(ids(&s.list_visible_documents().await.unwrap()), [second.id.as_str()]);

  s.purge_document(&second.id).await.unwrap();
  assert!(s.list_visible_documents().await.unwrap().is_empty());
  assert_eq!(ids(&s.list_documents().await.unwrap()), [first.id.as_str()]);

  s.purge_document(&first.id).await.unwrap();
  assert!(s.list_documents().await.unwrap().is_empty());
}
