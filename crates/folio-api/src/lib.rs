//! JSON REST API for Folio.
//!
//! Exposes an axum [`Router`] backed by any [`ContentStore`]: the public
//! showcase and contact form, and the session-gated admin surface. TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = folio_api::AppState::new(store, seeds, TimeDelta::minutes(120));
//! .nest("/api", folio_api::router(state))
//! ```

pub mod admin;
pub mod auth;
pub mod documents;
pub mod error;
pub mod messages;
pub mod public;
pub mod services;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use chrono::TimeDelta;
use folio_core::{seed::SeedLoader, showcase::Showcase, store::ContentStore};
use serde::Deserialize;

pub use auth::{AdminSession, SessionTable};
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub showcase: Showcase<S>,
  pub sessions: Arc<SessionTable>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      showcase: self.showcase.clone(),
      sessions: Arc::clone(&self.sessions),
    }
  }
}

impl<S: ContentStore> AppState<S> {
  /// `seeds` backs the public fallback; admin sessions idle out after
  /// `session_ttl`.
  pub fn new(store: Arc<S>, seeds: Arc<SeedLoader>, session_ttl: TimeDelta) -> Self {
    Self {
      showcase: Showcase::new(Arc::clone(&store), seeds),
      store,
      sessions: Arc::new(SessionTable::new(session_ttl)),
    }
  }
}

/// JSON body of the status-change endpoints.
#[derive(Debug, Deserialize)]
pub struct StatusBody<T> {
  pub status: T,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: ContentStore + 'static,
{
  Router::new()
    // Public
    .route("/documents", get(public::documents::<S>))
    .route("/services", get(public::services::<S>))
    .route("/counters", get(public::counters::<S>))
    .route("/messages", post(public::submit_message::<S>))
    // Admin session
    .route("/admin/login", post(admin::login::<S>))
    .route("/admin/logout", post(admin::logout::<S>))
    .route("/admin/stats", get(admin::stats::<S>))
    .route(
      "/admin/credentials",
      get(admin::get_credentials::<S>).put(admin::set_credentials::<S>),
    )
    // Documents
    .route("/admin/documents", get(documents::list::<S>).post(documents::create::<S>))
    .route(
      "/admin/documents/{id}",
      get(documents::get_one::<S>)
        .patch(documents::update::<S>)
        .delete(documents::purge::<S>),
    )
    .route("/admin/documents/{id}/status", put(documents::set_status::<S>))
    // Services
    .route("/admin/services", get(services::list::<S>).post(services::create::<S>))
    .route(
      "/admin/services/{id}",
      get(services::get_one::<S>)
        .patch(services::update::<S>)
        .delete(services::delete::<S>),
    )
    // Messages
    .route("/admin/messages", get(messages::list::<S>))
    .route(
      "/admin/messages/{id}",
      get(messages::get_one::<S>).delete(messages::delete::<S>),
    )
    .route("/admin/messages/{id}/open", post(messages::open::<S>))
    .route("/admin/messages/{id}/status", put(messages::set_status::<S>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use folio_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory(SeedLoader::bundled()).await.unwrap();
    AppState::new(Arc::new(store), SeedLoader::bundled(), TimeDelta::minutes(30))
  }

  async fn send(
    state:  &AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    token:  Option<&str>,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let resp = router(state.clone())
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn login(state: &AppState<SqliteStore>, username: &str, password: &str) -> String {
    let (status, body) = send(
      state,
      "POST",
      "/admin/login",
      None,
      Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_owned()
  }

  // ── Public ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn public_documents_show_seeded_items() {
    let state = make_state().await;
    let (status, body) = send(&state, "GET", "/documents", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["degraded"], false);
  }

  #[tokio::test]
  async fn public_documents_filter_by_category() {
    let state = make_state().await;
    let (status, body) = send(&state, "GET", "/documents?category=Sertifikat", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["category"], "Sertifikat");
  }

  #[tokio::test]
  async fn counters_and_services() {
    let state = make_state().await;
    let (_, body) = send(&state, "GET", "/counters", None, None).await;
    assert_eq!(body, json!({ "counters": { "diplomas": 1, "certificates": 1 }, "degraded": false }));

    let (_, body) = send(&state, "GET", "/services", None, None).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["highlights"][0], "Laminasiya PULSUZ");
  }

  #[tokio::test]
  async fn contact_form_submission() {
    let state = make_state().await;
    let (status, body) = send(
      &state,
      "POST",
      "/messages",
      None,
      Some(json!({ "name": "Aysel", "email": "aysel@example.com", "message": "Salam" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "unread");
    assert_eq!(body["subject"], "");

    let (status, body) = send(
      &state,
      "POST",
      "/messages",
      None,
      Some(json!({ "name": "Aysel", "email": "not-an-email", "message": "Salam" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn public_reads_degrade_when_store_is_gone() {
    let state = make_state().await;
    SqliteStore::clone(&state.store).close().await.unwrap();

    let (status, body) = send(&state, "GET", "/documents", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["degraded"], true);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let (status, body) = send(
      &state,
      "POST",
      "/messages",
      None,
      Some(json!({ "name": "A", "email": "a@b.c", "message": "m" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "could not save, try again");
  }

  // ── Sessions ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_routes_require_a_session() {
    let state = make_state().await;
    let (status, _) = send(&state, "GET", "/admin/documents", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let bogus = uuid::Uuid::new_v4().to_string();
    let (status, _) = send(&state, "GET", "/admin/stats", Some(&bogus), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn wrong_password_is_rejected() {
    let state = make_state().await;
    let (status, body) = send(
      &state,
      "POST",
      "/admin/login",
      None,
      Some(json!({ "username": "admin", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
  }

  #[tokio::test]
  async fn login_stats_logout() {
    let state = make_state().await;
    let token = login(&state, "admin", "admin123").await;

    let (status, body) = send(&state, "GET", "/admin/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["visible"], 2);
    assert_eq!(body["services"], 2);
    assert_eq!(body["messages"], 0);

    let (status, _) = send(&state, "POST", "/admin/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&state, "GET", "/admin/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn credential_change_ends_other_sessions() {
    let state = make_state().await;
    let mine = login(&state, "admin", "admin123").await;
    let other = login(&state, "admin", "admin123").await;

    let (status, body) = send(
      &state,
      "PUT",
      "/admin/credentials",
      Some(&mine),
      Some(json!({ "username": "owner", "password": "s3cret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "username": "owner" }));

    let (status, body) = send(&state, "GET", "/admin/credentials", Some(&mine), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "username": "owner" }));

    let (status, _) = send(&state, "GET", "/admin/credentials", Some(&other), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
      &state,
      "POST",
      "/admin/login",
      None,
      Some(json!({ "username": "admin", "password": "admin123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    login(&state, "owner", "s3cret").await;
  }

  #[tokio::test]
  async fn blank_credentials_are_rejected() {
    let state = make_state().await;
    let token = login(&state, "admin", "admin123").await;
    let (status, _) = send(
      &state,
      "PUT",
      "/admin/credentials",
      Some(&token),
      Some(json!({ "username": "", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Documents ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn document_admin_flow() {
    let state = make_state().await;
    let token = login(&state, "admin", "admin123").await;

    let (status, doc) = send(
      &state,
      "POST",
      "/admin/documents",
      Some(&token),
      Some(json!({
        "title": "MBA",
        "description": "UNEC",
        "imageUrl": "https://example.com/mba.png",
        "category": "Diploma"
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(doc["status"], "visible");
    let id = doc["id"].as_str().unwrap().to_owned();
    let item_uri = format!("/admin/documents/{id}");

    let (status, doc) = send(
      &state,
      "PATCH",
      &item_uri,
      Some(&token),
      Some(json!({ "title": "MBA (2024)" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["title"], "MBA (2024)");
    assert_eq!(doc["description"], "UNEC");

    let status_uri = format!("{item_uri}/status");
    let (status, _) = send(
      &state,
      "PUT",
      &status_uri,
      Some(&token),
      Some(json!({ "status": "hidden" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, public) = send(&state, "GET", "/documents", None, None).await;
    assert!(public["items"].as_array().unwrap().iter().all(|d| d["id"] != id.as_str()));

    send(&state, "PUT", &status_uri, Some(&token), Some(json!({ "status": "deleted" }))).await;
    let (status, body) = send(
      &state,
      "PUT",
      &status_uri,
      Some(&token),
      Some(json!({ "status": "hidden" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = send(&state, "DELETE", &item_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&state, "GET", &item_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&state, "DELETE", &item_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn blank_document_title_is_rejected() {
    let state = make_state().await;
    let token = login(&state, "admin", "admin123").await;
    let (status, _) = send(
      &state,
      "POST",
      "/admin/documents",
      Some(&token),
      Some(json!({ "title": "  ", "imageUrl": "u", "category": "Sertifikat" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, docs) = send(&state, "GET", "/admin/documents", Some(&token), None).await;
    assert_eq!(docs.as_array().unwrap().len(), 2);
  }

  // ── Services ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn service_admin_flow() {
    let state = make_state().await;
    let token = login(&state, "admin", "admin123").await;

    let (status, service) = send(
      &state,
      "POST",
      "/admin/services",
      Some(&token),
      Some(json!({
        "title": "Lamination",
        "description": "A4 and A3",
        "imageUrl": "u",
        "highlights": ["Fast", " ", "Cheap"]
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(service["highlights"], json!(["Fast", "Cheap"]));
    let uri = format!("/admin/services/{}", service["id"].as_str().unwrap());

    let (status, service) = send(
      &state,
      "PATCH",
      &uri,
      Some(&token),
      Some(json!({ "description": "A4 only" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(service["description"], "A4 only");
    assert_eq!(service["highlights"], json!(["Fast", "Cheap"]));

    let (status, _) = send(&state, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&state, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Messages ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn message_admin_flow() {
    let state = make_state().await;
    let token = login(&state, "admin", "admin123").await;

    let (_, msg) = send(
      &state,
      "POST",
      "/messages",
      None,
      Some(json!({ "name": "Elvin", "email": "e@example.com", "message": "Price?" })),
    )
    .await;
    let uri = format!("/admin/messages/{}", msg["id"].as_str().unwrap());

    let (_, stats) = send(&state, "GET", "/admin/stats", Some(&token), None).await;
    assert_eq!(stats["unread"], 1);

    let (_, msg) = send(&state, "GET", &uri, Some(&token), None).await;
    assert_eq!(msg["status"], "unread");

    let (_, msg) = send(&state, "POST", &format!("{uri}/open"), Some(&token), None).await;
    assert_eq!(msg["status"], "read");

    let (status, msg) = send(
      &state,
      "PUT",
      &format!("{uri}/status"),
      Some(&token),
      Some(json!({ "status": "replied" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(msg["status"], "replied");

    let (_, msg) = send(&state, "POST", &format!("{uri}/open"), Some(&token), None).await;
    assert_eq!(msg["status"], "replied");

    let (status, _) = send(
      &state,
      "PUT",
      &format!("{uri}/status"),
      Some(&token),
      Some(json!({ "status": "read" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&state, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, list) = send(&state, "GET", "/admin/messages", Some(&token), None).await;
    assert_eq!(list, json!([]));
  }
}
