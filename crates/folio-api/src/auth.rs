//! Bearer-token admin sessions.
//!
//! `POST /admin/login` checks the submitted pair through
//! [`Session::login`] and hands out an opaque token. The token maps to the
//! [`Session`] in a process-local [`SessionTable`] until logout or until it
//! sits idle longer than the configured timeout. Every admin request
//! re-validates the session against the stored credentials.

use std::collections::HashMap;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::{DateTime, TimeDelta, Utc};
use folio_core::{session::Session, store::ContentStore};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Session table ───────────────────────────────────────────────────────────

struct Entry {
  session:   Session,
  last_seen: DateTime<Utc>,
}

/// Live admin sessions keyed by bearer token.
pub struct SessionTable {
  ttl:     TimeDelta,
  entries: RwLock<HashMap<Uuid, Entry>>,
}

impl SessionTable {
  /// A table whose sessions expire after `ttl` without use.
  pub fn new(ttl: TimeDelta) -> Self { Self { ttl, entries: RwLock::new(HashMap::new()) } }

  pub fn ttl(&self) -> TimeDelta { self.ttl }

  /// Remember a logged-in session and return its token. Entries that have
  /// idled out are swept first.
  pub async fn issue(&self, session: Session, now: DateTime<Utc>) -> Uuid {
    let token = Uuid::new_v4();
    let mut entries = self.entries.write().await;
    let before = entries.len();
    entries.retain(|_, entry| now - entry.last_seen <= self.ttl);
    if entries.len() < before {
      tracing::debug!(swept = before - entries.len(), "expired admin sessions swept");
    }
    entries.insert(token, Entry { session, last_seen: now });
    token
  }

  /// The session behind `token`, if it exists and has not idled out. A hit
  /// refreshes the idle clock; an expired entry is dropped.
  pub async fn lookup(&self, token: Uuid, now: DateTime<Utc>) -> Option<Session> {
    let mut entries = self.entries.write().await;
    let entry = entries.get_mut(&token)?;
    if now - entry.last_seen > self.ttl {
      entries.remove(&token);
      tracing::debug!(%token, "admin session expired");
      return None;
    }
    entry.last_seen = now;
    Some(entry.session.clone())
  }

  /// Point an existing token at a new username, keeping its login time.
  pub async fn rebind(&self, token: Uuid, username: &str) {
    if let Some(entry) = self.entries.write().await.get_mut(&token)
      && let Session::LoggedIn { since, .. } = entry.session
    {
      entry.session = Session::LoggedIn { username: username.to_owned(), since };
    }
  }

  pub async fn revoke(&self, token: Uuid) -> Option<Session> {
    self.entries.write().await.remove(&token).map(|e| e.session)
  }

  /// End every session except `keep`. Returns how many were ended.
  pub async fn revoke_others(&self, keep: Uuid) -> usize {
    let mut entries = self.entries.write().await;
    let before = entries.len();
    entries.retain(|token, _| *token == keep);
    before - entries.len()
  }

  pub async fn active(&self) -> usize { self.entries.read().await.len() }
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// Present in a handler means the request carried a valid admin session.
#[derive(Debug, Clone)]
pub struct AdminSession {
  pub token:    Uuid,
  pub username: String,
}

/// Parse `Authorization: Bearer <uuid>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let token = value.strip_prefix("Bearer ")?;
  Uuid::parse_str(token.trim()).ok()
}

impl<S> FromRequestParts<AppState<S>> for AdminSession
where
  S: ContentStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
    let session = state
      .sessions
      .lookup(token, Utc::now())
      .await
      .ok_or(ApiError::Unauthorized)?;

    match session.revalidate(state.store.as_ref()).await.map_err(ApiError::store)? {
      Session::LoggedIn { username, .. } => Ok(AdminSession { token, username }),
      Session::LoggedOut => {
        state.sessions.revoke(token).await;
        Err(ApiError::Unauthorized)
      }
    }
  }
}
