//! Admin session, dashboard and credential endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/admin/login` | Body: `{"username","password"}`; returns `{token, username}` |
//! | `POST` | `/admin/logout` | Ends the calling session; 204 |
//! | `GET`  | `/admin/stats` | [`DashboardStats`] |
//! | `GET`  | `/admin/credentials` | `{username}` only |
//! | `PUT`  | `/admin/credentials` | Body: `{"username","password"}`; ends every other session |

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use folio_core::{
  credentials::AdminCredentials,
  session::Session,
  stats::DashboardStats,
  store::ContentStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, auth::AdminSession, error::ApiError};

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token:    Uuid,
  pub username: String,
}

/// What the admin console shows about the stored credentials.
#[derive(Debug, Serialize)]
pub struct CredentialsView {
  pub username: String,
}

/// `POST /admin/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<AdminCredentials>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: ContentStore + 'static,
{
  let session = Session::login(state.store.as_ref(), &body.username, &body.password)
    .await
    .map_err(ApiError::store)?;
  let Some(username) = session.username().map(str::to_owned) else {
    return Err(ApiError::Unauthorized);
  };
  let token = state.sessions.issue(session, Utc::now()).await;
  Ok(Json(LoginResponse { token, username }))
}

/// `POST /admin/logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  admin: AdminSession,
) -> StatusCode
where
  S: ContentStore + 'static,
{
  if let Some(session) = state.sessions.revoke(admin.token).await {
    session.logout();
  }
  StatusCode::NO_CONTENT
}

/// `GET /admin/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
) -> Result<Json<DashboardStats>, ApiError>
where
  S: ContentStore + 'static,
{
  let docs = state.store.list_documents().await.map_err(ApiError::store)?;
  let services = state.store.list_services().await.map_err(ApiError::store)?;
  let messages = state.store.list_messages().await.map_err(ApiError::store)?;
  Ok(Json(DashboardStats::compute(&docs, &services, &messages)))
}

/// `GET /admin/credentials`
pub async fn get_credentials<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
) -> Result<Json<CredentialsView>, ApiError>
where
  S: ContentStore + 'static,
{
  let creds = state.store.get_admin_credentials().await.map_err(ApiError::store)?;
  Ok(Json(CredentialsView { username: creds.username }))
}

/// `PUT /admin/credentials`
///
/// The calling session carries over to the new username; every other
/// session ends.
pub async fn set_credentials<S>(
  State(state): State<AppState<S>>,
  admin: AdminSession,
  Json(body): Json<AdminCredentials>,
) -> Result<Json<CredentialsView>, ApiError>
where
  S: ContentStore + 'static,
{
  let stored = state
    .store
    .set_admin_credentials(body)
    .await
    .map_err(ApiError::store)?;

  state.sessions.rebind(admin.token, &stored.username).await;
  let ended = state.sessions.revoke_others(admin.token).await;
  tracing::info!(username = %stored.username, ended, "admin credentials changed");

  Ok(Json(CredentialsView { username: stored.username }))
}
