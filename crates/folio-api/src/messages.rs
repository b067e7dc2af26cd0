//! Admin handlers for `/admin/messages`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/admin/messages` | Inbox, newest first |
//! | `GET`    | `/admin/messages/{id}` | Single message; does not change its status |
//! | `POST`   | `/admin/messages/{id}/open` | Marks `unread` as `read`; never regresses `replied` |
//! | `PUT`    | `/admin/messages/{id}/status` | Body: `{"status":"unread\|read\|replied"}` |
//! | `DELETE` | `/admin/messages/{id}` | 204 |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use folio_core::{
  model::{ContactMessage, MessageStatus},
  store::ContentStore,
};

use crate::{AppState, StatusBody, auth::AdminSession, error::ApiError};

pub async fn list<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
) -> Result<Json<Vec<ContactMessage>>, ApiError>
where
  S: ContentStore + 'static,
{
  let messages = state.store.list_messages().await.map_err(ApiError::store)?;
  Ok(Json(messages))
}

pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  _admin: AdminSession,
) -> Result<Json<ContactMessage>, ApiError>
where
  S: ContentStore + 'static,
{
  let msg = state
    .store
    .get_message(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("message {id} not found")))?;
  Ok(Json(msg))
}

/// `POST /admin/messages/{id}/open`
pub async fn open<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  _admin: AdminSession,
) -> Result<Json<ContactMessage>, ApiError>
where
  S: ContentStore + 'static,
{
  let msg = state.store.open_message(&id).await.map_err(ApiError::store)?;
  Ok(Json(msg))
}

/// `PUT /admin/messages/{id}/status`
pub async fn set_status<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  _admin: AdminSession,
  Json(body): Json<StatusBody<MessageStatus>>,
) -> Result<Json<ContactMessage>, ApiError>
where
  S: ContentStore + 'static,
{
  let msg = state
    .store
    .set_message_status(&id, body.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(msg))
}

pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  _admin: AdminSession,
) -> Result<StatusCode, ApiError>
where
  S: ContentStore + 'static,
{
  state.store.delete_message(&id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
