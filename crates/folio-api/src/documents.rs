//! Admin handlers for `/admin/documents`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/admin/documents` | Every document, any status, newest first |
//! | `POST`   | `/admin/documents` | Body: [`NewDocument`]; returns 201 + stored document |
//! | `GET`    | `/admin/documents/{id}` | Single document |
//! | `PATCH`  | `/admin/documents/{id}` | Body: [`DocumentPatch`] |
//! | `DELETE` | `/admin/documents/{id}` | Permanent purge; 204 |
//! | `PUT`    | `/admin/documents/{id}/status` | Body: `{"status":"visible\|hidden\|deleted"}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use folio_core::{
  model::{DocumentItem, DocumentPatch, ItemStatus, NewDocument},
  store::ContentStore,
};

use crate::{AppState, StatusBody, auth::AdminSession, error::ApiError};

/// `GET /admin/documents`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
) -> Result<Json<Vec<DocumentItem>>, ApiError>
where
  S: ContentStore + 'static,
{
  let docs = state.store.list_documents().await.map_err(ApiError::store)?;
  Ok(Json(docs))
}

/// `POST /admin/documents`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
  Json(body): Json<NewDocument>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore + 'static,
{
  let doc = state.store.create_document(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(doc)))
}

/// `GET /admin/documents/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  _admin: AdminSession,
) -> Result<Json<DocumentItem>, ApiError>
where
  S: ContentStore + 'static,
{
  let doc = state
    .store
    .get_document(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("document {id} not found")))?;
  Ok(Json(doc))
}

/// `PATCH /admin/documents/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  _admin: AdminSession,
  Json(patch): Json<DocumentPatch>,
) -> Result<Json<DocumentItem>, ApiError>
where
  S: ContentStore + 'static,
{
  let doc = state
    .store
    .update_document(&id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(doc))
}

/// `PUT /admin/documents/{id}/status`
pub async fn set_status<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  _admin: AdminSession,
  Json(body): Json<StatusBody<ItemStatus>>,
) -> Result<Json<DocumentItem>, ApiError>
where
  S: ContentStore + 'static,
{
  let doc = state
    .store
    .set_document_status(&id, body.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(doc))
}

/// `DELETE /admin/documents/{id}` — removes the record for good.
pub async fn purge<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  _admin: AdminSession,
) -> Result<StatusCode, ApiError>
where
  S: ContentStore + 'static,
{
  state.store.purge_document(&id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
