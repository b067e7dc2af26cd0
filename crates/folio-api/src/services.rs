//! Admin handlers for `/admin/services`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/admin/services` | Every service, newest first |
//! | `POST`   | `/admin/services` | Body: [`NewService`]; returns 201 |
//! | `GET`    | `/admin/services/{id}` | Single service |
//! | `PATCH`  | `/admin/services/{id}` | Body: [`ServicePatch`] |
//! | `DELETE` | `/admin/services/{id}` | 204 |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use folio_core::{
  model::{NewService, ServiceItem, ServicePatch},
  store::ContentStore,
};

use crate::{AppState, auth::AdminSession, error::ApiError};

pub async fn list<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
) -> Result<Json<Vec<ServiceItem>>, ApiError>
where
  S: ContentStore + 'static,
{
  let services = state.store.list_services().await.map_err(ApiError::store)?;
  Ok(Json(services))
}

pub async fn create<S>(
  State(state): State<AppState<S>>,
  _admin: AdminSession,
  Json(body): Json<NewService>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore + 'static,
{
  let service = state.store.create_service(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(service)))
}

pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  _admin: AdminSession,
) -> Result<Json<ServiceItem>, ApiError>
where
  S: ContentStore + 'static,
{
  let service = state
    .store
    .get_service(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("service {id} not found")))?;
  Ok(Json(service))
}

pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  _admin: AdminSession,
  Json(patch): Json<ServicePatch>,
) -> Result<Json<ServiceItem>, ApiError>
where
  S: ContentStore + 'static,
{
  let service = state
    .store
    .update_service(&id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(service))
}

pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  _admin: AdminSession,
) -> Result<StatusCode, ApiError>
where
  S: ContentStore + 'static,
{
  state.store.delete_service(&id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
