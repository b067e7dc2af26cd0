//! Public endpoints. No session required.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/documents` | Visible documents; optional `?category=Diploma\|Sertifikat` |
//! | `GET`  | `/services` | All services |
//! | `GET`  | `/counters` | Visible diploma and certificate counts |
//! | `POST` | `/messages` | Body: [`NewMessage`]; returns 201 + stored message |
//!
//! Read endpoints fall back to the bundled defaults with `degraded: true`
//! when the store is unreachable.

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use folio_core::{
  model::{Category, DocumentItem, NewMessage, ServiceItem},
  showcase::Listing,
  stats::Counters,
  store::ContentStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct DocumentParams {
  pub category: Option<Category>,
}

/// `GET /documents[?category=...]`
pub async fn documents<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<DocumentParams>,
) -> Result<Json<Listing<DocumentItem>>, ApiError>
where
  S: ContentStore + 'static,
{
  let listing = state
    .showcase
    .documents(params.category)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(listing))
}

/// `GET /services`
pub async fn services<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Listing<ServiceItem>>, ApiError>
where
  S: ContentStore + 'static,
{
  let listing = state.showcase.services().await.map_err(ApiError::store)?;
  Ok(Json(listing))
}

#[derive(Debug, Serialize)]
pub struct CountersBody {
  pub counters: Counters,
  pub degraded: bool,
}

/// `GET /counters`
pub async fn counters<S>(State(state): State<AppState<S>>) -> Result<Json<CountersBody>, ApiError>
where
  S: ContentStore + 'static,
{
  let (counters, degraded) = state.showcase.counters().await.map_err(ApiError::store)?;
  Ok(Json(CountersBody { counters, degraded }))
}

/// `POST /messages` — the contact form.
pub async fn submit_message<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewMessage>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContentStore + 'static,
{
  let msg = state.store.create_message(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(msg)))
}
