//! Public, read-only view of the store with degraded fallback.
//!
//! When the backing store is unreachable, public pages still render the seed
//! payload. That payload is served for display only and never written back.

use std::sync::Arc;

use serde::Serialize;

use crate::{
  StoreError,
  model::{Category, DocumentItem, ServiceItem},
  seed::SeedLoader,
  stats::Counters,
  store::ContentStore,
};

/// Items for a public page, flagged when they came from the fallback payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing<T> {
  pub items:    Vec<T>,
  pub degraded: bool,
}

impl<T> Listing<T> {
  fn live(items: Vec<T>) -> Self { Self { items, degraded: false } }

  fn fallback(items: Vec<T>) -> Self { Self { items, degraded: true } }
}

pub struct Showcase<S> {
  store: Arc<S>,
  seeds: Arc<SeedLoader>,
}

impl<S> Clone for Showcase<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), seeds: Arc::clone(&self.seeds) }
  }
}

impl<S: ContentStore> Showcase<S> {
  pub fn new(store: Arc<S>, seeds: Arc<SeedLoader>) -> Self { Self { store, seeds } }

  /// Visible documents, optionally restricted to one category.
  pub async fn documents(
    &self,
    category: Option<Category>,
  ) -> Result<Listing<DocumentItem>, S::Error> {
    let live = match category {
      Some(c) => self.store.list_documents_by_category(c).await,
      None => self.store.list_visible_documents().await,
    };
    match live {
      Ok(items) => Ok(Listing::live(items)),
      Err(e) if e.is_unavailable() => {
        tracing::warn!(error = %e, "store unavailable, serving fallback documents");
        let mut items = self.seeds.load_default_documents().await;
        items.retain(|d| d.status.is_visible() && category.is_none_or(|c| d.category == c));
        Ok(Listing::fallback(items))
      }
      Err(e) => Err(e),
    }
  }

  pub async fn services(&self) -> Result<Listing<ServiceItem>, S::Error> {
    match self.store.list_services().await {
      Ok(items) => Ok(Listing::live(items)),
      Err(e) if e.is_unavailable() => {
        tracing::warn!(error = %e, "store unavailable, serving fallback services");
        Ok(Listing::fallback(self.seeds.load_default_services().await))
      }
      Err(e) => Err(e),
    }
  }

  /// Home page counters and whether they were computed from the fallback.
  pub async fn counters(&self) -> Result<(Counters, bool), S::Error> {
    let listing = self.documents(None).await?;
    Ok((Counters::from_documents(&listing.items), listing.degraded))
  }
}
