//! folio-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! configured content store, and serves the Folio JSON API over HTTP.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use folio_api::AppState;
use folio_core::{seed::SeedLoader, store::ContentStore};
use folio_store_local::LocalStore;
use folio_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{Backend, ServerConfig};

#[derive(Parser)]
#[command(author, version, about = "Folio portfolio server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)?;

  let seeds = Arc::new(SeedLoader::new(cfg.seed_source()));
  let store_path = cfg.store_path();
  tracing::info!(backend = ?cfg.backend, path = %store_path.display(), "opening store");

  // The store trait is not object safe, so each backend gets its own
  // monomorphised server.
  match cfg.backend {
    Backend::Sqlite => {
      let store = SqliteStore::open(&store_path, Arc::clone(&seeds))
        .await
        .with_context(|| format!("failed to open store at {store_path:?}"))?;
      serve(store, seeds, &cfg).await
    }
    Backend::Local => {
      let store = LocalStore::open(&store_path, Arc::clone(&seeds))
        .await
        .with_context(|| format!("failed to open data directory {store_path:?}"))?;
      serve(store, seeds, &cfg).await
    }
  }
}

async fn serve<S>(store: S, seeds: Arc<SeedLoader>, cfg: &ServerConfig) -> anyhow::Result<()>
where
  S: ContentStore + 'static,
{
  let state = AppState::new(Arc::new(store), seeds, cfg.session_ttl()?);
  let app = folio_api::router(state).layer(TraceLayer::new_for_http());

  let address = cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("shut down");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
}
