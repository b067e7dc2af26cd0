//! Runtime configuration, read from a TOML file layered with `FOLIO_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::TimeDelta;
use folio_core::seed::SeedSource;
use serde::Deserialize;

/// Which [`ContentStore`](folio_core::store::ContentStore) backs the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// A single SQLite file at `store_path`.
  #[default]
  Sqlite,
  /// One JSON file per collection under the `store_path` directory.
  Local,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub backend:             Backend,
  pub store_path:          PathBuf,
  /// Directory holding `initial-documents.json` and `initial-services.json`.
  /// The payloads bundled into the binary are used when unset.
  pub seed_dir:            Option<PathBuf>,
  pub session_ttl_minutes: i64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                "127.0.0.1".to_string(),
      port:                8080,
      backend:             Backend::Sqlite,
      store_path:          PathBuf::from("folio.db"),
      seed_dir:            None,
      session_ttl_minutes: 120,
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists) and then the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("FOLIO").try_parsing(true))
      .build()
      .context("failed to read config file")?;

    let cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.session_ttl()?;
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn seed_source(&self) -> SeedSource {
    match &self.seed_dir {
      Some(dir) => SeedSource::Dir(expand_tilde(dir)),
      None => SeedSource::Bundled,
    }
  }

  /// Idle timeout for admin sessions; at least one minute.
  pub fn session_ttl(&self) -> anyhow::Result<TimeDelta> {
    TimeDelta::try_minutes(self.session_ttl_minutes.max(1)).with_context(|| {
      format!("session_ttl_minutes = {} is out of range", self.session_ttl_minutes)
    })
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
