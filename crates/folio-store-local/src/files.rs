//! Whole-file JSON persistence helpers.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tokio::{fs, io::AsyncWriteExt as _};

use crate::{Error, Result};

/// What was found at a path.
pub(crate) enum Contents {
  Missing,
  Corrupt,
  Json(Value),
}

pub(crate) async fn read(path: &Path) -> Result<Contents> {
  let bytes = match fs::read(path).await {
    Ok(bytes) => bytes,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Contents::Missing),
    Err(e) => return Err(Error::io(path)(e)),
  };
  Ok(match serde_json::from_slice(&bytes) {
    Ok(value) => Contents::Json(value),
    Err(e) => {
      tracing::warn!(path = %path.display(), error = %e, "unparseable data file");
      Contents::Corrupt
    }
  })
}

/// Read a JSON array. A file that is not an array is set aside and replaced
/// by an empty one. `None` means the file does not exist.
pub(crate) async fn read_array(path: &Path) -> Result<Option<Vec<Value>>> {
  match read(path).await? {
    Contents::Missing => Ok(None),
    Contents::Json(Value::Array(values)) => Ok(Some(values)),
    Contents::Json(_) | Contents::Corrupt => {
      set_aside(path).await?;
      write_json(path, &Vec::<Value>::new()).await?;
      Ok(Some(Vec::new()))
    }
  }
}

/// Rename a damaged file to `<name>.corrupt` so it can be inspected later.
pub(crate) async fn set_aside(path: &Path) -> Result<PathBuf> {
  let mut backup = path.as_os_str().to_owned();
  backup.push(".corrupt");
  let backup = PathBuf::from(backup);
  fs::rename(path, &backup).await.map_err(Error::io(path))?;
  tracing::warn!(
    path = %path.display(),
    backup = %backup.display(),
    "set aside corrupt data file"
  );
  Ok(backup)
}

pub(crate) async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
  let bytes = serde_json::to_vec_pretty(value)?;
  atomic_write(path, &bytes).await
}

pub(crate) async fn remove(path: &Path) -> Result<()> {
  fs::remove_file(path).await.map_err(Error::io(path))
}

/// Write `data` to a sibling temp file, sync it, then rename it over `path`.
async fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).await.map_err(Error::io(parent))?;
  }

  let mut temp = path.as_os_str().to_owned();
  temp.push(".tmp");
  let temp = PathBuf::from(temp);

  let mut file = fs::File::create(&temp).await.map_err(Error::io(&temp))?;
  file.write_all(data).await.map_err(Error::io(&temp))?;
  file.sync_all().await.map_err(Error::io(&temp))?;
  drop(file);

  fs::rename(&temp, path).await.map_err(Error::io(path))
}
