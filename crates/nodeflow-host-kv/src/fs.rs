use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{KvError, KvStore};

/// Filesystem-backed KV store.
///
/// Each key is one file under the base directory. Keys are restricted to
/// ASCII letters, digits, `-`, `_` and `.` so they cannot escape it.
#[derive(Debug, Clone)]
pub struct FsKvStore {
  base_path: PathBuf,
}

impl FsKvStore {
  pub fn new(base_path: impl AsRef<Path>) -> Self {
    Self {
      base_path: base_path.as_ref().to_path_buf(),
    }
  }

  fn path_for(&self, key: &str) -> Result<PathBuf, KvError> {
    let valid = !key.is_empty()
      && !key.starts_with('.')
      && key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if !valid {
      return Err(KvError::InvalidKey(key.to_string()));
    }
    Ok(self.base_path.join(format!("{}.json", key)))
  }
}

#[async_trait]
impl KvStore for FsKvStore {
  async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
    let path = self.path_for(key)?;
    match tokio::fs::read_to_string(&path).await {
      Ok(value) => Ok(Some(value)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  async fn set(&self, key: &str, value: String) -> Result<(), KvError> {
    let path = self.path_for(key)?;
    tokio::fs::create_dir_all(&self.base_path).await?;
    tokio::fs::write(&path, value).await?;
    Ok(())
  }
}
