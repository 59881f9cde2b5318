use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{KvError, KvStore};

/// In-memory KV store implementation.
///
/// Suitable for single-run use or testing.
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
  data: RwLock<HashMap<String, String>>,
}

impl InMemoryKvStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
  async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
    Ok(self.data.read().await.get(key).cloned())
  }

  async fn set(&self, key: &str, value: String) -> Result<(), KvError> {
    self.data.write().await.insert(key.to_string(), value);
    Ok(())
  }
}
