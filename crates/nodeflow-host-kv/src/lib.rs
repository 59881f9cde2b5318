//! Key-value storage capability for datastore nodes.
//!
//! Values are opaque strings; the datastore handler serializes JSON into
//! them. This trait is async to support networked backends.

mod fs;
mod memory;

pub use fs::FsKvStore;
pub use memory::InMemoryKvStore;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum KvError {
  #[error("invalid key '{0}'")]
  InvalidKey(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Trait for datastore persistence.
#[async_trait]
pub trait KvStore: Send + Sync {
  /// Get a value by key.
  async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

  /// Set a value, replacing any previous one.
  async fn set(&self, key: &str, value: String) -> Result<(), KvError>;
}
