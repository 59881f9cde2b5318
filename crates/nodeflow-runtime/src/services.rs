//! External collaborators available to node handlers.

use std::sync::Arc;

use nodeflow_host_http::{HttpClient, HttpError, ReqwestClient};
use nodeflow_host_kv::{InMemoryKvStore, KvStore};
use nodeflow_host_llm::{EchoModel, LanguageModel};

use crate::config::RuntimeConfig;

/// The capabilities the runtime hands to handlers that talk to the outside.
#[derive(Clone)]
pub struct Services {
  pub http: Arc<dyn HttpClient>,
  pub llm: Arc<dyn LanguageModel>,
  pub store: Arc<dyn KvStore>,
}

impl Services {
  pub fn new(
    http: Arc<dyn HttpClient>,
    llm: Arc<dyn LanguageModel>,
    store: Arc<dyn KvStore>,
  ) -> Self {
    Self { http, llm, store }
  }

  /// Default collaborators (reqwest and the echo model) over the given store.
  pub fn standard(config: &RuntimeConfig, store: Arc<dyn KvStore>) -> Result<Self, HttpError> {
    Ok(Self {
      http: Arc::new(ReqwestClient::new(config.http_timeout())?),
      llm: Arc::new(EchoModel::new(config.llm_delay())),
      store,
    })
  }

  /// Default collaborators with a process-local store.
  pub fn in_memory(config: &RuntimeConfig) -> Result<Self, HttpError> {
    Self::standard(config, Arc::new(InMemoryKvStore::new()))
  }
}
