//! Runtime configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the runtime and the default collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
  /// Overall timeout for external-call requests.
  pub http_timeout_ms: Option<u64>,
  /// Simulated latency of the local echo model.
  pub llm_delay_ms: u64,
  /// Upper bound on a single handler invocation. Unbounded when unset.
  pub node_timeout_ms: Option<u64>,
}

impl Default for RuntimeConfig {
  fn default() -> Self {
    Self {
      http_timeout_ms: Some(30_000),
      llm_delay_ms: 0,
      node_timeout_ms: None,
    }
  }
}

impl RuntimeConfig {
  pub fn http_timeout(&self) -> Option<Duration> {
    self.http_timeout_ms.map(Duration::from_millis)
  }

  pub fn llm_delay(&self) -> Duration {
    Duration::from_millis(self.llm_delay_ms)
  }

  pub fn node_timeout(&self) -> Option<Duration> {
    self.node_timeout_ms.map(Duration::from_millis)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_partial_config_uses_defaults() {
    let config: RuntimeConfig = serde_json::from_str(r#"{"node_timeout_ms": 250}"#).unwrap();

    assert_eq!(config.node_timeout(), Some(Duration::from_millis(250)));
    assert_eq!(config.http_timeout(), Some(Duration::from_secs(30)));
    assert_eq!(config.llm_delay(), Duration::ZERO);
  }
}
