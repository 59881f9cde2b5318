use serde::{Deserialize, Serialize};

/// A node as submitted by the authoring surface.
///
/// The `type` tag is kept as a raw string so that a submission containing a
/// type the engine does not know still loads; the node only fails when the
/// dispatcher reaches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
  pub id: String,
  #[serde(rename = "type")]
  pub node_type: String,
  #[serde(default)]
  pub data: serde_json::Map<String, serde_json::Value>,
}

impl NodeDef {
  pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      node_type: node_type.into(),
      data: serde_json::Map::new(),
    }
  }

  /// Add a configuration entry.
  pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
    self.data.insert(key.into(), value.into());
    self
  }

  /// Read a string configuration entry.
  pub fn data_str(&self, key: &str) -> Option<&str> {
    self.data.get(key).and_then(|v| v.as_str())
  }
}
