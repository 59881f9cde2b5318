use serde::{Deserialize, Serialize};

/// Output port read from the source node when an edge names none.
pub const DEFAULT_SOURCE_HANDLE: &str = "output";

/// Input port the value is exposed under when an edge names none.
pub const DEFAULT_TARGET_HANDLE: &str = "input";

/// A directed, port-qualified connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDef {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  pub source: String,
  pub target: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_handle: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_handle: Option<String>,
}

impl EdgeDef {
  /// Create an edge between the default ports of two nodes.
  pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      id: None,
      source: source.into(),
      target: target.into(),
      source_handle: None,
      target_handle: None,
    }
  }

  /// Set the output port on the source side.
  pub fn from_handle(mut self, handle: impl Into<String>) -> Self {
    self.source_handle = Some(handle.into());
    self
  }

  /// Set the input port on the target side.
  pub fn to_handle(mut self, handle: impl Into<String>) -> Self {
    self.target_handle = Some(handle.into());
    self
  }

  /// The source port, falling back to [`DEFAULT_SOURCE_HANDLE`].
  pub fn source_handle_or_default(&self) -> &str {
    self
      .source_handle
      .as_deref()
      .unwrap_or(DEFAULT_SOURCE_HANDLE)
  }

  /// The target port, falling back to [`DEFAULT_TARGET_HANDLE`].
  pub fn target_handle_or_default(&self) -> &str {
    self
      .target_handle
      .as_deref()
      .unwrap_or(DEFAULT_TARGET_HANDLE)
  }

  /// A label for log and error messages.
  pub fn label(&self) -> String {
    match &self.id {
      Some(id) => id.clone(),
      None => format!("{}->{}", self.source, self.target),
    }
  }
}
