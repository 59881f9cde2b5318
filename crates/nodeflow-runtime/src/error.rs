//! Runtime error types.

use std::time::Duration;

use nodeflow_config::NodeKindError;
use nodeflow_graph::GraphError;
use nodeflow_host_http::HttpError;
use nodeflow_host_kv::KvError;
use nodeflow_host_llm::LlmError;

use crate::state::NodeStatus;

/// Errors that can occur during a pipeline run.
///
/// Structural errors (`Graph`) are raised before any node executes. Every
/// other variant stops the run at the node that raised it.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
  /// Invalid pipeline structure: unknown edge endpoint, duplicate id or cycle.
  #[error(transparent)]
  Graph(#[from] GraphError),

  /// An upstream node has no result although it precedes this node.
  #[error("node '{node_id}' has no result from upstream node '{source_node}'")]
  MissingUpstreamResult { node_id: String, source_node: String },

  /// The node's type tag is not one the engine can run.
  #[error("node '{node_id}' has unknown type '{node_type}'")]
  UnknownNodeType { node_id: String, node_type: String },

  /// The type handler failed.
  #[error("node '{node_id}' failed: {source}")]
  HandlerFailure {
    node_id: String,
    #[source]
    source: HandlerError,
  },

  /// A status change that would move a node backwards.
  #[error("invalid status transition for node '{node_id}': {from} -> {to}")]
  InvalidTransition {
    node_id: String,
    from: NodeStatus,
    to: NodeStatus,
  },

  /// Node not found in the current run.
  #[error("node '{node_id}' not found in pipeline")]
  NodeNotFound { node_id: String },

  /// Execution was cancelled.
  #[error("execution cancelled")]
  Cancelled,
}

/// Errors raised by individual node handlers.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
  #[error(transparent)]
  Config(#[from] NodeKindError),

  #[error("missing configuration: {0}")]
  MissingConfig(&'static str),

  #[error("external call failed: {0}")]
  Http(#[from] HttpError),

  #[error("language model call failed: {0}")]
  Llm(#[from] LlmError),

  #[error("datastore operation failed: {0}")]
  Store(#[from] KvError),

  #[error("template rendering failed: {0}")]
  Template(#[from] minijinja::Error),

  #[error("invalid JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("handler timed out after {0:?}")]
  Timeout(Duration),
}
