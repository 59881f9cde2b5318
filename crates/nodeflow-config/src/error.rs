use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeKindError {
  #[error("unknown node type: {0}")]
  UnknownType(String),

  #[error("invalid configuration for {node_type} node: {message}")]
  InvalidConfig { node_type: String, message: String },
}
