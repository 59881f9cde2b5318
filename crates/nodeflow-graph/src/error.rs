use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
  #[error("edge '{edge}' references unknown node '{node_id}'")]
  UnknownNodeReference { edge: String, node_id: String },

  #[error("duplicate node id: {0}")]
  DuplicateNode(String),

  #[error("circular dependency detected among nodes: {}", remaining.join(", "))]
  CyclicDependency { remaining: Vec<String> },
}
