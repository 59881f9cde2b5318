use serde::{Deserialize, Serialize};

use crate::edge::EdgeDef;
use crate::node::NodeDef;

/// A pipeline submission: an ordered node list and an edge list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineDef {
  #[serde(default)]
  pub nodes: Vec<NodeDef>,
  #[serde(default)]
  pub edges: Vec<EdgeDef>,
}

impl PipelineDef {
  pub fn new(nodes: Vec<NodeDef>, edges: Vec<EdgeDef>) -> Self {
    Self { nodes, edges }
  }

  /// Get a node by ID.
  pub fn get_node(&self, node_id: &str) -> Option<&NodeDef> {
    self.nodes.iter().find(|n| n.id == node_id)
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_deserialize_submission() {
    let json = r#"{
      "nodes": [
        {"id": "customInput-1", "type": "customInput", "position": {"x": 0, "y": 0},
         "data": {"inputName": "userName"}},
        {"id": "text-1", "type": "text", "data": {"text": "Hello {{userName}}!"}}
      ],
      "edges": [
        {"id": "e1", "source": "customInput-1", "target": "text-1"}
      ]
    }"#;

    let pipeline: PipelineDef = serde_json::from_str(json).unwrap();

    assert_eq!(pipeline.nodes.len(), 2);
    assert_eq!(pipeline.edges.len(), 1);
    assert_eq!(
      pipeline.get_node("customInput-1").unwrap().data_str("inputName"),
      Some("userName")
    );
  }

  #[test]
  fn test_missing_lists_default_to_empty() {
    let pipeline: PipelineDef = serde_json::from_str("{}").unwrap();
    assert!(pipeline.is_empty());
    assert!(pipeline.edges.is_empty());
  }
}
