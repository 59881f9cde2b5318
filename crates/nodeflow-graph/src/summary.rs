//! Pipeline analysis without execution.

use nodeflow_config::PipelineDef;
use serde::{Deserialize, Serialize};

use crate::graph::DependencyGraph;

/// Aggregate metadata about a submitted pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
  pub num_nodes: usize,
  pub num_edges: usize,
  pub is_dag: bool,
}

impl PipelineSummary {
  /// Analyze a submission.
  ///
  /// Counts are taken from the submission as-is. Edges pointing at unknown
  /// nodes are ignored for the acyclicity check rather than rejected.
  pub fn analyze(pipeline: &PipelineDef) -> Self {
    let graph = DependencyGraph::build_lenient(&pipeline.nodes, &pipeline.edges);
    Self {
      num_nodes: pipeline.nodes.len(),
      num_edges: pipeline.edges.len(),
      is_dag: graph.is_acyclic(),
    }
  }
}

#[cfg(test)]
mod tests {
  use nodeflow_config::{EdgeDef, NodeDef};
  use serde_json::json;

  use super::*;

  #[test]
  fn test_analyze_dag() {
    let pipeline = PipelineDef::new(
      vec![NodeDef::new("a", "input"), NodeDef::new("b", "output")],
      vec![EdgeDef::new("a", "b")],
    );

    let summary = PipelineSummary::analyze(&pipeline);
    assert_eq!(
      summary,
      PipelineSummary {
        num_nodes: 2,
        num_edges: 1,
        is_dag: true
      }
    );
  }

  #[test]
  fn test_analyze_cycle_and_dangling_edge() {
    let pipeline = PipelineDef::new(
      vec![NodeDef::new("a", "text"), NodeDef::new("b", "text")],
      vec![
        EdgeDef::new("a", "b"),
        EdgeDef::new("b", "a"),
        EdgeDef::new("b", "gone"),
      ],
    );

    let summary = PipelineSummary::analyze(&pipeline);
    assert_eq!(summary.num_edges, 3);
    assert!(!summary.is_dag);
  }

  #[test]
  fn test_summary_json_shape() {
    let summary = PipelineSummary::analyze(&PipelineDef::default());
    assert_eq!(
      serde_json::to_value(summary).unwrap(),
      json!({ "num_nodes": 0, "num_edges": 0, "is_dag": true })
    );
  }
}
