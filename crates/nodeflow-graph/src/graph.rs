use std::collections::{HashMap, HashSet, VecDeque};

use nodeflow_config::{EdgeDef, NodeDef};
use tracing::{debug, warn};

use crate::error::GraphError;

/// One edge as seen from the graph, with default handles filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
  pub source: String,
  pub target: String,
  pub source_handle: String,
  pub target_handle: String,
}

impl From<&EdgeDef> for Connection {
  fn from(edge: &EdgeDef) -> Self {
    Self {
      source: edge.source.clone(),
      target: edge.target.clone(),
      source_handle: edge.source_handle_or_default().to_string(),
      target_handle: edge.target_handle_or_default().to_string(),
    }
  }
}

/// Dependency graph for scheduling and input gathering.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
  /// Node ids in submission order.
  nodes: Vec<String>,
  /// Adjacency list: node_id -> outgoing connections.
  adjacency: HashMap<String, Vec<Connection>>,
  /// Reverse adjacency: node_id -> incoming connections.
  incoming: HashMap<String, Vec<Connection>>,
  /// Number of incoming edges per node.
  in_degree: HashMap<String, usize>,
  edge_count: usize,
}

impl DependencyGraph {
  /// Build a graph from nodes and edges.
  ///
  /// Every node appears in the adjacency and in-degree maps, including nodes
  /// without edges. Fails if an edge references a node that does not exist
  /// or if a node id is repeated.
  pub fn build(nodes: &[NodeDef], edges: &[EdgeDef]) -> Result<Self, GraphError> {
    let mut graph = Self::empty();

    for node in nodes {
      if !graph.add_node(&node.id) {
        return Err(GraphError::DuplicateNode(node.id.clone()));
      }
    }

    for edge in edges {
      if let Some(node_id) = graph.dangling_endpoint(edge) {
        return Err(GraphError::UnknownNodeReference {
          edge: edge.label(),
          node_id: node_id.to_string(),
        });
      }
      graph.connect(edge);
    }

    Ok(graph)
  }

  /// Build a graph, skipping dangling edges and repeated node ids instead of
  /// failing. Only suitable for analysis; never schedule from it.
  pub fn build_lenient(nodes: &[NodeDef], edges: &[EdgeDef]) -> Self {
    let mut graph = Self::empty();

    for node in nodes {
      if !graph.add_node(&node.id) {
        warn!(node_id = %node.id, "skipping duplicate node id");
      }
    }

    for edge in edges {
      if let Some(node_id) = graph.dangling_endpoint(edge) {
        debug!(edge = %edge.label(), node_id = %node_id, "skipping dangling edge");
        continue;
      }
      graph.connect(edge);
    }

    graph
  }

  fn empty() -> Self {
    Self {
      nodes: Vec::new(),
      adjacency: HashMap::new(),
      incoming: HashMap::new(),
      in_degree: HashMap::new(),
      edge_count: 0,
    }
  }

  /// Register a node in every map. Returns false if the id is already taken.
  fn add_node(&mut self, node_id: &str) -> bool {
    if self.in_degree.contains_key(node_id) {
      return false;
    }
    self.nodes.push(node_id.to_string());
    self.adjacency.insert(node_id.to_string(), Vec::new());
    self.incoming.insert(node_id.to_string(), Vec::new());
    self.in_degree.insert(node_id.to_string(), 0);
    true
  }

  /// The first endpoint of `edge` that is not a known node.
  fn dangling_endpoint<'e>(&self, edge: &'e EdgeDef) -> Option<&'e str> {
    [edge.source.as_str(), edge.target.as_str()]
      .into_iter()
      .find(|id| !self.in_degree.contains_key(*id))
  }

  /// Add an edge whose endpoints are both known.
  fn connect(&mut self, edge: &EdgeDef) {
    let connection = Connection::from(edge);
    if let Some(outgoing) = self.adjacency.get_mut(&edge.source) {
      outgoing.push(connection.clone());
    }
    if let Some(incoming) = self.incoming.get_mut(&edge.target) {
      incoming.push(connection);
    }
    if let Some(degree) = self.in_degree.get_mut(&edge.target) {
      *degree += 1;
    }
    self.edge_count += 1;
  }

  /// Compute the execution order with Kahn's algorithm.
  ///
  /// The queue is seeded with in-degree 0 nodes in submission order. Nodes
  /// that become ready later are appended in the order they become ready.
  /// If any node is never reached the graph has a cycle and the whole order
  /// is rejected.
  pub fn execution_order(&self) -> Result<Vec<String>, GraphError> {
    let mut in_degree = self.in_degree.clone();
    let mut queue: VecDeque<&str> = self
      .nodes
      .iter()
      .filter(|id| in_degree.get(id.as_str()) == Some(&0))
      .map(|id| id.as_str())
      .collect();

    let mut order = Vec::with_capacity(self.nodes.len());

    while let Some(current) = queue.pop_front() {
      order.push(current.to_string());

      for connection in self.outgoing(current) {
        if let Some(degree) = in_degree.get_mut(&connection.target) {
          *degree -= 1;
          if *degree == 0 {
            queue.push_back(connection.target.as_str());
          }
        }
      }
    }

    if order.len() < self.nodes.len() {
      let visited: HashSet<&str> = order.iter().map(|id| id.as_str()).collect();
      let remaining = self
        .nodes
        .iter()
        .filter(|id| !visited.contains(id.as_str()))
        .cloned()
        .collect();
      return Err(GraphError::CyclicDependency { remaining });
    }

    Ok(order)
  }

  /// Check whether the graph has no cycles.
  pub fn is_acyclic(&self) -> bool {
    self.execution_order().is_ok()
  }

  /// Get outgoing connections for a node.
  pub fn outgoing(&self, node_id: &str) -> &[Connection] {
    self
      .adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get incoming connections for a node.
  pub fn incoming(&self, node_id: &str) -> &[Connection] {
    self
      .incoming
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  pub fn in_degree(&self, node_id: &str) -> Option<usize> {
    self.in_degree.get(node_id).copied()
  }

  pub fn in_degrees(&self) -> &HashMap<String, usize> {
    &self.in_degree
  }

  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  pub fn edge_count(&self) -> usize {
    self.edge_count
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn nodes(ids: &[&str]) -> Vec<NodeDef> {
    ids.iter().map(|id| NodeDef::new(*id, "text")).collect()
  }

  fn edges(pairs: &[(&str, &str)]) -> Vec<EdgeDef> {
    pairs.iter().map(|(s, t)| EdgeDef::new(*s, *t)).collect()
  }

  fn assert_topological(order: &[String], ids: &[&str], pairs: &[(&str, &str)]) {
    assert_eq!(order.len(), ids.len());
    for id in ids {
      assert_eq!(order.iter().filter(|o| o == id).count(), 1, "{} once", id);
    }
    let position = |id: &str| order.iter().position(|o| o == id).unwrap();
    for (source, target) in pairs {
      assert!(
        position(*source) < position(*target),
        "{} must precede {}",
        source,
        target
      );
    }
  }

  #[test]
  fn test_isolated_nodes_present_in_all_maps() {
    let graph = DependencyGraph::build(&nodes(&["a", "b", "c"]), &edges(&[("a", "b")])).unwrap();

    assert_eq!(graph.in_degree("a"), Some(0));
    assert_eq!(graph.in_degree("b"), Some(1));
    assert_eq!(graph.in_degree("c"), Some(0));
    assert!(graph.outgoing("c").is_empty());
    assert_eq!(graph.in_degrees().len(), 3);
  }

  #[test]
  fn test_connection_default_handles() {
    let edge = EdgeDef::new("a", "b").from_handle("a-value");
    let graph = DependencyGraph::build(&nodes(&["a", "b"]), &[edge]).unwrap();

    let incoming = graph.incoming("b");
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].source_handle, "a-value");
    assert_eq!(incoming[0].target_handle, "input");
  }

  #[test]
  fn test_unknown_node_reference() {
    let err = DependencyGraph::build(&nodes(&["a"]), &edges(&[("a", "ghost")])).unwrap_err();
    assert!(matches!(
      err,
      GraphError::UnknownNodeReference { ref node_id, .. } if node_id == "ghost"
    ));

    let err = DependencyGraph::build(&nodes(&["a"]), &edges(&[("ghost", "a")])).unwrap_err();
    assert!(matches!(err, GraphError::UnknownNodeReference { .. }));
  }

  #[test]
  fn test_duplicate_node() {
    let err = DependencyGraph::build(&nodes(&["a", "a"]), &[]).unwrap_err();
    assert!(matches!(err, GraphError::DuplicateNode(id) if id == "a"));
  }

  #[test]
  fn test_linear_order() {
    let ids = ["a", "b", "c"];
    let pairs = [("a", "b"), ("b", "c")];
    let graph = DependencyGraph::build(&nodes(&ids), &edges(&pairs)).unwrap();

    let order = graph.execution_order().unwrap();
    assert_eq!(order, vec!["a", "b", "c"]);
  }

  #[test]
  fn test_reverse_submission_order() {
    // Submission order must not override edge direction.
    let ids = ["c", "b", "a"];
    let pairs = [("a", "b"), ("b", "c")];
    let graph = DependencyGraph::build(&nodes(&ids), &edges(&pairs)).unwrap();

    assert_eq!(graph.execution_order().unwrap(), vec!["a", "b", "c"]);
  }

  #[test]
  fn test_diamond_with_fan_out_and_join() {
    let ids = ["src", "left", "right", "join", "sink", "lonely"];
    let pairs = [
      ("src", "left"),
      ("src", "right"),
      ("left", "join"),
      ("right", "join"),
      ("join", "sink"),
      ("src", "sink"),
    ];
    let graph = DependencyGraph::build(&nodes(&ids), &edges(&pairs)).unwrap();

    let order = graph.execution_order().unwrap();
    assert_topological(&order, &ids, &pairs);
    assert_eq!(order, vec!["src", "lonely", "left", "right", "join", "sink"]);
  }

  #[test]
  fn test_fifo_tie_break_follows_readiness() {
    // d becomes ready before c, so it runs first even though c was
    // submitted earlier.
    let ids = ["a", "b", "c", "d"];
    let pairs = [("a", "d"), ("b", "c")];
    let graph = DependencyGraph::build(&nodes(&ids), &edges(&pairs)).unwrap();

    assert_eq!(graph.execution_order().unwrap(), vec!["a", "b", "d", "c"]);
  }

  #[test]
  fn test_parallel_edges_between_same_nodes() {
    let a_to_b = EdgeDef::new("a", "b");
    let a_to_b_prompt = EdgeDef::new("a", "b").to_handle("prompt");
    let graph = DependencyGraph::build(&nodes(&["a", "b"]), &[a_to_b, a_to_b_prompt]).unwrap();

    assert_eq!(graph.in_degree("b"), Some(2));
    assert_eq!(graph.execution_order().unwrap(), vec!["a", "b"]);
  }

  #[test]
  fn test_two_node_cycle() {
    let graph =
      DependencyGraph::build(&nodes(&["A", "B"]), &edges(&[("A", "B"), ("B", "A")])).unwrap();

    let err = graph.execution_order().unwrap_err();
    assert!(matches!(
      err,
      GraphError::CyclicDependency { ref remaining } if remaining == &["A", "B"]
    ));
    assert!(!graph.is_acyclic());
  }

  #[test]
  fn test_cycle_downstream_of_valid_prefix() {
    let ids = ["root", "x", "y", "z"];
    let pairs = [("root", "x"), ("x", "y"), ("y", "z"), ("z", "x")];
    let graph = DependencyGraph::build(&nodes(&ids), &edges(&pairs)).unwrap();

    match graph.execution_order() {
      Err(GraphError::CyclicDependency { remaining }) => {
        assert_eq!(remaining, vec!["x", "y", "z"]);
      }
      other => panic!("expected cycle, got {:?}", other),
    }
  }

  #[test]
  fn test_self_loop() {
    let graph = DependencyGraph::build(&nodes(&["a"]), &edges(&[("a", "a")])).unwrap();
    assert!(graph.execution_order().is_err());
  }

  #[test]
  fn test_empty_graph() {
    let graph = DependencyGraph::build(&[], &[]).unwrap();
    assert!(graph.execution_order().unwrap().is_empty());
    assert!(graph.is_acyclic());
  }

  #[test]
  fn test_lenient_skips_dangling_edges() {
    let graph = DependencyGraph::build_lenient(
      &nodes(&["a", "b", "a"]),
      &edges(&[("a", "b"), ("b", "ghost")]),
    );

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.is_acyclic());
  }

  #[test]
  fn test_lenient_still_detects_cycles() {
    let graph = DependencyGraph::build_lenient(
      &nodes(&["a", "b"]),
      &edges(&[("a", "b"), ("b", "a"), ("a", "ghost")]),
    );

    assert_eq!(graph.edge_count(), 2);
    assert!(!graph.is_acyclic());
  }
}
