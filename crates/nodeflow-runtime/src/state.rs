//! Execution state for a single pipeline run.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

/// Lifecycle of a node within one run.
///
/// Statuses only move forward: `Pending → Executing → Completed | Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
  Pending,
  Executing,
  Completed,
  Error,
}

impl NodeStatus {
  pub fn can_transition_to(self, next: NodeStatus) -> bool {
    matches!(
      (self, next),
      (NodeStatus::Pending, NodeStatus::Executing)
        | (NodeStatus::Executing, NodeStatus::Completed)
        | (NodeStatus::Executing, NodeStatus::Error)
    )
  }
}

impl fmt::Display for NodeStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      NodeStatus::Pending => "pending",
      NodeStatus::Executing => "executing",
      NodeStatus::Completed => "completed",
      NodeStatus::Error => "error",
    };
    f.write_str(name)
  }
}

/// Per-node status, results and warnings for the most recent run.
///
/// The state is owned by the caller and passed to the runtime by mutable
/// reference, so it can be inspected once a run finishes or fails. A node is
/// only ever marked `Completed` after its result has been stored.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionState {
  statuses: HashMap<String, NodeStatus>,
  results: HashMap<String, serde_json::Value>,
  warnings: HashMap<String, Vec<String>>,
  execution_order: Vec<String>,
  running: bool,
}

impl ExecutionState {
  pub fn new() -> Self {
    Self::default()
  }

  /// Clear everything from a previous run and mark every given node pending.
  pub fn reset<'a>(&mut self, node_ids: impl IntoIterator<Item = &'a str>) {
    self.statuses.clear();
    self.results.clear();
    self.warnings.clear();
    self.execution_order.clear();
    self.running = false;

    for node_id in node_ids {
      self.statuses.insert(node_id.to_string(), NodeStatus::Pending);
    }
  }

  /// Move a node to a new status.
  ///
  /// Fails on backward or skipping transitions, and on `Completed` when no
  /// result has been stored yet.
  pub fn set_status(&mut self, node_id: &str, status: NodeStatus) -> Result<(), RuntimeError> {
    let current = self.current_status(node_id)?;

    let result_missing = status == NodeStatus::Completed && !self.results.contains_key(node_id);
    if !current.can_transition_to(status) || result_missing {
      return Err(RuntimeError::InvalidTransition {
        node_id: node_id.to_string(),
        from: current,
        to: status,
      });
    }

    self.statuses.insert(node_id.to_string(), status);
    Ok(())
  }

  /// Store the result of an executing node.
  pub fn set_result(
    &mut self,
    node_id: &str,
    result: serde_json::Value,
  ) -> Result<(), RuntimeError> {
    let current = self.current_status(node_id)?;
    if current != NodeStatus::Executing {
      return Err(RuntimeError::InvalidTransition {
        node_id: node_id.to_string(),
        from: current,
        to: NodeStatus::Completed,
      });
    }

    self.results.insert(node_id.to_string(), result);
    Ok(())
  }

  /// Store a result and mark the node completed.
  pub fn complete(&mut self, node_id: &str, result: serde_json::Value) -> Result<(), RuntimeError> {
    self.set_result(node_id, result)?;
    self.set_status(node_id, NodeStatus::Completed)
  }

  pub fn add_warning(&mut self, node_id: &str, message: impl Into<String>) {
    self
      .warnings
      .entry(node_id.to_string())
      .or_default()
      .push(message.into());
  }

  pub fn status(&self, node_id: &str) -> Option<NodeStatus> {
    self.statuses.get(node_id).copied()
  }

  pub fn statuses(&self) -> &HashMap<String, NodeStatus> {
    &self.statuses
  }

  pub fn result(&self, node_id: &str) -> Option<&serde_json::Value> {
    self.results.get(node_id)
  }

  pub fn results(&self) -> &HashMap<String, serde_json::Value> {
    &self.results
  }

  pub fn warnings(&self, node_id: &str) -> &[String] {
    self.warnings.get(node_id).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn execution_order(&self) -> &[String] {
    &self.execution_order
  }

  pub fn set_execution_order(&mut self, order: Vec<String>) {
    self.execution_order = order;
  }

  pub fn is_running(&self) -> bool {
    self.running
  }

  pub fn set_running(&mut self, running: bool) {
    self.running = running;
  }

  fn current_status(&self, node_id: &str) -> Result<NodeStatus, RuntimeError> {
    self
      .status(node_id)
      .ok_or_else(|| RuntimeError::NodeNotFound {
        node_id: node_id.to_string(),
      })
  }
}
