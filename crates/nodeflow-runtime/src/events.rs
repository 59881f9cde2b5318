//! Execution events and notifiers.
//!
//! The runtime emits an event at every pipeline and node boundary so that
//! callers can stream progress or persist it without polling the state.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted during a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExecutionEvent {
  PipelineStarted {
    execution_id: String,
    node_count: usize,
  },

  NodeStarted {
    execution_id: String,
    node_id: String,
  },

  NodeCompleted {
    execution_id: String,
    node_id: String,
    result: serde_json::Value,
  },

  NodeFailed {
    execution_id: String,
    node_id: String,
    error: String,
  },

  /// A `{{name}}` marker could not be resolved cleanly.
  VariableWarning {
    execution_id: String,
    node_id: String,
    message: String,
  },

  PipelineCompleted {
    execution_id: String,
  },

  PipelineFailed {
    execution_id: String,
    error: String,
  },
}

impl ExecutionEvent {
  pub fn execution_id(&self) -> &str {
    match self {
      ExecutionEvent::PipelineStarted { execution_id, .. }
      | ExecutionEvent::NodeStarted { execution_id, .. }
      | ExecutionEvent::NodeCompleted { execution_id, .. }
      | ExecutionEvent::NodeFailed { execution_id, .. }
      | ExecutionEvent::VariableWarning { execution_id, .. }
      | ExecutionEvent::PipelineCompleted { execution_id }
      | ExecutionEvent::PipelineFailed { execution_id, .. } => execution_id,
    }
  }
}

/// Receiver of execution events.
///
/// `notify` is called inline by the runtime and must not block.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// Forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // Unbounded so a slow consumer never stalls a run. Volume is a handful of
  // events per node.
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }

  /// Create a notifier together with its receiving end.
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<ExecutionEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self::new(sender), receiver)
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
