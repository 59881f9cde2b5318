//! Pipeline runtime.
//!
//! Validates and orders the graph, then dispatches nodes one at a time in
//! topological order, recording every transition in the caller's
//! [`ExecutionState`].

use std::collections::HashMap;

use nodeflow_config::{NodeDef, NodeKind, NodeKindError, PipelineDef};
use nodeflow_graph::{DependencyGraph, PipelineSummary};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::config::RuntimeConfig;
use crate::error::{HandlerError, RuntimeError};
use crate::events::{ExecutionEvent, ExecutionNotifier, NoopNotifier};
use crate::handlers::{self, HandlerContext, NodeInputs, NodeOutput};
use crate::resolver::VariableResolver;
use crate::services::Services;
use crate::state::{ExecutionState, NodeStatus};

/// Outcome of a successful run.
///
/// Per-node results and statuses stay in the [`ExecutionState`] that was
/// passed to [`Runtime::invoke`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvokeResult {
  pub execution_id: String,
  pub execution_order: Vec<String>,
  pub summary: PipelineSummary,
}

/// Runs pipelines against a fixed set of collaborators.
///
/// The runtime holds no per-run state, so one instance can serve any number
/// of sequential runs.
pub struct Runtime<N: ExecutionNotifier = NoopNotifier> {
  services: Services,
  config: RuntimeConfig,
  notifier: N,
}

impl Runtime<NoopNotifier> {
  pub fn new(services: Services, config: RuntimeConfig) -> Self {
    Self::with_notifier(services, config, NoopNotifier)
  }
}

impl<N: ExecutionNotifier> Runtime<N> {
  pub fn with_notifier(services: Services, config: RuntimeConfig, notifier: N) -> Self {
    Self {
      services,
      config,
      notifier,
    }
  }

  /// Execute a pipeline.
  ///
  /// The state is reset first, so it always describes this run only. The
  /// graph is validated and ordered before any node runs: structural errors
  /// leave every node `pending`. Afterwards the first failing node stops the
  /// run, leaving it `error`, its predecessors `completed` and everything
  /// after it `pending`.
  #[instrument(
    name = "runtime_invoke",
    skip(self, pipeline, state, cancel),
    fields(nodes = pipeline.nodes.len(), edges = pipeline.edges.len())
  )]
  pub async fn invoke(
    &self,
    pipeline: &PipelineDef,
    state: &mut ExecutionState,
    cancel: CancellationToken,
  ) -> Result<InvokeResult, RuntimeError> {
    let execution_id = uuid::Uuid::new_v4().to_string();

    state.reset(pipeline.nodes.iter().map(|n| n.id.as_str()));

    info!(
      execution_id = %execution_id,
      nodes = pipeline.nodes.len(),
      edges = pipeline.edges.len(),
      "pipeline_started"
    );
    self.notifier.notify(ExecutionEvent::PipelineStarted {
      execution_id: execution_id.clone(),
      node_count: pipeline.nodes.len(),
    });

    let result = self
      .run(pipeline, state, &execution_id, &cancel)
      .await
      .map(|()| InvokeResult {
        execution_id: execution_id.clone(),
        execution_order: state.execution_order().to_vec(),
        summary: PipelineSummary {
          num_nodes: pipeline.nodes.len(),
          num_edges: pipeline.edges.len(),
          is_dag: true,
        },
      });
    state.set_running(false);

    match &result {
      Ok(_) => {
        info!(execution_id = %execution_id, "pipeline_completed");
        self.notifier.notify(ExecutionEvent::PipelineCompleted {
          execution_id: execution_id.clone(),
        });
      }
      Err(e) => {
        error!(execution_id = %execution_id, error = %e, "pipeline_failed");
        self.notifier.notify(ExecutionEvent::PipelineFailed {
          execution_id: execution_id.clone(),
          error: e.to_string(),
        });
      }
    }

    result
  }

  /// Execute a single node in isolation.
  ///
  /// For debugging: the given inputs stand in for upstream results and no
  /// graph is built. Markers in text nodes only resolve against the node
  /// itself, so they usually come back as `[UNKNOWN: ...]`.
  #[instrument(name = "runtime_invoke_node", skip(self, node, inputs), fields(node_id = %node.id))]
  pub async fn invoke_node(
    &self,
    node: &NodeDef,
    inputs: NodeInputs,
  ) -> Result<serde_json::Value, RuntimeError> {
    let state = ExecutionState::new();
    let resolver = VariableResolver::new(std::slice::from_ref(node));

    let output = self.run_handler(node, &inputs, &state, &resolver).await?;
    for message in &output.warnings {
      warn!(node_id = %node.id, warning = %message, "variable_warning");
    }

    info!(node_id = %node.id, "invoke_node_completed");
    Ok(output.value)
  }

  async fn run(
    &self,
    pipeline: &PipelineDef,
    state: &mut ExecutionState,
    execution_id: &str,
    cancel: &CancellationToken,
  ) -> Result<(), RuntimeError> {
    let graph = DependencyGraph::build(&pipeline.nodes, &pipeline.edges)?;
    let order = graph.execution_order()?;

    info!(execution_id = %execution_id, order = ?order, "execution_order_computed");
    state.set_execution_order(order.clone());
    state.set_running(true);

    let nodes: HashMap<&str, &NodeDef> = pipeline
      .nodes
      .iter()
      .map(|n| (n.id.as_str(), n))
      .collect();
    let resolver = VariableResolver::new(&pipeline.nodes);

    for node_id in &order {
      if cancel.is_cancelled() {
        warn!(execution_id = %execution_id, next_node = %node_id, "pipeline cancelled");
        return Err(RuntimeError::Cancelled);
      }

      let node = nodes
        .get(node_id.as_str())
        .ok_or_else(|| RuntimeError::NodeNotFound {
          node_id: node_id.clone(),
        })?;

      self
        .dispatch(node, &graph, state, &resolver, execution_id)
        .await?;
    }

    Ok(())
  }

  /// Run one node and record the outcome.
  async fn dispatch(
    &self,
    node: &NodeDef,
    graph: &DependencyGraph,
    state: &mut ExecutionState,
    resolver: &VariableResolver,
    execution_id: &str,
  ) -> Result<(), RuntimeError> {
    let node_id = node.id.as_str();

    state.set_status(node_id, NodeStatus::Executing)?;
    info!(
      execution_id = %execution_id,
      node_id = %node_id,
      node_type = %node.node_type,
      "node_started"
    );
    self.notifier.notify(ExecutionEvent::NodeStarted {
      execution_id: execution_id.to_string(),
      node_id: node_id.to_string(),
    });

    let outcome = match gather_inputs(graph, node_id, state) {
      Ok(inputs) => self.run_handler(node, &inputs, state, resolver).await,
      Err(e) => Err(e),
    };

    match outcome {
      Ok(output) => {
        for message in output.warnings {
          warn!(
            execution_id = %execution_id,
            node_id = %node_id,
            warning = %message,
            "variable_warning"
          );
          state.add_warning(node_id, message.clone());
          self.notifier.notify(ExecutionEvent::VariableWarning {
            execution_id: execution_id.to_string(),
            node_id: node_id.to_string(),
            message,
          });
        }

        state.complete(node_id, output.value.clone())?;
        info!(execution_id = %execution_id, node_id = %node_id, "node_completed");
        self.notifier.notify(ExecutionEvent::NodeCompleted {
          execution_id: execution_id.to_string(),
          node_id: node_id.to_string(),
          result: output.value,
        });
        Ok(())
      }
      Err(e) => {
        state.set_status(node_id, NodeStatus::Error)?;
        error!(execution_id = %execution_id, node_id = %node_id, error = %e, "node_failed");
        self.notifier.notify(ExecutionEvent::NodeFailed {
          execution_id: execution_id.to_string(),
          node_id: node_id.to_string(),
          error: e.to_string(),
        });
        Err(e)
      }
    }
  }

  /// Parse the node's kind and run its handler under the node timeout.
  async fn run_handler(
    &self,
    node: &NodeDef,
    inputs: &NodeInputs,
    state: &ExecutionState,
    resolver: &VariableResolver,
  ) -> Result<NodeOutput, RuntimeError> {
    let kind = NodeKind::from_def(node).map_err(|e| match e {
      NodeKindError::UnknownType(node_type) => RuntimeError::UnknownNodeType {
        node_id: node.id.clone(),
        node_type,
      },
      other => RuntimeError::HandlerFailure {
        node_id: node.id.clone(),
        source: other.into(),
      },
    })?;

    let ctx = HandlerContext {
      node_id: &node.id,
      inputs,
      state,
      resolver,
      services: &self.services,
    };

    let result = match self.config.node_timeout() {
      Some(limit) => tokio::time::timeout(limit, handlers::execute(&kind, &ctx))
        .await
        .unwrap_or(Err(HandlerError::Timeout(limit))),
      None => handlers::execute(&kind, &ctx).await,
    };

    result.map_err(|source| RuntimeError::HandlerFailure {
      node_id: node.id.clone(),
      source,
    })
  }
}

/// Collect a node's inputs from its predecessors' stored results.
///
/// Each incoming edge contributes the source result's `source_handle` field
/// under `target_handle`. When the result is not an object or has no such
/// field, the whole result is passed instead. If several edges share a
/// target handle the last one wins.
fn gather_inputs(
  graph: &DependencyGraph,
  node_id: &str,
  state: &ExecutionState,
) -> Result<NodeInputs, RuntimeError> {
  let mut inputs = NodeInputs::new();

  for connection in graph.incoming(node_id) {
    let source_result =
      state
        .result(&connection.source)
        .ok_or_else(|| RuntimeError::MissingUpstreamResult {
          node_id: node_id.to_string(),
          source_node: connection.source.clone(),
        })?;

    let value = source_result
      .get(connection.source_handle.as_str())
      .unwrap_or(source_result)
      .clone();

    if inputs
      .insert(connection.target_handle.clone(), value)
      .is_some()
    {
      warn!(
        node_id = %node_id,
        handle = %connection.target_handle,
        "multiple edges into one handle, keeping the last"
      );
    }
  }

  Ok(inputs)
}
