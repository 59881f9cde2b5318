use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use nodeflow_config::PipelineDef;
use nodeflow_graph::PipelineSummary;
use nodeflow_host_kv::FsKvStore;
use nodeflow_runtime::{ExecutionState, NodeInputs, Runtime, RuntimeConfig, Services};

/// Nodeflow - run node-based processing pipelines
#[derive(Parser)]
#[command(name = "nodeflow")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.nodeflow)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Execute a pipeline and print every node's status and result
  Run {
    /// Path to the pipeline file (JSON)
    pipeline_file: PathBuf,

    /// Run only this node, reading its inputs as a JSON object from stdin
    #[arg(long)]
    node: Option<String>,

    /// Timeout for external-call requests in milliseconds
    #[arg(long)]
    http_timeout_ms: Option<u64>,

    /// Simulated latency of the echo model in milliseconds
    #[arg(long)]
    llm_delay_ms: Option<u64>,

    /// Upper bound on a single node in milliseconds
    #[arg(long)]
    node_timeout_ms: Option<u64>,
  },

  /// Report node count, edge count and whether the pipeline is acyclic
  Parse {
    /// Path to the pipeline file (JSON)
    pipeline_file: PathBuf,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".nodeflow"),
  };

  match cli.command {
    Some(Commands::Run {
      pipeline_file,
      node,
      http_timeout_ms,
      llm_delay_ms,
      node_timeout_ms,
    }) => {
      let mut config = RuntimeConfig::default();
      if http_timeout_ms.is_some() {
        config.http_timeout_ms = http_timeout_ms;
      }
      if let Some(delay) = llm_delay_ms {
        config.llm_delay_ms = delay;
      }
      config.node_timeout_ms = node_timeout_ms;

      let rt = tokio::runtime::Runtime::new()?;
      match node {
        Some(node_id) => rt.block_on(run_node(&pipeline_file, &node_id, &data_dir, config))?,
        None => rt.block_on(run_pipeline(&pipeline_file, &data_dir, config))?,
      }
    }
    Some(Commands::Parse { pipeline_file }) => {
      let pipeline = load_pipeline(&pipeline_file)?;
      let summary = PipelineSummary::analyze(&pipeline);
      println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    None => {
      println!("nodeflow - use --help to see available commands");
    }
  }

  Ok(())
}

fn load_pipeline(path: &Path) -> Result<PipelineDef> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read pipeline file: {}", path.display()))?;

  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse pipeline file: {}", path.display()))
}

/// An empty submission is rejected before any runtime is built.
fn ensure_runnable(pipeline: &PipelineDef) -> Result<()> {
  if pipeline.is_empty() {
    bail!("pipeline has no nodes; add nodes before running");
  }
  Ok(())
}

fn build_runtime(data_dir: &Path, config: RuntimeConfig) -> Result<Runtime> {
  let store = Arc::new(FsKvStore::new(data_dir.join("store")));
  let services = Services::standard(&config, store).context("failed to create http client")?;
  Ok(Runtime::new(services, config))
}

async fn run_pipeline(pipeline_file: &Path, data_dir: &Path, config: RuntimeConfig) -> Result<()> {
  let pipeline = load_pipeline(pipeline_file)?;
  ensure_runnable(&pipeline)?;

  eprintln!(
    "Loaded pipeline: {} nodes, {} edges",
    pipeline.nodes.len(),
    pipeline.edges.len()
  );

  let runtime = build_runtime(data_dir, config)?;

  let cancel = CancellationToken::new();
  let on_interrupt = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      warn!("interrupt received, stopping after the current node");
      on_interrupt.cancel();
    }
  });

  let mut state = ExecutionState::new();
  let outcome = runtime.invoke(&pipeline, &mut state, cancel).await;

  let nodes: serde_json::Map<String, serde_json::Value> = pipeline
    .nodes
    .iter()
    .map(|node| {
      let report = json!({
        "status": state.status(&node.id),
        "result": state.result(&node.id),
        "warnings": state.warnings(&node.id),
      });
      (node.id.clone(), report)
    })
    .collect();

  let report = match &outcome {
    Ok(result) => json!({
      "execution_id": result.execution_id,
      "execution_order": result.execution_order,
      "summary": result.summary,
      "nodes": nodes,
    }),
    Err(e) => json!({
      "execution_order": state.execution_order(),
      "error": e.to_string(),
      "nodes": nodes,
    }),
  };
  println!("{}", serde_json::to_string_pretty(&report)?);

  let result = outcome.context("pipeline execution failed")?;
  eprintln!("Execution completed: {}", result.execution_id);

  Ok(())
}

async fn run_node(
  pipeline_file: &Path,
  node_id: &str,
  data_dir: &Path,
  config: RuntimeConfig,
) -> Result<()> {
  let pipeline = load_pipeline(pipeline_file)?;
  let node = pipeline
    .get_node(node_id)
    .with_context(|| format!("node '{}' not found in pipeline", node_id))?;

  eprintln!("Running node: {} (type: {})", node.id, node.node_type);

  let inputs = read_inputs_from_stdin()?;
  let runtime = build_runtime(data_dir, config)?;

  let result = runtime
    .invoke_node(node, inputs)
    .await
    .context("node execution failed")?;

  println!("{}", serde_json::to_string_pretty(&result)?);

  Ok(())
}

fn read_inputs_from_stdin() -> Result<NodeInputs> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    return Ok(NodeInputs::new());
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read node inputs from stdin")?;

  if input.trim().is_empty() {
    Ok(NodeInputs::new())
  } else {
    serde_json::from_str(&input).context("node inputs must be a JSON object keyed by handle")
  }
}

#[cfg(test)]
mod tests {
  use nodeflow_config::{EdgeDef, NodeDef};

  use super::*;

  #[test]
  fn test_empty_pipeline_rejected() {
    let err = ensure_runnable(&PipelineDef::default()).unwrap_err();
    assert!(err.to_string().contains("no nodes"));
  }

  #[test]
  fn test_pipeline_with_nodes_accepted() {
    let pipeline = PipelineDef::new(
      vec![NodeDef::new("A", "input"), NodeDef::new("B", "output")],
      vec![EdgeDef::new("A", "B")],
    );
    assert!(ensure_runnable(&pipeline).is_ok());
  }
}
