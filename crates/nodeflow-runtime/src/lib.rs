//! Nodeflow Runtime
//!
//! This crate runs pipelines. It builds the dependency graph, computes the
//! execution order, dispatches each node to its type handler and records
//! per-node status and results in an [`ExecutionState`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Runtime                            │
//! │  - invoke(pipeline, state, cancel) → InvokeResult           │
//! │  - graph build + Kahn ordering before any node runs         │
//! │  - one node at a time, fail-fast                            │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Node handlers                         │
//! │  - input / text / transform / filter / output (local)       │
//! │  - llm-call / external-call / datastore (via Services)      │
//! │  - {{name}} markers resolved by VariableResolver            │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ExecutionState                         │
//! │  - status / result / warnings per node, execution order     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use nodeflow_runtime::{ExecutionState, Runtime, RuntimeConfig, Services};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = RuntimeConfig::default();
//! let services = Services::in_memory(&config)?;
//! let runtime = Runtime::new(services, config);
//!
//! let mut state = ExecutionState::new();
//! let result = runtime
//!     .invoke(&pipeline, &mut state, CancellationToken::new())
//!     .await?;
//!
//! for node_id in &result.execution_order {
//!     println!("{}: {:?}", node_id, state.status(node_id));
//! }
//! ```

mod config;
mod error;
mod events;
mod handlers;
mod resolver;
mod runtime;
mod services;
mod state;

pub use config::RuntimeConfig;
pub use error::{HandlerError, RuntimeError};
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use handlers::NodeInputs;
pub use resolver::{Resolution, VariableResolver};
pub use runtime::{InvokeResult, Runtime};
pub use services::Services;
pub use state::{ExecutionState, NodeStatus};
