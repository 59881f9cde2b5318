//! Nodeflow Config
//!
//! This crate contains the serializable pipeline submission types for nodeflow.
//! A submission is the flat node and edge list produced by the authoring surface,
//! before the engine builds a dependency graph from it.
//!
//! Submissions can be loaded from:
//! - JSON files (via CLI with `nodeflow run pipeline.json`)
//! - Any other source that produces the same JSON shape
//!
//! Node configuration arrives as an untyped `data` map. [`NodeKind::from_def`]
//! turns it into a typed, per-type configuration payload at dispatch time.

mod edge;
mod error;
mod kind;
mod node;
mod pipeline;

pub use edge::{DEFAULT_SOURCE_HANDLE, DEFAULT_TARGET_HANDLE, EdgeDef};
pub use error::NodeKindError;
pub use kind::{
  DatastoreConfig, DatastoreOperation, ExternalCallConfig, FilterConfig, FilterOperator,
  InputConfig, LlmCallConfig, NodeKind, OutputConfig, TextConfig, TransformConfig,
  TransformOperation,
};
pub use node::NodeDef;
pub use pipeline::PipelineDef;
