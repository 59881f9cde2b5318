//! Nodeflow Graph
//!
//! This crate turns a flat pipeline submission into a dependency graph and
//! schedules it.
//!
//! - The [`DependencyGraph`] holds adjacency and in-degree maps, rebuilt fresh
//!   for every run and never mutated afterwards
//! - [`DependencyGraph::execution_order`] runs Kahn's algorithm with a FIFO
//!   queue and rejects cyclic graphs
//! - [`PipelineSummary`] reports node/edge counts and acyclicity without
//!   executing anything

mod error;
mod graph;
mod summary;

pub use error::GraphError;
pub use graph::{Connection, DependencyGraph};
pub use summary::PipelineSummary;
