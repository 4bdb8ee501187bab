//! hn-model: the in-memory network model.
//!
//! Contains:
//! - registry (node IDs in use, fresh-ID generation)
//! - node (the node entity and per-type identity tables)
//! - nodes (one module per node type)
//! - edge (directed connections between nodes)
//! - config (solver/logging/allocation/results sections)
//! - model (the top-level model and its validation pass)

pub mod config;
pub mod edge;
pub mod model;
pub mod node;
pub mod nodes;
pub mod registry;

// Re-exports: nice ergonomics for downstream crates
pub use config::{Allocation, Compression, Logging, Results, Solver, Verbosity};
pub use edge::{EdgeRow, EdgeTable, EdgeType};
pub use model::{Model, TableVisitor, TableVisitorMut};
pub use node::{Node, NodeData, NodeRow, NodeTable};
pub use nodes::*;
pub use registry::UsedIds;
