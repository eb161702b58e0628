//! Graph model for plexus node graphs.
//!
//! A plexus graph is the JSON-serializable, node-based form of a small
//! imperative program. This crate owns the data model shared by the
//! compiler and the decompiler:
//!
//! - [`node`] -- nodes, node kinds, and input slots
//! - [`graph`] -- the top-level [`Graph`] and its flat id index
//! - [`ops`] -- the binary operator table
//! - [`registry`] -- the node-type registry (builtin kinds plus
//!   data-driven function definitions)
//! - [`validate`] -- eager structural validation
//! - [`dot`] -- Graphviz export of the data-flow links

pub mod dot;
pub mod error;
pub mod graph;
pub mod id;
pub mod node;
pub mod ops;
pub mod registry;
pub mod validate;

pub use error::{CoreError, GraphError};
pub use graph::{Graph, GraphIndex};
pub use id::NodeId;
pub use node::{InputSlot, Node, NodeKind, SlotSource};
pub use ops::BinaryOperator;
pub use registry::{FunctionSignature, KindSpec, NodeDefinition, Registry};
pub use validate::validate;
