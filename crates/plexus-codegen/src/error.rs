//! Compile error types.

use plexus_core::GraphError;

/// Errors that can occur while compiling a graph.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Structural validation rejected the graph.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Graph structure issue found after validation passed.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),
}
