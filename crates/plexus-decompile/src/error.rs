//! Decompile error types.

use plexus_syntax::SyntaxError;

/// Errors that can occur while decompiling source text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecompileError {
    /// The source was malformed, or outside the supported subset.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A construct that parses but has no graph form with the current
    /// registry (keyword arguments to an unregistered callee, for
    /// instance).
    #[error("unsupported syntax: {construct} at line {line}, column {column}")]
    Unsupported {
        construct: String,
        line: usize,
        column: usize,
    },
}
