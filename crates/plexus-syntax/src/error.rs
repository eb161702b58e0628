//! Syntax error types.

/// Errors raised while turning source text into a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// The text is not valid source code.
    #[error("invalid source code: syntax error at line {line}, column {column} near '{near}'")]
    Invalid {
        line: usize,
        column: usize,
        near: String,
    },

    /// Valid source code, but outside the supported subset.
    #[error("unsupported syntax: {construct} at line {line}, column {column}")]
    Unsupported {
        construct: String,
        line: usize,
        column: usize,
    },

    /// The grammar could not be loaded into the parser.
    #[error("failed to load the source grammar: {0}")]
    Language(String),
}
