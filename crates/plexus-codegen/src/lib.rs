//! Graph-to-code compilation for plexus graphs.
//!
//! This crate turns a validated node graph into a syntax tree and then
//! into rendered source text.
//!
//! # Modules
//!
//! - [`error`] -- Error types for compilation failures
//! - [`compiler`] -- Validation, tree building, and rendering

pub mod compiler;
pub mod error;

pub use compiler::{build_tree, build_tree_with, compile, compile_with};
pub use error::CompileError;

use plexus_syntax::RenderOptions;
use serde::{Deserialize, Serialize};

/// Options controlling rendered output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Spaces per indentation level.
    pub indent_width: usize,

    /// Whether non-empty output ends with a newline.
    pub trailing_newline: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            indent_width: 4,
            trailing_newline: true,
        }
    }
}

impl CompileOptions {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            indent_width: self.indent_width,
            trailing_newline: self.trailing_newline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_compile_options() {
        let opts = CompileOptions::default();
        assert_eq!(opts.indent_width, 4);
        assert!(opts.trailing_newline);
        assert_eq!(opts.render_options(), RenderOptions::default());
    }

    #[test]
    fn compile_options_serde_roundtrip() {
        let opts = CompileOptions {
            indent_width: 2,
            trailing_newline: false,
        };
        let json = serde_json::to_string(&opts).unwrap();
        let back: CompileOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, opts);
    }

    #[test]
    fn compile_options_fill_missing_fields() {
        let back: CompileOptions = serde_json::from_str(r#"{"indent_width": 8}"#).unwrap();
        assert_eq!(back.indent_width, 8);
        assert!(back.trailing_newline);
    }
}
