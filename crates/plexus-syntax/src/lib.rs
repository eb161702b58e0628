//! Syntax tree shared by the plexus compiler and decompiler.
//!
//! - [`ast`] -- the statement/expression tree for the supported subset
//! - [`parse`] -- source text to [`ast::Module`], via tree-sitter
//! - [`render`] -- [`ast::Module`] back to source text
//! - [`error`] -- malformed and unsupported input

pub mod ast;
pub mod error;
pub mod parse;
pub mod render;

pub use ast::{Call, Expr, Keyword, Module, Span, Stmt};
pub use error::SyntaxError;
pub use parse::parse;
pub use render::{render, render_expr, RenderOptions};
