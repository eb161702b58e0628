//! Source text rendering.
//!
//! One statement per line. Empty blocks get `pass`; an else-block holding a
//! single conditional is written as `elif`. Parentheses are inserted only
//! where operator precedence requires them.

use serde::{Deserialize, Serialize};

use plexus_core::ops::OperatorClass;

use crate::ast::{Call, Expr, Module, Stmt};

const PREC_UNARY: u8 = 13;
const PREC_ATOM: u8 = 16;

/// Layout options for rendered source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Spaces per indentation level.
    pub indent_width: usize,
    /// End non-empty output with a newline.
    pub trailing_newline: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            indent_width: 4,
            trailing_newline: true,
        }
    }
}

/// Renders a module as source text.
pub fn render(module: &Module, options: &RenderOptions) -> String {
    let mut printer = Printer {
        lines: Vec::new(),
        indent: " ".repeat(options.indent_width.max(1)),
    };
    for stmt in &module.body {
        printer.stmt(stmt, 0);
    }
    let mut out = printer.lines.join("\n");
    if options.trailing_newline && !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Renders a single expression.
pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Name(name) | Expr::Dotted(name) => name.clone(),
        Expr::Literal(text) => text.clone(),
        Expr::BinOp { left, op, right } => {
            let prec = op.precedence();
            let (left_parens, right_parens) = match op.class() {
                OperatorClass::Comparison => (precedence(left) <= prec, precedence(right) <= prec),
                _ if op.is_right_associative() => {
                    (precedence(left) <= prec, precedence(right) < prec)
                }
                _ => (precedence(left) < prec, precedence(right) <= prec),
            };
            format!(
                "{} {} {}",
                operand(left, left_parens),
                op.symbol(),
                operand(right, right_parens)
            )
        }
        Expr::Call(call) => render_call(call),
    }
}

fn render_call(call: &Call) -> String {
    let mut args: Vec<String> = call.args.iter().map(render_expr).collect();
    args.extend(
        call.keywords
            .iter()
            .map(|kw| format!("{}={}", kw.name, render_expr(&kw.value))),
    );
    format!("{}({})", call.func, args.join(", "))
}

fn operand(expr: &Expr, parens: bool) -> String {
    if parens {
        format!("({})", render_expr(expr))
    } else {
        render_expr(expr)
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::BinOp { op, .. } => op.precedence(),
        Expr::Literal(text) if text.starts_with('-') || text.starts_with('+') => PREC_UNARY,
        Expr::Name(_) | Expr::Dotted(_) | Expr::Literal(_) | Expr::Call(_) => PREC_ATOM,
    }
}

struct Printer {
    lines: Vec<String>,
    indent: String,
}

impl Printer {
    fn line(&mut self, depth: usize, text: String) {
        self.lines.push(format!("{}{}", self.indent.repeat(depth), text));
    }

    fn block(&mut self, body: &[Stmt], depth: usize) {
        if body.is_empty() {
            self.line(depth, "pass".to_string());
            return;
        }
        for stmt in body {
            self.stmt(stmt, depth);
        }
    }

    fn stmt(&mut self, stmt: &Stmt, depth: usize) {
        match stmt {
            Stmt::Assign { target, value, .. } => {
                self.line(depth, format!("{} = {}", target, render_expr(value)));
            }
            Stmt::Expr { value, .. } => self.line(depth, render_expr(value)),
            Stmt::If {
                test, body, orelse, ..
            } => self.conditional("if", test, body, orelse, depth),
            Stmt::For {
                target, iter, body, ..
            } => {
                self.line(depth, format!("for {} in {}:", target, render_expr(iter)));
                self.block(body, depth + 1);
            }
            Stmt::Pass { .. } => self.line(depth, "pass".to_string()),
        }
    }

    fn conditional(&mut self, keyword: &str, test: &Expr, body: &[Stmt], orelse: &[Stmt], depth: usize) {
        self.line(depth, format!("{} {}:", keyword, render_expr(test)));
        self.block(body, depth + 1);
        match orelse {
            [] => {}
            [Stmt::If {
                test, body, orelse, ..
            }] => self.conditional("elif", test, body, orelse, depth),
            _ => {
                self.line(depth, "else:".to_string());
                self.block(orelse, depth + 1);
            }
        }
    }
}
