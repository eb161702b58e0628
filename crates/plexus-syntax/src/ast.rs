//! Statement/expression tree for the supported subset.
//!
//! Literal expressions keep their exact source text: the graph model stores
//! literals as source fragments, so the tree never interprets them.
//!
//! Statements and calls carry a [`Span`] for error reporting. Spans never
//! take part in equality, so two trees built from differently formatted
//! text compare equal when their structure matches.

use plexus_core::BinaryOperator;

/// 1-based source position. Compiler-built trees use the default (0, 0).
#[derive(Debug, Clone, Copy, Default)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Span { line, column }
    }
}

impl PartialEq for Span {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Span {}

/// A whole source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `target = value`
    Assign {
        target: String,
        value: Expr,
        span: Span,
    },
    /// A call evaluated for its effect.
    Expr { value: Expr, span: Span },
    /// `if`/`elif`/`else`. An elif chain is an `orelse` holding exactly one
    /// `If`.
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
        span: Span,
    },
    /// `for target in iter:`
    For {
        target: String,
        iter: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    Pass { span: Span },
}

impl Stmt {
    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Stmt::Assign {
            target: target.into(),
            value,
            span: Span::default(),
        }
    }

    pub fn expr(value: Expr) -> Self {
        Stmt::Expr {
            value,
            span: Span::default(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Stmt::Assign { span, .. }
            | Stmt::Expr { span, .. }
            | Stmt::If { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Pass { span } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A variable reference.
    Name(String),
    /// An attribute path such as `math.pi`, kept as written.
    Dotted(String),
    /// Literal source text (`21`, `'OK'`, `-3.5`, `[1, 2]`).
    Literal(String),
    BinOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    Call(Call),
}

impl Expr {
    pub fn name(name: impl Into<String>) -> Self {
        Expr::Name(name.into())
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Expr::Literal(text.into())
    }

    pub fn binop(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::BinOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }
}

/// A call. The callee is a bare or dotted name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub func: String,
    pub args: Vec<Expr>,
    pub keywords: Vec<Keyword>,
    pub span: Span,
}

impl Call {
    pub fn new(func: impl Into<String>, args: Vec<Expr>) -> Self {
        Call {
            func: func.into(),
            args,
            keywords: Vec::new(),
            span: Span::default(),
        }
    }
}

/// `name=value` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub name: String,
    pub value: Expr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_do_not_affect_equality() {
        let a = Stmt::Pass { span: Span::new(1, 1) };
        let b = Stmt::Pass { span: Span::new(9, 4) };
        assert_eq!(a, b);
        assert_eq!(b.span().line, 9);
    }

    #[test]
    fn structure_does() {
        let a = Stmt::assign("x", Expr::literal("1"));
        let b = Stmt::assign("x", Expr::literal("1.0"));
        assert_ne!(a, b);
    }
}
