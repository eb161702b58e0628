//! Source text to [`Module`], via tree-sitter.
//!
//! The concrete tree is lowered node by node. Anything outside the
//! supported subset is rejected with the position of the offending
//! construct; malformed text is rejected with the position of the first
//! error node the grammar recovered from.
//!
//! The grammar recovers from some indentation mistakes without leaving an
//! error node, so block layout is checked again here: every block holds at
//! least one statement, its statements share one column deeper than the
//! owning header, and top-level statements start at column 1.

use tree_sitter::{Node, Parser};

use plexus_core::ops::OperatorClass;
use plexus_core::validate::is_identifier;
use plexus_core::BinaryOperator;

use crate::ast::{Call, Expr, Keyword, Module, Span, Stmt};
use crate::error::SyntaxError;

/// Longest excerpt quoted in a syntax error.
const NEAR_LIMIT: usize = 40;

/// Parses source text into a [`Module`].
pub fn parse(source: &str) -> Result<Module, SyntaxError> {
    let mut parser = Parser::new();
    parser
        .set_language(tree_sitter_python::language())
        .map_err(|err| SyntaxError::Language(format!("{err:?}")))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| SyntaxError::Language("parser produced no tree".into()))?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(invalid(root, source.as_bytes()));
    }

    let lowering = Lowering {
        source: source.as_bytes(),
    };
    let body = lowering.module(root)?;
    tracing::debug!(statements = body.len(), "parsed source");
    Ok(Module { body })
}

fn invalid(root: Node<'_>, source: &[u8]) -> SyntaxError {
    let node = first_error(root).unwrap_or(root);
    if node.is_missing() {
        let position = node.start_position();
        return SyntaxError::Invalid {
            line: position.row + 1,
            column: position.column + 1,
            near: format!("missing {}", node.kind()),
        };
    }
    malformed(node, source)
}

/// Invalid source at `node`, quoting the start of its first line.
fn malformed(node: Node<'_>, source: &[u8]) -> SyntaxError {
    let span = span_of(node);
    let text = node.utf8_text(source).unwrap_or("");
    let line = text.lines().next().unwrap_or("").trim();
    SyntaxError::Invalid {
        line: span.line,
        column: span.column,
        near: line.chars().take(NEAR_LIMIT).collect(),
    }
}

/// Depth-first search for the first error or missing node.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            continue;
        }
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                stack.push(child);
            }
        }
    }
    None
}

fn span_of(node: Node<'_>) -> Span {
    let position = node.start_position();
    Span::new(position.row + 1, position.column + 1)
}

fn unsupported(construct: impl Into<String>, node: Node<'_>) -> SyntaxError {
    let span = span_of(node);
    SyntaxError::Unsupported {
        construct: construct.into(),
        line: span.line,
        column: span.column,
    }
}

/// Human name for a grammar node kind.
fn describe(kind: &str) -> String {
    let name = match kind {
        "while_statement" => "while loop",
        "function_definition" => "function definition",
        "class_definition" => "class definition",
        "decorated_definition" => "decorated definition",
        "import_statement" | "import_from_statement" | "future_import_statement" => "import",
        "return_statement" => "return statement",
        "augmented_assignment" => "augmented assignment",
        "try_statement" => "try statement",
        "with_statement" => "with statement",
        "lambda" => "lambda",
        "subscript" => "subscript",
        "conditional_expression" => "conditional expression",
        "not_operator" => "'not' operator",
        "list_comprehension" | "set_comprehension" | "dictionary_comprehension" => {
            "comprehension"
        }
        "generator_expression" => "generator expression",
        other => return other.replace('_', " "),
    };
    name.to_string()
}

fn is_trivia(node: Node<'_>) -> bool {
    node.kind() == "comment"
}

struct Lowering<'s> {
    source: &'s [u8],
}

impl<'s> Lowering<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn field<'t>(&self, node: Node<'t>, name: &str) -> Result<Node<'t>, SyntaxError> {
        node.child_by_field_name(name)
            .ok_or_else(|| unsupported(describe(node.kind()), node))
    }

    fn named<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| !is_trivia(*child))
            .collect()
    }

    fn malformed(&self, node: Node<'_>) -> SyntaxError {
        malformed(node, self.source)
    }

    fn module(&self, root: Node<'_>) -> Result<Vec<Stmt>, SyntaxError> {
        let children = self.named(root);
        self.aligned(&children, 0)?;
        self.statements(children)
    }

    /// Lowers the indented block of `owner`, a compound statement or one of
    /// its clauses.
    fn suite(&self, owner: Node<'_>, block: Node<'_>) -> Result<Vec<Stmt>, SyntaxError> {
        let children = self.named(block);
        let Some(first) = children.first() else {
            return Err(self.malformed(owner));
        };
        let column = first.start_position().column;
        if column <= owner.start_position().column {
            return Err(self.malformed(*first));
        }
        self.aligned(&children, column)?;
        self.statements(children)
    }

    /// Every statement that begins a line must start at `column`.
    /// Statements after a `;` or on a header line are exempt.
    fn aligned(&self, children: &[Node<'_>], column: usize) -> Result<(), SyntaxError> {
        let misplaced = children
            .iter()
            .find(|child| self.starts_line(**child) && child.start_position().column != column);
        match misplaced {
            Some(child) => Err(self.malformed(*child)),
            None => Ok(()),
        }
    }

    fn starts_line(&self, node: Node<'_>) -> bool {
        let start = node.start_byte();
        let before = &self.source[..start];
        let line_start = before.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
        before[line_start..].iter().all(|b| matches!(b, b' ' | b'\t' | b'\x0c'))
    }

    fn statements(&self, children: Vec<Node<'_>>) -> Result<Vec<Stmt>, SyntaxError> {
        children
            .into_iter()
            .map(|child| self.statement(child))
            .collect()
    }

    /// A name node whose text is a reserved word only appears when the
    /// grammar recovered from a misplaced keyword.
    fn name(&self, node: Node<'_>) -> Result<String, SyntaxError> {
        let text = self.text(node);
        if is_identifier(text) {
            Ok(text.to_string())
        } else {
            Err(self.malformed(node))
        }
    }

    fn statement(&self, node: Node<'_>) -> Result<Stmt, SyntaxError> {
        let span = span_of(node);
        match node.kind() {
            "expression_statement" => self.expression_statement(node),
            "if_statement" => {
                let test = self.expr(self.field(node, "condition")?)?;
                let body = self.suite(node, self.field(node, "consequence")?)?;
                let mut cursor = node.walk();
                let alternatives: Vec<Node<'_>> = node
                    .children_by_field_name("alternative", &mut cursor)
                    .collect();
                let orelse = self.alternatives(&alternatives)?;
                Ok(Stmt::If {
                    test,
                    body,
                    orelse,
                    span,
                })
            }
            "for_statement" => self.for_statement(node),
            "pass_statement" => Ok(Stmt::Pass { span }),
            other => Err(unsupported(describe(other), node)),
        }
    }

    /// Folds `elif`/`else` clauses into nested `orelse` blocks.
    fn alternatives(&self, clauses: &[Node<'_>]) -> Result<Vec<Stmt>, SyntaxError> {
        let Some((clause, rest)) = clauses.split_first() else {
            return Ok(Vec::new());
        };
        match clause.kind() {
            "elif_clause" => {
                let test = self.expr(self.field(*clause, "condition")?)?;
                let body = self.suite(*clause, self.field(*clause, "consequence")?)?;
                let orelse = self.alternatives(rest)?;
                Ok(vec![Stmt::If {
                    test,
                    body,
                    orelse,
                    span: span_of(*clause),
                }])
            }
            "else_clause" => self.suite(*clause, self.field(*clause, "body")?),
            other => Err(unsupported(describe(other), *clause)),
        }
    }

    fn for_statement(&self, node: Node<'_>) -> Result<Stmt, SyntaxError> {
        let is_async = (0..node.child_count())
            .filter_map(|i| node.child(i))
            .any(|child| child.kind() == "async");
        if is_async {
            return Err(unsupported("async for loop", node));
        }
        if let Some(clause) = node.child_by_field_name("alternative") {
            return Err(unsupported("for-else clause", clause));
        }
        let left = self.field(node, "left")?;
        if left.kind() != "identifier" {
            return Err(unsupported("loop target other than a single name", left));
        }
        let target = self.name(left)?;
        let iter = self.expr(self.field(node, "right")?)?;
        let body = self.suite(node, self.field(node, "body")?)?;
        Ok(Stmt::For {
            target,
            iter,
            body,
            span: span_of(node),
        })
    }

    fn expression_statement(&self, node: Node<'_>) -> Result<Stmt, SyntaxError> {
        let span = span_of(node);
        let children = self.named(node);
        let [child] = children.as_slice() else {
            return Err(unsupported("tuple expression", node));
        };
        match child.kind() {
            "assignment" => {
                let left = self.field(*child, "left")?;
                if left.kind() != "identifier" {
                    return Err(unsupported("assignment to a target other than a name", left));
                }
                let target = self.name(left)?;
                if let Some(annotation) = child.child_by_field_name("type") {
                    return Err(unsupported("annotated assignment", annotation));
                }
                let right = self.field(*child, "right")?;
                if right.kind() == "assignment" {
                    return Err(unsupported("chained assignment", right));
                }
                Ok(Stmt::Assign {
                    target,
                    value: self.expr(right)?,
                    span,
                })
            }
            "call" => Ok(Stmt::Expr {
                value: Expr::Call(self.call(*child)?),
                span,
            }),
            "augmented_assignment" | "yield" => Err(unsupported(describe(child.kind()), *child)),
            _ => Err(unsupported("bare expression statement", *child)),
        }
    }

    fn expr(&self, node: Node<'_>) -> Result<Expr, SyntaxError> {
        match node.kind() {
            "identifier" => Ok(Expr::Name(self.text(node).to_string())),
            "attribute" => self.dotted(node).map(Expr::Dotted),
            "integer" | "float" | "true" | "false" | "none" | "string" | "concatenated_string" => {
                Ok(Expr::Literal(self.text(node).to_string()))
            }
            "unary_operator" => {
                let argument = self.field(node, "argument")?;
                if matches!(argument.kind(), "integer" | "float") {
                    let operator = self.field(node, "operator")?;
                    if matches!(operator.kind(), "-" | "+") {
                        return Ok(Expr::Literal(self.text(node).to_string()));
                    }
                }
                Err(unsupported("unary operator", node))
            }
            "parenthesized_expression" => {
                let inner = self.named(node);
                match inner.as_slice() {
                    [only] => self.expr(*only),
                    _ => Err(unsupported(describe(node.kind()), node)),
                }
            }
            "binary_operator" | "boolean_operator" => {
                let operator = self.field(node, "operator")?;
                let op = BinaryOperator::from_symbol(operator.kind()).ok_or_else(|| {
                    unsupported(format!("'{}' operator", operator.kind()), operator)
                })?;
                let left = self.expr(self.field(node, "left")?)?;
                let right = self.expr(self.field(node, "right")?)?;
                Ok(Expr::binop(left, op, right))
            }
            "comparison_operator" => self.comparison(node),
            "call" => self.call(node).map(Expr::Call),
            "list" | "tuple" | "set" | "dictionary" => {
                if self.is_constant(node) {
                    Ok(Expr::Literal(self.text(node).to_string()))
                } else {
                    Err(unsupported(
                        format!("{} with non-literal elements", describe(node.kind())),
                        node,
                    ))
                }
            }
            other => Err(unsupported(describe(other), node)),
        }
    }

    fn comparison(&self, node: Node<'_>) -> Result<Expr, SyntaxError> {
        let operands = self.named(node);
        let [left, right] = operands.as_slice() else {
            return Err(unsupported("chained comparison", node));
        };
        // `not in` and `is not` arrive as two operator tokens.
        let mut cursor = node.walk();
        let symbol = node
            .children_by_field_name("operators", &mut cursor)
            .map(|operator| operator.kind())
            .collect::<Vec<_>>()
            .join(" ");
        let op = BinaryOperator::from_symbol(&symbol)
            .filter(|op| op.class() == OperatorClass::Comparison)
            .ok_or_else(|| unsupported(format!("'{symbol}' comparison"), node))?;
        Ok(Expr::binop(self.expr(*left)?, op, self.expr(*right)?))
    }

    fn call(&self, node: Node<'_>) -> Result<Call, SyntaxError> {
        let function = self.field(node, "function")?;
        let func = match function.kind() {
            "identifier" => self.text(function).to_string(),
            "attribute" => self.dotted(function)?,
            _ => return Err(unsupported("call of a computed callee", function)),
        };
        let arguments = self.field(node, "arguments")?;
        if arguments.kind() != "argument_list" {
            return Err(unsupported(describe(arguments.kind()), arguments));
        }

        let mut args = Vec::new();
        let mut keywords = Vec::new();
        for argument in self.named(arguments) {
            match argument.kind() {
                "keyword_argument" => keywords.push(Keyword {
                    name: self.text(self.field(argument, "name")?).to_string(),
                    value: self.expr(self.field(argument, "value")?)?,
                }),
                "list_splat" | "dictionary_splat" => {
                    return Err(unsupported("argument unpacking", argument))
                }
                _ => args.push(self.expr(argument)?),
            }
        }
        Ok(Call {
            func,
            args,
            keywords,
            span: span_of(node),
        })
    }

    /// `a.b.c`, where every segment is a plain name.
    fn dotted(&self, node: Node<'_>) -> Result<String, SyntaxError> {
        match node.kind() {
            "identifier" => Ok(self.text(node).to_string()),
            "attribute" => {
                let object = self.dotted(self.field(node, "object")?)?;
                let attribute = self.field(node, "attribute")?;
                Ok(format!("{}.{}", object, self.text(attribute)))
            }
            _ => Err(unsupported("attribute access on an expression", node)),
        }
    }

    /// True when the node is a literal that needs no evaluation context.
    fn is_constant(&self, node: Node<'_>) -> bool {
        match node.kind() {
            "integer" | "float" | "true" | "false" | "none" | "string" | "concatenated_string" => {
                true
            }
            "unary_operator" => node
                .child_by_field_name("argument")
                .is_some_and(|argument| matches!(argument.kind(), "integer" | "float")),
            "list" | "tuple" | "set" | "dictionary" | "parenthesized_expression" => {
                self.named(node).iter().all(|child| self.is_constant(*child))
            }
            "pair" => ["key", "value"].iter().all(|field| {
                node.child_by_field_name(field)
                    .is_some_and(|child| self.is_constant(child))
            }),
            _ => false,
        }
    }
}
