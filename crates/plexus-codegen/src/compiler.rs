//! Compilation pipeline: validate -> build tree -> render.
//!
//! [`build_tree`] validates the graph eagerly, so a malformed graph fails
//! before any statement is produced, then walks the top-level nodes in
//! order. Links are inlined as sub-expressions at the consumer, except
//! links to a `variable_assign`, which resolve to the bound name.
//!
//! A `call_function` node that some slot links to is emitted only at that
//! consumer; emitting it again as a statement would run the call twice.

use plexus_core::registry::positional_slot;
use plexus_core::{
    validate, BinaryOperator, Graph, GraphError, GraphIndex, Node, NodeId, NodeKind, Registry,
    SlotSource,
};
use plexus_syntax::{render, Call, Expr, Keyword, Module, Stmt};

use crate::error::CompileError;
use crate::CompileOptions;

/// Build the syntax tree for a graph, using only the builtin kinds.
pub fn build_tree(graph: &Graph) -> Result<Module, CompileError> {
    build_tree_with(graph, Registry::builtin())
}

/// Build the syntax tree for a graph against `registry`.
pub fn build_tree_with(graph: &Graph, registry: &Registry) -> Result<Module, CompileError> {
    let index = validate(graph, registry)?;
    let builder = TreeBuilder {
        index: &index,
        registry,
    };
    let body = builder.block(&graph.nodes)?;
    tracing::debug!(statements = body.len(), "built syntax tree");
    Ok(Module { body })
}

/// Compile a graph to source text with default options.
pub fn compile(graph: &Graph) -> Result<String, CompileError> {
    compile_with(graph, Registry::builtin(), &CompileOptions::default())
}

/// Compile a graph to source text.
pub fn compile_with(
    graph: &Graph,
    registry: &Registry,
    options: &CompileOptions,
) -> Result<String, CompileError> {
    let module = build_tree_with(graph, registry)?;
    Ok(render(&module, &options.render_options()))
}

struct TreeBuilder<'a, 'g> {
    index: &'a GraphIndex<'g>,
    registry: &'a Registry,
}

impl TreeBuilder<'_, '_> {
    fn block(&self, nodes: &[Node]) -> Result<Vec<Stmt>, CompileError> {
        let mut body = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(stmt) = self.statement(node)? {
                body.push(stmt);
            }
        }
        Ok(body)
    }

    fn statement(&self, node: &Node) -> Result<Option<Stmt>, CompileError> {
        let stmt = match node.kind {
            NodeKind::VariableAssign => {
                Stmt::assign(field(node, "value")?, self.slot(node, "value")?)
            }
            NodeKind::Print => {
                let call = Call::new("print", vec![self.slot(node, "target")?]);
                Stmt::expr(Expr::Call(call))
            }
            NodeKind::BinaryOp => {
                tracing::trace!(id = %node.id, "discarding unconsumed binary_op");
                return Ok(None);
            }
            NodeKind::IfStatement => Stmt::If {
                test: self.slot(node, "test")?,
                body: self.block(&node.body)?,
                orelse: self.block(&node.orelse)?,
                span: Default::default(),
            },
            NodeKind::ForLoop => Stmt::For {
                target: field(node, "target")?.to_string(),
                iter: self.slot(node, "iter")?,
                body: self.block(&node.body)?,
                span: Default::default(),
            },
            NodeKind::CallFunction => {
                if self.index.is_consumed(node.id.as_str()) {
                    return Ok(None);
                }
                Stmt::expr(Expr::Call(self.call(node)?))
            }
        };
        Ok(Some(stmt))
    }

    /// Resolve one input slot to an expression.
    fn slot(&self, node: &Node, name: &str) -> Result<Expr, CompileError> {
        let source = node.input(name).and_then(|slot| slot.source()).ok_or_else(|| {
            GraphError::MissingInput {
                id: node.id.clone(),
                kind: node.kind,
                slot: name.to_string(),
            }
        })?;
        match source {
            SlotSource::Literal(text) => Ok(Expr::literal(text)),
            SlotSource::Link(target) => self.link(target),
        }
    }

    /// Expression form of a linked node.
    fn link(&self, target: &NodeId) -> Result<Expr, CompileError> {
        let node = self.index.get(target.as_str()).ok_or_else(|| {
            CompileError::InvalidGraph(format!("link target '{}' is not indexed", target))
        })?;
        match node.kind {
            NodeKind::VariableAssign => Ok(Expr::name(field(node, "value")?)),
            NodeKind::BinaryOp => {
                let symbol = field(node, "value")?;
                let op = BinaryOperator::from_symbol(symbol).ok_or_else(|| {
                    GraphError::UnknownOperator {
                        id: node.id.clone(),
                        kind: node.kind,
                        operator: symbol.to_string(),
                    }
                })?;
                Ok(Expr::binop(
                    self.slot(node, "left")?,
                    op,
                    self.slot(node, "right")?,
                ))
            }
            NodeKind::CallFunction => Ok(Expr::Call(self.call(node)?)),
            NodeKind::Print | NodeKind::IfStatement | NodeKind::ForLoop => {
                Err(CompileError::InvalidGraph(format!(
                    "node '{}' of type '{}' produces no value",
                    node.id, node.kind
                )))
            }
        }
    }

    /// Call expression for a `call_function` node.
    ///
    /// Registered callees take their arguments in parameter order:
    /// positional until the first omitted parameter, keywords after it.
    /// Unregistered callees take `arg0`, `arg1`, ... positionally.
    fn call(&self, node: &Node) -> Result<Call, CompileError> {
        let callee = field(node, "value")?;
        let mut call = Call::new(callee, Vec::new());

        match self.registry.function(callee) {
            Some(signature) => {
                let mut positional = true;
                for param in &signature.params {
                    if node.input(&param.name).is_none() {
                        positional = false;
                        continue;
                    }
                    let value = self.slot(node, &param.name)?;
                    if positional {
                        call.args.push(value);
                    } else {
                        call.keywords.push(Keyword {
                            name: param.name.clone(),
                            value,
                        });
                    }
                }
            }
            None => {
                for position in 0..node.inputs.len() {
                    call.args.push(self.slot(node, &positional_slot(position))?);
                }
            }
        }
        Ok(call)
    }
}

fn field<'n>(node: &'n Node, name: &'static str) -> Result<&'n str, GraphError> {
    let value = match name {
        "target" => node.target.as_deref(),
        _ => node.value.as_deref(),
    };
    value.ok_or_else(|| GraphError::MissingField {
        id: node.id.clone(),
        kind: node.kind,
        field: name,
    })
}
