//! Source text to graph.
//!
//! The walk keeps two pieces of call-local state: the provider map (name to
//! the id of the node that last assigned it) and an id counter shared by
//! every nested block. Ids are `<prefix>-<n>`, allocated in pre-order.
//!
//! Expression nodes created while resolving a statement are placed in the
//! statement's block, before the statement. The tests of an `elif` chain
//! go to the block of the outermost conditional, so each `orelse` that
//! represents an `elif` holds exactly one `if_statement`.

use std::collections::HashMap;

use plexus_core::registry::positional_slot;
use plexus_core::{Graph, InputSlot, Node, NodeId, NodeKind, Registry};
use plexus_syntax::{parse, Call, Expr, Span, Stmt};

use crate::error::DecompileError;
use crate::{DecompileOptions, ProviderScope};

/// Decompile source text with the builtin registry and default options.
pub fn decompile(source: &str) -> Result<Graph, DecompileError> {
    decompile_with(source, Registry::builtin(), &DecompileOptions::default())
}

/// Decompile source text against `registry`.
pub fn decompile_with(
    source: &str,
    registry: &Registry,
    options: &DecompileOptions,
) -> Result<Graph, DecompileError> {
    let module = parse(source)?;
    let mut decompiler = Decompiler::new(registry, options);
    let nodes = decompiler.block(&module.body)?;
    let graph = Graph::new(nodes);
    tracing::debug!(
        nodes = graph.node_count(),
        providers = decompiler.providers.len(),
        "decompiled source"
    );
    Ok(graph)
}

struct Decompiler<'r> {
    registry: &'r Registry,
    scope: ProviderScope,
    providers: HashMap<String, NodeId>,
    next_id: usize,
}

impl<'r> Decompiler<'r> {
    fn new(registry: &'r Registry, options: &DecompileOptions) -> Self {
        Decompiler {
            registry,
            scope: options.provider_scope,
            providers: HashMap::new(),
            next_id: 0,
        }
    }

    fn allocate(&mut self, prefix: &str) -> NodeId {
        self.next_id += 1;
        NodeId::new(format!("{}-{}", prefix, self.next_id))
    }

    fn block(&mut self, stmts: &[Stmt]) -> Result<Vec<Node>, DecompileError> {
        let mut nodes = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            self.statement(stmt, &mut nodes)?;
        }
        Ok(nodes)
    }

    /// Decompiles a nested block. `loop_var` is dropped from the provider
    /// map first: inside a loop body the loop provides it.
    fn nested(&mut self, stmts: &[Stmt], loop_var: Option<&str>) -> Result<Vec<Node>, DecompileError> {
        let saved = match self.scope {
            ProviderScope::Shared => None,
            ProviderScope::Block => Some(self.providers.clone()),
        };
        if let Some(name) = loop_var {
            self.providers.remove(name);
        }
        let nodes = self.block(stmts);
        if let Some(providers) = saved {
            self.providers = providers;
        }
        nodes
    }

    fn statement(&mut self, stmt: &Stmt, out: &mut Vec<Node>) -> Result<(), DecompileError> {
        match stmt {
            Stmt::Assign { target, value, .. } => {
                let id = self.allocate("assign");
                let slot = self.resolve(value, "value", out)?;
                out.push(
                    Node::new(id.clone(), NodeKind::VariableAssign)
                        .with_value(target.as_str())
                        .with_input(slot),
                );
                tracing::trace!(name = %target, provider = %id, "recorded provider");
                self.providers.insert(target.clone(), id);
            }
            Stmt::Expr {
                value: Expr::Call(call),
                ..
            } => {
                if call.func == "print" && call.args.len() == 1 && call.keywords.is_empty() {
                    let id = self.allocate("print");
                    let slot = self.resolve(&call.args[0], "target", out)?;
                    out.push(Node::new(id, NodeKind::Print).with_input(slot));
                } else {
                    let node = self.call(call, out)?;
                    out.push(node);
                }
            }
            Stmt::Expr { span, .. } => {
                return Err(unsupported("bare expression statement", *span));
            }
            Stmt::If {
                test, body, orelse, ..
            } => {
                let node = self.conditional(test, body, orelse, out)?;
                out.push(node);
            }
            Stmt::For {
                target, iter, body, ..
            } => {
                let id = self.allocate("for");
                let iter = self.resolve(iter, "iter", out)?;
                let body = self.nested(body, Some(target.as_str()))?;
                out.push(
                    Node::new(id, NodeKind::ForLoop)
                        .with_target(target.as_str())
                        .with_input(iter)
                        .with_body(body),
                );
            }
            Stmt::Pass { .. } => {}
        }
        Ok(())
    }

    /// Builds an `if_statement`. Test nodes of the whole elif chain go to
    /// `hoist`.
    fn conditional(
        &mut self,
        test: &Expr,
        body: &[Stmt],
        orelse: &[Stmt],
        hoist: &mut Vec<Node>,
    ) -> Result<Node, DecompileError> {
        let id = self.allocate("if");
        let test = self.resolve(test, "test", hoist)?;
        let body = self.nested(body, None)?;
        let orelse = match orelse {
            [Stmt::If {
                test, body, orelse, ..
            }] => vec![self.conditional(test, body, orelse, hoist)?],
            _ => self.nested(orelse, None)?,
        };
        Ok(Node::new(id, NodeKind::IfStatement)
            .with_input(test)
            .with_body(body)
            .with_orelse(orelse))
    }

    /// Resolves an expression into the input slot `slot`, pushing any
    /// nodes it creates into `out`.
    fn resolve(&mut self, expr: &Expr, slot: &str, out: &mut Vec<Node>) -> Result<InputSlot, DecompileError> {
        match expr {
            Expr::Name(name) => Ok(match self.providers.get(name) {
                Some(provider) => InputSlot::link(slot, provider.clone()),
                None => InputSlot::literal(slot, name.as_str()),
            }),
            Expr::Dotted(text) | Expr::Literal(text) => Ok(InputSlot::literal(slot, text.as_str())),
            Expr::BinOp { left, op, right } => {
                let id = self.allocate("binop");
                let left = self.resolve(left, "left", out)?;
                let right = self.resolve(right, "right", out)?;
                out.push(
                    Node::new(id.clone(), NodeKind::BinaryOp)
                        .with_value(op.symbol())
                        .with_input(left)
                        .with_input(right),
                );
                Ok(InputSlot::link(slot, id))
            }
            Expr::Call(call) => {
                let node = self.call(call, out)?;
                let id = node.id.clone();
                out.push(node);
                Ok(InputSlot::link(slot, id))
            }
        }
    }

    /// Builds a `call_function` node. Registered callees get parameter
    /// slots; everything else gets `arg0`, `arg1`, ...
    fn call(&mut self, call: &Call, out: &mut Vec<Node>) -> Result<Node, DecompileError> {
        let id = self.allocate("call");
        let mut node = Node::new(id, NodeKind::CallFunction).with_value(call.func.as_str());
        let registry = self.registry;

        let Some(signature) = registry.function(&call.func) else {
            if let Some(keyword) = call.keywords.first() {
                return Err(unsupported(
                    format!(
                        "keyword argument '{}' to unregistered function '{}'",
                        keyword.name, call.func
                    ),
                    call.span,
                ));
            }
            for (position, arg) in call.args.iter().enumerate() {
                let slot = self.resolve(arg, &positional_slot(position), out)?;
                node.inputs.push(slot);
            }
            return Ok(node);
        };

        if call.args.len() > signature.params.len() {
            return Err(unsupported(
                format!(
                    "call to '{}' with {} positional arguments (takes at most {})",
                    call.func,
                    call.args.len(),
                    signature.params.len()
                ),
                call.span,
            ));
        }
        for (param, arg) in signature.params.iter().zip(&call.args) {
            let slot = self.resolve(arg, &param.name, out)?;
            node.inputs.push(slot);
        }
        for keyword in &call.keywords {
            if signature.param(&keyword.name).is_none() {
                return Err(unsupported(
                    format!("unknown keyword argument '{}' to '{}'", keyword.name, call.func),
                    call.span,
                ));
            }
            if node.input(&keyword.name).is_some() {
                return Err(unsupported(
                    format!("argument '{}' to '{}' given twice", keyword.name, call.func),
                    call.span,
                ));
            }
            let slot = self.resolve(&keyword.value, &keyword.name, out)?;
            node.inputs.push(slot);
        }
        if let Some(param) = signature
            .params
            .iter()
            .find(|param| param.required && node.input(&param.name).is_none())
        {
            return Err(unsupported(
                format!("call to '{}' without required argument '{}'", call.func, param.name),
                call.span,
            ));
        }
        Ok(node)
    }
}

fn unsupported(construct: impl Into<String>, span: Span) -> DecompileError {
    DecompileError::Unsupported {
        construct: construct.into(),
        line: span.line,
        column: span.column,
    }
}
