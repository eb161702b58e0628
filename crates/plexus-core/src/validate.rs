//! Eager structural validation.
//!
//! [`validate`] runs before any code generation and stops at the first
//! offending node in traversal order. On success it hands back the
//! [`GraphIndex`] it built, so callers resolve links without indexing twice.
//!
//! Checks, per node:
//! - the id has not appeared earlier in traversal order;
//! - kind-specific scalar fields (`value`, `target`) are present and well
//!   formed;
//! - nested blocks only appear on kinds that own them;
//! - input slot names are exactly the ones the registry requires;
//! - every slot sets exactly one of `value` / `link`;
//! - every link resolves, and to a value-producing node.
//!
//! Then, once every node has passed: no link cycle that inlining could not
//! escape. A cycle spans several nodes, so it is reported after any
//! per-node error.

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::error::GraphError;
use crate::graph::{Graph, GraphIndex};
use crate::node::{Node, NodeKind, SlotSource};
use crate::ops::BinaryOperator;
use crate::registry::{positional_slot, Registry};

/// Reserved words that can never name a variable.
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// True for a plain, non-reserved identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = match chars.next() {
        Some(c) => c == '_' || c.is_alphabetic(),
        None => false,
    };
    starts_ok && chars.all(|c| c == '_' || c.is_alphanumeric())
        && !KEYWORDS.iter().any(|keyword| *keyword == name)
}

/// True for `name` or `name.attr.attr`.
pub fn is_dotted_name(name: &str) -> bool {
    name.split('.').all(is_identifier)
}

/// Validates `graph` against `registry`.
pub fn validate<'g>(graph: &'g Graph, registry: &Registry) -> Result<GraphIndex<'g>, GraphError> {
    let index = GraphIndex::build_lenient(graph);
    let mut order = Vec::with_capacity(index.len());
    graph.walk(&mut |node| order.push(node));

    let mut seen = HashSet::with_capacity(order.len());
    for node in order {
        if !seen.insert(node.id.as_str()) {
            return Err(GraphError::DuplicateId {
                id: node.id.clone(),
                kind: node.kind,
            });
        }
        check_fields(node)?;
        check_blocks(node)?;
        check_slot_names(node, registry)?;
        check_slot_sources(node, &index)?;
    }
    check_cycles(&index)?;
    tracing::debug!(nodes = index.len(), "graph validated");
    Ok(index)
}

fn missing_field(node: &Node, field: &'static str) -> GraphError {
    GraphError::MissingField {
        id: node.id.clone(),
        kind: node.kind,
        field,
    }
}

fn required_field<'n>(node: &'n Node, field: &'static str) -> Result<&'n str, GraphError> {
    let value = match field {
        "target" => node.target.as_deref(),
        _ => node.value.as_deref(),
    };
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(missing_field(node, field)),
    }
}

fn check_fields(node: &Node) -> Result<(), GraphError> {
    let invalid_name = |field: &'static str, name: &str| GraphError::InvalidName {
        id: node.id.clone(),
        kind: node.kind,
        field,
        name: name.to_string(),
    };

    match node.kind {
        NodeKind::VariableAssign => {
            let name = required_field(node, "value")?;
            if !is_identifier(name) {
                return Err(invalid_name("value", name));
            }
        }
        NodeKind::BinaryOp => {
            let symbol = required_field(node, "value")?;
            if BinaryOperator::from_symbol(symbol).is_none() {
                return Err(GraphError::UnknownOperator {
                    id: node.id.clone(),
                    kind: node.kind,
                    operator: symbol.to_string(),
                });
            }
        }
        NodeKind::CallFunction => {
            let callee = required_field(node, "value")?;
            if !is_dotted_name(callee) {
                return Err(invalid_name("value", callee));
            }
        }
        NodeKind::ForLoop => {
            let target = required_field(node, "target")?;
            if !is_identifier(target) {
                return Err(invalid_name("target", target));
            }
        }
        NodeKind::Print | NodeKind::IfStatement => {}
    }
    Ok(())
}

fn check_blocks(node: &Node) -> Result<(), GraphError> {
    let spec = Registry::spec(node.kind);
    let unexpected = |block: &'static str| GraphError::UnexpectedBlock {
        id: node.id.clone(),
        kind: node.kind,
        block,
    };
    if !spec.has_body && !node.body.is_empty() {
        return Err(unexpected("body"));
    }
    if !spec.has_orelse && !node.orelse.is_empty() {
        return Err(unexpected("orelse"));
    }
    Ok(())
}

fn check_slot_names(node: &Node, registry: &Registry) -> Result<(), GraphError> {
    for (i, slot) in node.inputs.iter().enumerate() {
        if node.inputs[..i].iter().any(|earlier| earlier.name == slot.name) {
            return Err(GraphError::DuplicateInput {
                id: node.id.clone(),
                kind: node.kind,
                slot: slot.name.clone(),
            });
        }
    }

    let missing = |slot: &str| GraphError::MissingInput {
        id: node.id.clone(),
        kind: node.kind,
        slot: slot.to_string(),
    };
    let unexpected = |slot: &str| GraphError::UnexpectedInput {
        id: node.id.clone(),
        kind: node.kind,
        slot: slot.to_string(),
    };

    let spec = Registry::spec(node.kind);
    if !spec.callee_inputs {
        if let Some(name) = spec.inputs.iter().find(|name| node.input(name).is_none()) {
            return Err(missing(*name));
        }
        if let Some(slot) = node
            .inputs
            .iter()
            .find(|s| !spec.inputs.iter().any(|name| *name == s.name))
        {
            return Err(unexpected(slot.name.as_str()));
        }
        return Ok(());
    }

    let callee = node.value.as_deref().unwrap_or_default();
    match registry.function(callee) {
        Some(signature) => {
            if let Some(param) = signature
                .params
                .iter()
                .find(|p| p.required && node.input(&p.name).is_none())
            {
                return Err(missing(param.name.as_str()));
            }
            if let Some(slot) = node.inputs.iter().find(|s| signature.param(&s.name).is_none()) {
                return Err(unexpected(slot.name.as_str()));
            }
        }
        None => {
            for (i, slot) in node.inputs.iter().enumerate() {
                if slot.name != positional_slot(i) {
                    return Err(unexpected(slot.name.as_str()));
                }
            }
        }
    }
    Ok(())
}

fn check_slot_sources(node: &Node, index: &GraphIndex<'_>) -> Result<(), GraphError> {
    for slot in &node.inputs {
        let target = match slot.source() {
            Some(SlotSource::Literal(_)) => continue,
            Some(SlotSource::Link(target)) => target,
            None => {
                return Err(GraphError::InvalidSlot {
                    id: node.id.clone(),
                    kind: node.kind,
                    slot: slot.name.clone(),
                })
            }
        };
        let Some(provider) = index.get(target.as_str()) else {
            return Err(GraphError::DanglingLink {
                id: node.id.clone(),
                kind: node.kind,
                slot: slot.name.clone(),
                target: target.clone(),
            });
        };
        if !Registry::spec(provider.kind).produces_value {
            return Err(GraphError::NonValueLink {
                id: node.id.clone(),
                kind: node.kind,
                slot: slot.name.clone(),
                target: target.clone(),
                target_kind: provider.kind,
            });
        }
    }
    Ok(())
}

/// Links into a `variable_assign` resolve to a bare variable reference, so
/// only links into other kinds are followed when inlining. A cycle among
/// those would recurse forever.
fn check_cycles(index: &GraphIndex<'_>) -> Result<(), GraphError> {
    let mut inlining: DiGraphMap<&str, ()> = DiGraphMap::new();
    for node in index.nodes() {
        for target in node.links() {
            let follows = index
                .get(target.as_str())
                .is_some_and(|provider| provider.kind != NodeKind::VariableAssign);
            if follows {
                inlining.add_edge(node.id.as_str(), target.as_str(), ());
            }
        }
    }

    match toposort(&inlining, None) {
        Ok(_) => Ok(()),
        Err(cycle) => {
            let id = cycle.node_id();
            let kind = index.get(id).map(|n| n.kind).unwrap_or(NodeKind::BinaryOp);
            Err(GraphError::LinkCycle {
                id: id.into(),
                kind,
            })
        }
    }
}
