//! Core error types for plexus-core.
//!
//! Uses `thiserror` for structured, matchable error variants. Two families:
//!
//! - [`GraphError`]: a structurally invalid graph. Every variant names the
//!   offending node's id and type.
//! - [`CoreError`]: input that never became a graph or a registry (bad
//!   JSON, bad node-type definitions).

use thiserror::Error;

use crate::id::NodeId;
use crate::node::NodeKind;

/// Structural errors raised by graph validation, before any code is
/// generated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Two nodes anywhere in the graph share an id.
    #[error("duplicate node id '{id}' (second occurrence has type '{kind}')")]
    DuplicateId { id: NodeId, kind: NodeKind },

    /// A slot the node's kind requires is absent.
    #[error("node '{id}' of type '{kind}' is missing required input: '{slot}'")]
    MissingInput {
        id: NodeId,
        kind: NodeKind,
        slot: String,
    },

    /// A slot the node's kind does not define is present.
    #[error("node '{id}' of type '{kind}' has unexpected input: '{slot}'")]
    UnexpectedInput {
        id: NodeId,
        kind: NodeKind,
        slot: String,
    },

    /// The same slot name appears twice.
    #[error("node '{id}' of type '{kind}' has duplicate input: '{slot}'")]
    DuplicateInput {
        id: NodeId,
        kind: NodeKind,
        slot: String,
    },

    /// A slot sets both or neither of `value` and `link`.
    #[error("node '{id}' of type '{kind}': input '{slot}' must set exactly one of 'value' or 'link'")]
    InvalidSlot {
        id: NodeId,
        kind: NodeKind,
        slot: String,
    },

    /// A link names an id that exists nowhere in the graph.
    #[error("node '{id}' of type '{kind}': input '{slot}' links to unknown node '{target}'")]
    DanglingLink {
        id: NodeId,
        kind: NodeKind,
        slot: String,
        target: NodeId,
    },

    /// A link targets a statement-only node.
    #[error(
        "node '{id}' of type '{kind}': input '{slot}' links to node '{target}' of type '{target_kind}', which produces no value"
    )]
    NonValueLink {
        id: NodeId,
        kind: NodeKind,
        slot: String,
        target: NodeId,
        target_kind: NodeKind,
    },

    /// A required scalar field (`value`, `target`) is absent or empty.
    #[error("node '{id}' of type '{kind}' is missing required field: '{field}'")]
    MissingField {
        id: NodeId,
        kind: NodeKind,
        field: &'static str,
    },

    /// A variable or loop-variable name is not a valid identifier.
    #[error("node '{id}' of type '{kind}' has invalid name '{name}' in field '{field}'")]
    InvalidName {
        id: NodeId,
        kind: NodeKind,
        field: &'static str,
        name: String,
    },

    /// A `binary_op` carries an operator symbol outside the operator table.
    #[error("node '{id}' of type '{kind}' uses unsupported operator '{operator}'")]
    UnknownOperator {
        id: NodeId,
        kind: NodeKind,
        operator: String,
    },

    /// A nested block is present on a kind that does not own it.
    #[error("node '{id}' of type '{kind}' cannot have a '{block}' block")]
    UnexpectedBlock {
        id: NodeId,
        kind: NodeKind,
        block: &'static str,
    },

    /// Links form a cycle that inlining would never leave.
    #[error("node '{id}' of type '{kind}' is part of a link cycle")]
    LinkCycle { id: NodeId, kind: NodeKind },
}

impl GraphError {
    /// Id of the node the error is about.
    pub fn node_id(&self) -> &NodeId {
        match self {
            GraphError::DuplicateId { id, .. }
            | GraphError::MissingInput { id, .. }
            | GraphError::UnexpectedInput { id, .. }
            | GraphError::DuplicateInput { id, .. }
            | GraphError::InvalidSlot { id, .. }
            | GraphError::DanglingLink { id, .. }
            | GraphError::NonValueLink { id, .. }
            | GraphError::MissingField { id, .. }
            | GraphError::InvalidName { id, .. }
            | GraphError::UnknownOperator { id, .. }
            | GraphError::UnexpectedBlock { id, .. }
            | GraphError::LinkCycle { id, .. } => id,
        }
    }
}

/// Errors for input that could not be turned into a graph or registry.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Graph JSON failed to parse or does not have the graph shape.
    #[error("malformed graph JSON: {0}")]
    MalformedGraph(#[source] serde_json::Error),

    /// Node-type definition JSON failed to parse.
    #[error("malformed node-type definitions: {0}")]
    MalformedDefinitions(#[source] serde_json::Error),

    /// A definition's `node_type` is not a dynamic kind.
    #[error("node-type definition '{name}' has unsupported node_type '{node_type}'")]
    UnsupportedDefinition { name: String, node_type: String },

    /// Two definitions resolve to the same call name.
    #[error("duplicate node-type definition for '{name}'")]
    DuplicateDefinition { name: String },

    /// Graph could not be serialized.
    #[error("failed to serialize graph: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_node_and_type() {
        let err = GraphError::MissingInput {
            id: "n1".into(),
            kind: NodeKind::IfStatement,
            slot: "test".into(),
        };
        assert_eq!(
            err.to_string(),
            "node 'n1' of type 'if_statement' is missing required input: 'test'"
        );
        assert_eq!(err.node_id().as_str(), "n1");
    }

    #[test]
    fn non_value_link_message() {
        let err = GraphError::NonValueLink {
            id: "b".into(),
            kind: NodeKind::Print,
            slot: "target".into(),
            target: "a".into(),
            target_kind: NodeKind::Print,
        };
        let msg = err.to_string();
        assert!(msg.contains("'b' of type 'print'"));
        assert!(msg.contains("node 'a' of type 'print'"));
    }
}
