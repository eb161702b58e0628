//! Nodes, node kinds, and input slots.
//!
//! A [`Node`] is one statement or expression of the visual program. Its
//! `inputs` are named slots; each slot either embeds a literal source
//! fragment or links to another node's output by id. Control-flow kinds own
//! nested node sequences (`body`, `orelse`) with the same shape as the
//! top-level graph.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::id::NodeId;

/// Closed set of builtin node kinds.
///
/// Serialized as the snake_case `type` field of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    VariableAssign,
    Print,
    BinaryOp,
    IfStatement,
    ForLoop,
    CallFunction,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        NodeKind::VariableAssign,
        NodeKind::Print,
        NodeKind::BinaryOp,
        NodeKind::IfStatement,
        NodeKind::ForLoop,
        NodeKind::CallFunction,
    ];

    /// The `type` string used in graph JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::VariableAssign => "variable_assign",
            NodeKind::Print => "print",
            NodeKind::BinaryOp => "binary_op",
            NodeKind::IfStatement => "if_statement",
            NodeKind::ForLoop => "for_loop",
            NodeKind::CallFunction => "call_function",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown node type '{}'", s))
    }
}

/// A named input of a node.
///
/// Exactly one of `value` (literal source text, emitted verbatim) and
/// `link` (id of the node providing the value) must be set. The model keeps
/// both fields optional so that a malformed slot can be reported against the
/// node that owns it instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSlot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<NodeId>,
}

/// Where a well-formed slot takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSource<'a> {
    Literal(&'a str),
    Link(&'a NodeId),
}

impl InputSlot {
    /// A slot holding literal source text.
    pub fn literal(name: impl Into<String>, text: impl Into<String>) -> Self {
        InputSlot {
            name: name.into(),
            value: Some(text.into()),
            link: None,
        }
    }

    /// A slot linked to another node's output.
    pub fn link(name: impl Into<String>, target: impl Into<NodeId>) -> Self {
        InputSlot {
            name: name.into(),
            value: None,
            link: Some(target.into()),
        }
    }

    /// Returns the slot's source, or `None` when the slot sets both or
    /// neither of `value` and `link`.
    pub fn source(&self) -> Option<SlotSource<'_>> {
        match (&self.value, &self.link) {
            (Some(text), None) => Some(SlotSource::Literal(text)),
            (None, Some(target)) => Some(SlotSource::Link(target)),
            _ => None,
        }
    }
}

/// One unit of graph logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Variable name, operator symbol, or callee, depending on `kind`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Loop variable of a `for_loop`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub inputs: Vec<InputSlot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orelse: Vec<Node>,
}

impl Node {
    /// Creates a node with no payload, inputs, or blocks.
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Node {
            id: id.into(),
            kind,
            value: None,
            target: None,
            inputs: Vec::new(),
            body: Vec::new(),
            orelse: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_input(mut self, slot: InputSlot) -> Self {
        self.inputs.push(slot);
        self
    }

    pub fn with_body(mut self, body: Vec<Node>) -> Self {
        self.body = body;
        self
    }

    pub fn with_orelse(mut self, orelse: Vec<Node>) -> Self {
        self.orelse = orelse;
        self
    }

    /// Looks up an input slot by name.
    pub fn input(&self, name: &str) -> Option<&InputSlot> {
        self.inputs.iter().find(|slot| slot.name == name)
    }

    /// Ids this node links to, in slot order.
    pub fn links(&self) -> impl Iterator<Item = &NodeId> {
        self.inputs.iter().filter_map(|slot| slot.link.as_ref())
    }

    /// True when this node's `orelse` is the elif form: a single nested
    /// `if_statement`.
    pub fn has_elif(&self) -> bool {
        self.kind == NodeKind::IfStatement
            && self.orelse.len() == 1
            && self.orelse[0].kind == NodeKind::IfStatement
    }
}
