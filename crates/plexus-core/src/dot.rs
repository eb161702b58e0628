//! Graphviz export.
//!
//! Renders a graph's nodes with their data-flow links and block containment
//! as DOT text, for inspecting decompiled graphs outside a visual editor.
//! Links are drawn provider -> consumer and labelled with the consuming
//! slot; `body`/`orelse` edges go from a control-flow node to each direct
//! child. Links to unknown ids are skipped; validation reports those.

use std::collections::HashMap;
use std::fmt;

use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::GraphError;
use crate::graph::{Graph, GraphIndex};
use crate::node::Node;

/// Edge weight of the exported graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotEdge {
    /// Data-flow link into the named slot.
    Data(String),
    Body,
    Orelse,
}

impl fmt::Display for DotEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DotEdge::Data(slot) => f.write_str(slot),
            DotEdge::Body => f.write_str("body"),
            DotEdge::Orelse => f.write_str("orelse"),
        }
    }
}

fn label(node: &Node) -> String {
    match (&node.value, &node.target) {
        (Some(value), _) => format!("{} [{}]\n{}", node.id, node.kind, value),
        (None, Some(target)) => format!("{} [{}]\n{}", node.id, node.kind, target),
        (None, None) => format!("{} [{}]", node.id, node.kind),
    }
}

/// Builds the petgraph form of `graph`.
pub fn to_petgraph(graph: &Graph) -> Result<DiGraph<String, DotEdge>, GraphError> {
    let index = GraphIndex::build(graph)?;
    let mut out = DiGraph::new();
    let mut positions: HashMap<&str, NodeIndex> = HashMap::new();

    for node in index.nodes() {
        positions.insert(node.id.as_str(), out.add_node(label(node)));
    }

    for node in index.nodes() {
        let consumer = positions[node.id.as_str()];
        for slot in &node.inputs {
            let Some(target) = &slot.link else { continue };
            if let Some(&provider) = positions.get(target.as_str()) {
                out.add_edge(provider, consumer, DotEdge::Data(slot.name.clone()));
            }
        }
        for child in &node.body {
            out.add_edge(consumer, positions[child.id.as_str()], DotEdge::Body);
        }
        for child in &node.orelse {
            out.add_edge(consumer, positions[child.id.as_str()], DotEdge::Orelse);
        }
    }
    Ok(out)
}

/// Renders `graph` as Graphviz DOT text.
pub fn to_dot(graph: &Graph) -> Result<String, GraphError> {
    let exported = to_petgraph(graph)?;
    Ok(format!("{}", Dot::new(&exported)))
}
