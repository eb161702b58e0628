//! The graph container and its flat id index.
//!
//! [`Graph`] is an ordered node sequence; insertion order is statement
//! order. The same shape recurses inside control-flow nodes, so a graph is
//! a tree of blocks. Links, however, cross blocks freely: ids are unique
//! graph-wide and resolved through a [`GraphIndex`] built once per call.

use std::collections::HashMap;

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, GraphError};
use crate::id::NodeId;
use crate::node::Node;

/// A plexus node graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>) -> Self {
        Graph { nodes }
    }

    /// Parses graph JSON (`{"nodes": [...]}`).
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(CoreError::MalformedGraph)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self).map_err(CoreError::Serialize)
    }

    /// Visits every node depth-first in statement order: a node, then its
    /// `body`, then its `orelse`.
    pub fn walk<'g>(&'g self, visit: &mut impl FnMut(&'g Node)) {
        walk_block(&self.nodes, visit);
    }

    /// Total node count, nested blocks included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }
}

fn walk_block<'g>(nodes: &'g [Node], visit: &mut impl FnMut(&'g Node)) {
    for node in nodes {
        visit(node);
        walk_block(&node.body, visit);
        walk_block(&node.orelse, visit);
    }
}

/// Flat id-to-node lookup over a whole graph.
///
/// Iteration order is traversal order. Also records how many slots link to
/// each node, which the compiler uses to tell inlined calls from call
/// statements.
#[derive(Debug, Clone)]
pub struct GraphIndex<'g> {
    nodes: IndexMap<&'g str, &'g Node>,
    consumers: HashMap<&'g str, usize>,
}

impl<'g> GraphIndex<'g> {
    /// Indexes every node of `graph`.
    ///
    /// Fails with [`GraphError::DuplicateId`] on the first id seen twice.
    pub fn build(graph: &'g Graph) -> Result<Self, GraphError> {
        match Self::collect(graph) {
            (_, Some(err)) => Err(err),
            (index, None) => Ok(index),
        }
    }

    /// Indexes every node of `graph`, keeping the first node for a repeated
    /// id.
    pub fn build_lenient(graph: &'g Graph) -> Self {
        Self::collect(graph).0
    }

    fn collect(graph: &'g Graph) -> (Self, Option<GraphError>) {
        let mut nodes: IndexMap<&'g str, &'g Node> = IndexMap::new();
        let mut consumers: HashMap<&'g str, usize> = HashMap::new();
        let mut duplicate = None;

        graph.walk(&mut |node| {
            match nodes.entry(node.id.as_str()) {
                Entry::Occupied(_) => {
                    duplicate.get_or_insert_with(|| GraphError::DuplicateId {
                        id: node.id.clone(),
                        kind: node.kind,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(node);
                }
            }
            for target in node.links() {
                *consumers.entry(target.as_str()).or_insert(0) += 1;
            }
        });

        (GraphIndex { nodes, consumers }, duplicate)
    }

    pub fn get(&self, id: &str) -> Option<&'g Node> {
        self.nodes.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of slots, graph-wide, that link to `id`.
    pub fn consumer_count(&self, id: &str) -> usize {
        self.consumers.get(id).copied().unwrap_or(0)
    }

    pub fn is_consumed(&self, id: &str) -> bool {
        self.consumer_count(id) > 0
    }

    /// All nodes in traversal order.
    pub fn nodes(&self) -> impl Iterator<Item = &'g Node> + '_ {
        self.nodes.values().copied()
    }

    /// Position of `id` in traversal order.
    pub fn position(&self, id: &NodeId) -> Option<usize> {
        self.nodes.get_index_of(id.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{InputSlot, NodeKind};

    fn nested_graph() -> Graph {
        Graph::new(vec![
            Node::new("a", NodeKind::VariableAssign)
                .with_value("x")
                .with_input(InputSlot::literal("value", "1")),
            Node::new("b", NodeKind::IfStatement)
                .with_input(InputSlot::link("test", "a"))
                .with_body(vec![Node::new("c", NodeKind::Print)
                    .with_input(InputSlot::link("target", "a"))])
                .with_orelse(vec![Node::new("d", NodeKind::Print)
                    .with_input(InputSlot::literal("target", "'no'"))]),
        ])
    }

    #[test]
    fn walk_is_depth_first_in_statement_order() {
        let graph = nested_graph();
        let mut seen = Vec::new();
        graph.walk(&mut |node| seen.push(node.id.as_str().to_string()));
        assert_eq!(seen, vec!["a", "b", "c", "d"]);
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn index_resolves_nested_ids_and_counts_consumers() {
        let graph = nested_graph();
        let index = GraphIndex::build(&graph).unwrap();
        assert_eq!(index.len(), 4);
        assert_eq!(index.get("c").unwrap().kind, NodeKind::Print);
        assert_eq!(index.consumer_count("a"), 2);
        assert!(!index.is_consumed("d"));
        assert_eq!(index.position(&NodeId::from("d")), Some(3));
    }

    #[test]
    fn duplicate_id_across_scopes_is_rejected() {
        let graph = Graph::new(vec![
            Node::new("a", NodeKind::Print),
            Node::new("b", NodeKind::IfStatement).with_body(vec![Node::new("a", NodeKind::BinaryOp)]),
        ]);
        let err = GraphIndex::build(&graph).unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateId {
                id: "a".into(),
                kind: NodeKind::BinaryOp
            }
        );
    }

    #[test]
    fn lenient_index_keeps_first_of_repeated_ids() {
        let graph = Graph::new(vec![
            Node::new("a", NodeKind::Print),
            Node::new("b", NodeKind::IfStatement).with_body(vec![Node::new("a", NodeKind::BinaryOp)]),
        ]);
        let index = GraphIndex::build_lenient(&graph);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("a").map(|node| node.kind), Some(NodeKind::Print));
    }

    #[test]
    fn from_json_accepts_legacy_connections_key() {
        let graph = Graph::from_json(r#"{"nodes": [], "connections": []}"#).unwrap();
        assert!(graph.nodes.is_empty());
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(
            Graph::from_json("{\"nodes\": [").unwrap_err(),
            CoreError::MalformedGraph(_)
        ));
        assert!(matches!(
            Graph::from_json(r#"{"nodes": [{"id": "a", "type": "while_loop"}]}"#).unwrap_err(),
            CoreError::MalformedGraph(_)
        ));
    }

    #[test]
    fn json_roundtrip_preserves_structure() {
        let graph = nested_graph();
        let json = graph.to_json_pretty().unwrap();
        assert_eq!(Graph::from_json(&json).unwrap(), graph);
    }
}
