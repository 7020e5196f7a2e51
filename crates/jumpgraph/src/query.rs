//! Lookup operations over a [`Graph`].

use crate::types::{Graph, Node};

/// Find a node by id.
pub fn node<'a>(graph: &'a Graph, node_id: &str) -> Option<&'a Node> {
    graph.nodes.iter().find(|n| n.id == node_id)
}

/// The node marked as head, if any.
pub fn head(graph: &Graph) -> Option<&Node> {
    graph.nodes.iter().find(|n| n.is_head())
}

/// Number of nodes marked as head. Every operation in [`ops`](crate::ops)
/// keeps this at 0 for an empty graph and 1 otherwise.
pub fn head_count(graph: &Graph) -> usize {
    graph.nodes.iter().filter(|n| n.is_head()).count()
}

/// The node a push attaches to: the head, or when no node is marked, the
/// lowest node on the canvas (largest `y`). Ties go to the first node in
/// insertion order.
///
/// ```
/// use jumpgraph::v1::{Graph, Node, SourceLocation, query};
///
/// let loc = SourceLocation::new("file:///a.rs", 0, 0);
/// let graph = Graph {
///     nodes: vec![
///         Node::new("low", loc.clone(), "").with_position(0.0, 200.0),
///         Node::new("high", loc, "").with_position(0.0, 10.0),
///     ],
///     edges: vec![],
/// };
/// assert_eq!(query::previous_head(&graph).unwrap().id, "low");
/// ```
pub fn previous_head(graph: &Graph) -> Option<&Node> {
    head(graph).or_else(|| {
        graph.nodes.iter().fold(None, |lowest: Option<&Node>, n| match lowest {
            Some(l) if l.position.y >= n.position.y => Some(l),
            _ => Some(n),
        })
    })
}

/// Nodes with an edge into `node_id`, ordered by their first such edge.
/// Each node appears once.
pub fn incomers<'a>(graph: &'a Graph, node_id: &str) -> Vec<&'a Node> {
    let mut result: Vec<&Node> = Vec::new();
    for edge in graph.edges.iter().filter(|e| e.target == node_id) {
        if result.iter().any(|n| n.id == edge.source) {
            continue;
        }
        if let Some(source) = node(graph, &edge.source) {
            result.push(source);
        }
    }
    result
}

/// The source of the most recently added edge into `node_id`, ignoring
/// self-loops.
pub fn last_incomer<'a>(graph: &'a Graph, node_id: &str) -> Option<&'a Node> {
    graph
        .edges
        .iter()
        .rev()
        .filter(|e| e.target == node_id && e.source != node_id)
        .find_map(|e| node(graph, &e.source))
}
