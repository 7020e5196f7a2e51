//! Graph mutations.
//!
//! Every operation takes the graph by value and returns the updated graph.
//! None of them fail: an operation that names a missing node leaves the
//! graph unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query;
use crate::types::{Anchor, Edge, Graph, Node, Position, SourceLocation, fresh_id};

/// Where the first node of an empty graph is placed.
pub const ORIGIN: Position = Position { x: 40.0, y: 40.0 };

/// Vertical distance between a pushed node and the node it was pushed from.
pub const PUSH_STEP: f64 = 90.0;

// ============================================================================
// Canvas change vocabulary
// ============================================================================

/// A structural change to a node, as reported by the canvas widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeChange {
    /// The node was dragged. `position` is absent for drag start/end
    /// notifications that do not move the node.
    Position {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dragging: Option<bool>,
    },
    /// The widget measured the rendered node.
    Dimensions {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dimensions: Option<Dimensions>,
    },
    Select {
        id: String,
        selected: bool,
    },
    Remove {
        id: String,
    },
    /// A head among added nodes takes the head from every other node.
    Add {
        item: Node,
    },
    /// Reset changes in a batch replace the whole node list with their
    /// items, and every other change in that batch is ignored.
    Reset {
        item: Node,
    },
}

/// Rendered size of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// A structural change to an edge, as reported by the canvas widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EdgeChange {
    Select { id: String, selected: bool },
    Remove { id: String },
    Add { item: Edge },
    /// Replaces the whole edge list, like [`NodeChange::Reset`].
    Reset { item: Edge },
}

/// A user-drawn connection between two node anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<Anchor>,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<Anchor>,
}

// ============================================================================
// Navigation operations
// ============================================================================

/// Record a new location as the head of the trail.
///
/// The new node is appended last, placed [`PUSH_STEP`] below the previous
/// head (see [`query::previous_head`]) or at [`ORIGIN`] when the graph is
/// empty, and linked from the previous head with a bottom → top edge.
///
/// ```
/// use jumpgraph::v1::{Graph, SourceLocation, ops};
///
/// let g = ops::push_node(Graph::new(), SourceLocation::new("a.txt", 4, 0), "foo()");
/// let g = ops::push_node(g, SourceLocation::new("a.txt", 9, 2), "bar()");
///
/// assert_eq!(g.nodes.len(), 2);
/// assert!(g.nodes[1].is_head());
/// assert_eq!(g.nodes[1].position.y, 130.0);
/// assert_eq!(g.edges[0].source, g.nodes[0].id);
/// ```
pub fn push_node(mut graph: Graph, source_location: SourceLocation, note: impl Into<String>) -> Graph {
    let previous = query::previous_head(&graph).map(|n| (n.id.clone(), n.position));

    for node in &mut graph.nodes {
        node.data.is_head = false;
    }

    let id = fresh_id();
    let position = match &previous {
        Some((_, p)) => Position {
            x: p.x,
            y: p.y + PUSH_STEP,
        },
        None => ORIGIN,
    };
    graph.nodes.push(
        Node::new(&id, source_location, note)
            .with_position(position.x, position.y)
            .with_head(true),
    );

    if let Some((previous_id, _)) = previous {
        graph.edges.push(Edge::new(fresh_id(), previous_id, id));
    }
    graph
}

/// Remove the head node and return to its last incomer.
///
/// Edges touching the removed node go with it. The returned node is the new
/// head as it appears in the updated graph, or `None` when there was no head
/// or the head had no incoming edge (in which case the graph is left with no
/// head).
///
/// ```
/// use jumpgraph::v1::{Graph, SourceLocation, ops};
///
/// let a = SourceLocation::new("a.txt", 4, 0);
/// let g = ops::push_node(Graph::new(), a.clone(), "foo()");
/// let g = ops::push_node(g, SourceLocation::new("a.txt", 9, 2), "bar()");
///
/// let (g, target) = ops::pop_node(g);
/// assert_eq!(g.nodes.len(), 1);
/// assert_eq!(target.unwrap().data.source_location, a);
/// ```
pub fn pop_node(mut graph: Graph) -> (Graph, Option<Node>) {
    let Some(head_id) = query::head(&graph).map(|n| n.id.clone()) else {
        return (graph, None);
    };
    let target_id = query::last_incomer(&graph, &head_id).map(|n| n.id.clone());

    graph.nodes.retain(|n| n.id != head_id);
    graph.edges.retain(|e| !e.touches(&head_id));
    for node in &mut graph.nodes {
        node.data.is_head = target_id.as_deref() == Some(node.id.as_str());
    }

    let target = target_id.and_then(|id| query::node(&graph, &id).cloned());
    (graph, target)
}

/// Make `node_id` the head. Unknown ids leave the graph unchanged.
pub fn set_head(mut graph: Graph, node_id: &str) -> Graph {
    if query::node(&graph, node_id).is_none() {
        return graph;
    }
    for node in &mut graph.nodes {
        node.data.is_head = node.id == node_id;
    }
    graph
}

/// Replace the note on `node_id`. Unknown ids leave the graph unchanged.
pub fn rename_note(mut graph: Graph, node_id: &str, note: impl Into<String>) -> Graph {
    if let Some(node) = graph.nodes.iter_mut().find(|n| n.id == node_id) {
        node.data.note = note.into();
    }
    graph
}

// ============================================================================
// Canvas edits
// ============================================================================

/// Fold node changes from the canvas into the graph, in order.
///
/// Removing a node also removes every edge touching it. Adding a node whose
/// id is already present is ignored. A batch holding any
/// [`NodeChange::Reset`] replaces the node list with the reset items, drops
/// edges left dangling, and keeps only the first head among them.
pub fn apply_node_changes(mut graph: Graph, changes: &[NodeChange]) -> Graph {
    if changes.iter().any(|c| matches!(c, NodeChange::Reset { .. })) {
        graph.nodes = changes
            .iter()
            .filter_map(|c| match c {
                NodeChange::Reset { item } => Some(item.clone()),
                _ => None,
            })
            .collect();
        graph.retain_single_head();
        graph.retain_resolved_edges();
        return graph;
    }
    for change in changes {
        match change {
            NodeChange::Position { id, position, .. } => {
                if let Some(position) = position
                    && let Some(node) = graph.nodes.iter_mut().find(|n| &n.id == id)
                {
                    node.position = *position;
                }
            }
            NodeChange::Dimensions { id, dimensions } => {
                if let Some(d) = dimensions
                    && let Some(node) = graph.nodes.iter_mut().find(|n| &n.id == id)
                {
                    node.extra.insert("width".into(), Value::from(d.width));
                    node.extra.insert("height".into(), Value::from(d.height));
                }
            }
            NodeChange::Select { id, selected } => {
                if let Some(node) = graph.nodes.iter_mut().find(|n| &n.id == id) {
                    node.extra.insert("selected".into(), Value::Bool(*selected));
                }
            }
            NodeChange::Remove { id } => {
                graph.nodes.retain(|n| &n.id != id);
                graph.edges.retain(|e| !e.touches(id));
            }
            NodeChange::Add { item } => {
                if query::node(&graph, &item.id).is_none() {
                    if item.is_head() {
                        for node in &mut graph.nodes {
                            node.data.is_head = false;
                        }
                    }
                    graph.nodes.push(item.clone());
                }
            }
            NodeChange::Reset { .. } => {}
        }
    }
    graph
}

/// Fold edge changes from the canvas into the graph, in order.
///
/// Adding an edge whose endpoints are missing, or whose id is already
/// present, is ignored. A batch holding any [`EdgeChange::Reset`] replaces
/// the edge list with the reset items that resolve.
pub fn apply_edge_changes(mut graph: Graph, changes: &[EdgeChange]) -> Graph {
    if changes.iter().any(|c| matches!(c, EdgeChange::Reset { .. })) {
        graph.edges = changes
            .iter()
            .filter_map(|c| match c {
                EdgeChange::Reset { item } => Some(item.clone()),
                _ => None,
            })
            .collect();
        graph.retain_resolved_edges();
        return graph;
    }
    for change in changes {
        match change {
            EdgeChange::Select { id, selected } => {
                if let Some(edge) = graph.edges.iter_mut().find(|e| &e.id == id) {
                    edge.extra.insert("selected".into(), Value::Bool(*selected));
                }
            }
            EdgeChange::Remove { id } => {
                graph.edges.retain(|e| &e.id != id);
            }
            EdgeChange::Add { item } => {
                let resolved = query::node(&graph, &item.source).is_some()
                    && query::node(&graph, &item.target).is_some();
                if resolved && !graph.edges.iter().any(|e| e.id == item.id) {
                    graph.edges.push(item.clone());
                }
            }
            EdgeChange::Reset { .. } => {}
        }
    }
    graph
}

/// Add a user-drawn edge.
///
/// Missing anchors default to bottom → top. Connections to a missing node,
/// and duplicates of an existing edge with the same endpoints and anchors,
/// are ignored.
pub fn connect(mut graph: Graph, connection: &Connection) -> Graph {
    if query::node(&graph, &connection.source).is_none()
        || query::node(&graph, &connection.target).is_none()
    {
        return graph;
    }
    let source_handle = connection.source_handle.unwrap_or(Anchor::Bottom);
    let target_handle = connection.target_handle.unwrap_or(Anchor::Top);
    let exists = graph.edges.iter().any(|e| {
        e.source == connection.source
            && e.target == connection.target
            && e.source_handle == source_handle
            && e.target_handle == target_handle
    });
    if !exists {
        graph.edges.push(
            Edge::new(fresh_id(), &connection.source, &connection.target)
                .with_anchors(source_handle, target_handle),
        );
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32, character: u32) -> SourceLocation {
        SourceLocation::new("a.txt", line, character)
    }

    fn chain(n: u32) -> Graph {
        (0..n).fold(Graph::new(), |g, i| push_node(g, loc(i, 0), format!("line {i}")))
    }

    fn id_of(graph: &Graph, index: usize) -> String {
        graph.nodes[index].id.clone()
    }

    // ── push / pop ─────────────────────────────────────────────────────

    #[test]
    fn test_push_into_empty_graph() {
        let g = push_node(Graph::new(), loc(4, 0), "foo()");
        assert_eq!(g.nodes.len(), 1);
        assert!(g.nodes[0].is_head());
        assert_eq!(g.nodes[0].position, ORIGIN);
        assert_eq!(g.nodes[0].data.note, "foo()");
        assert!(g.edges.is_empty());
    }

    #[test]
    fn test_second_push_links_from_previous_head() {
        let g = push_node(Graph::new(), loc(4, 0), "foo()");
        let g = push_node(g, loc(9, 2), "bar()");

        assert_eq!(g.nodes.len(), 2);
        assert!(!g.nodes[0].is_head());
        assert_eq!(g.nodes[0].position, Position { x: 40.0, y: 40.0 });
        assert!(g.nodes[1].is_head());
        assert_eq!(g.nodes[1].position, Position { x: 40.0, y: 130.0 });

        assert_eq!(g.edges.len(), 1);
        let edge = &g.edges[0];
        assert_eq!(edge.source, g.nodes[0].id);
        assert_eq!(edge.target, g.nodes[1].id);
        assert_eq!(edge.source_handle, Anchor::Bottom);
        assert_eq!(edge.target_handle, Anchor::Top);
    }

    #[test]
    fn test_pop_returns_to_previous() {
        let g = push_node(Graph::new(), loc(4, 0), "foo()");
        let g = push_node(g, loc(9, 2), "bar()");
        let first = id_of(&g, 0);

        let (g, target) = pop_node(g);
        assert_eq!(g.nodes.len(), 1);
        assert!(g.edges.is_empty());
        assert!(g.nodes[0].is_head());
        let target = target.unwrap();
        assert_eq!(target.id, first);
        assert!(target.is_head());
        assert_eq!(target.data.source_location, loc(4, 0));
    }

    #[test]
    fn test_push_pop_inverse_on_chain() {
        let mut g = chain(5);
        for expected in (0..4).rev() {
            let (next, target) = pop_node(g);
            assert_eq!(target.unwrap().data.source_location, loc(expected, 0));
            assert_eq!(query::head_count(&next), 1);
            g = next;
        }
        let (g, target) = pop_node(g);
        assert!(target.is_none());
        assert!(g.nodes.is_empty());
        assert!(g.edges.is_empty());
    }

    #[test]
    fn test_pop_without_head_is_noop() {
        let mut g = chain(2);
        for node in &mut g.nodes {
            node.data.is_head = false;
        }
        let before = g.clone();
        let (after, target) = pop_node(g);
        assert_eq!(after, before);
        assert!(target.is_none());
    }

    #[test]
    fn test_pop_with_branching_returns_to_sole_incomer() {
        // A → B, then re-head A and push C: A → C.
        let g = push_node(Graph::new(), loc(1, 0), "A");
        let a = id_of(&g, 0);
        let g = push_node(g, loc(2, 0), "B");
        let b = id_of(&g, 1);
        let g = set_head(g, &a);
        let g = push_node(g, loc(3, 0), "C");
        assert_eq!(g.nodes[2].position.y, 130.0);

        let (g, target) = pop_node(g);
        assert_eq!(target.unwrap().id, a);
        assert_eq!(query::head(&g).unwrap().id, a);
        assert!(query::node(&g, &b).is_some());
        assert_eq!(g.edges.len(), 1);
    }

    #[test]
    fn test_pop_prefers_most_recent_incoming_edge() {
        let g = chain(3);
        let (a, b, c) = (id_of(&g, 0), id_of(&g, 1), id_of(&g, 2));
        // c already has b → c; a later manual edge a → c wins.
        let g = connect(
            g,
            &Connection {
                source: a.clone(),
                source_handle: Some(Anchor::Right),
                target: c,
                target_handle: Some(Anchor::Right),
            },
        );
        let (g, target) = pop_node(g);
        assert_eq!(target.unwrap().id, a);
        assert!(!query::node(&g, &b).unwrap().is_head());
    }

    #[test]
    fn test_pop_head_without_incomer_leaves_no_head() {
        let g = chain(2);
        let first = id_of(&g, 0);
        let g = set_head(g, &first);
        let (g, target) = pop_node(g);
        assert!(target.is_none());
        assert_eq!(g.nodes.len(), 1);
        assert!(g.edges.is_empty());
        assert_eq!(query::head_count(&g), 0);
    }

    #[test]
    fn test_push_without_head_uses_lowest_node() {
        let json = r#"{"nodes":[
            {"id":"a","data":{"sourceLocation":{"uri":"u","line":0,"character":0}},"position":{"x":10,"y":300}},
            {"id":"b","data":{"sourceLocation":{"uri":"u","line":1,"character":0}},"position":{"x":99,"y":20}}
        ],"edges":[]}"#;
        let g = Graph::from_json(json).unwrap();
        let g = push_node(g, loc(7, 0), "");
        let new = g.nodes.last().unwrap();
        assert_eq!(new.position, Position { x: 10.0, y: 390.0 });
        assert_eq!(g.edges[0].source, "a");
    }

    #[test]
    fn test_at_most_one_head_through_mixed_ops() {
        let mut g = Graph::new();
        for i in 0..6 {
            g = push_node(g, loc(i, 0), "");
            assert_eq!(query::head_count(&g), 1);
        }
        let third = id_of(&g, 2);
        g = set_head(g, &third);
        assert_eq!(query::head_count(&g), 1);
        g = push_node(g, loc(10, 0), "");
        assert_eq!(query::head_count(&g), 1);
        while !g.is_empty() {
            let (next, _) = pop_node(g);
            assert!(query::head_count(&next) <= 1);
            g = match query::head(&next) {
                Some(_) => next,
                None if next.is_empty() => next,
                None => {
                    let id = id_of(&next, 0);
                    set_head(next, &id)
                }
            };
        }
        assert_eq!(query::head_count(&g), 0);
    }

    // ── set_head / rename_note ─────────────────────────────────────────

    #[test]
    fn test_set_head_unknown_is_noop() {
        let g = chain(2);
        assert_eq!(set_head(g.clone(), "nope"), g);
    }

    #[test]
    fn test_rename_note() {
        let g = chain(2);
        let first = id_of(&g, 0);
        let g = rename_note(g, &first, "entry point");
        assert_eq!(g.nodes[0].data.note, "entry point");
        assert_eq!(rename_note(g.clone(), "nope", "x"), g);
    }

    // ── canvas edits ───────────────────────────────────────────────────

    #[test]
    fn test_node_remove_cascades_edges() {
        let g = chain(3);
        let middle = id_of(&g, 1);
        let g = apply_node_changes(g, &[NodeChange::Remove { id: middle }]);
        assert_eq!(g.nodes.len(), 2);
        assert!(g.edges.is_empty());
    }

    #[test]
    fn test_node_move_and_select() {
        let g = chain(1);
        let id = id_of(&g, 0);
        let g = apply_node_changes(
            g,
            &[
                NodeChange::Position {
                    id: id.clone(),
                    position: Some(Position { x: 5.0, y: 6.0 }),
                    dragging: Some(true),
                },
                NodeChange::Position {
                    id: id.clone(),
                    position: None,
                    dragging: Some(false),
                },
                NodeChange::Select {
                    id: id.clone(),
                    selected: true,
                },
                NodeChange::Dimensions {
                    id,
                    dimensions: Some(Dimensions {
                        width: 180.0,
                        height: 40.0,
                    }),
                },
            ],
        );
        assert_eq!(g.nodes[0].position, Position { x: 5.0, y: 6.0 });
        assert_eq!(g.nodes[0].extra["selected"], Value::Bool(true));
        assert_eq!(g.nodes[0].extra["width"], Value::from(180.0));
    }

    #[test]
    fn test_node_add_ignores_duplicate_id() {
        let g = chain(1);
        let extra = Node::new("x", loc(3, 3), "added");
        let g = apply_node_changes(g, &[NodeChange::Add { item: extra.clone() }]);
        let g = apply_node_changes(g, &[NodeChange::Add { item: extra }]);
        assert_eq!(g.nodes.len(), 2);
        assert_eq!(query::head_count(&g), 1);
    }

    #[test]
    fn test_added_head_takes_over() {
        let g = chain(2);
        let pasted = Node::new("x", loc(7, 0), "pasted").with_head(true);
        let g = apply_node_changes(g, &[NodeChange::Add { item: pasted }]);
        assert_eq!(query::head_count(&g), 1);
        assert_eq!(query::head(&g).map(|n| n.id.as_str()), Some("x"));
    }

    #[test]
    fn test_node_reset_replaces_list() {
        let g = chain(3);
        let (a, b) = (g.nodes[0].clone(), g.nodes[1].clone());
        let g = apply_node_changes(
            g,
            &[
                NodeChange::Reset {
                    item: a.clone().with_head(true),
                },
                NodeChange::Remove { id: a.id.clone() },
                NodeChange::Reset {
                    item: b.clone().with_head(true),
                },
            ],
        );
        let ids: Vec<_> = g.nodes.iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids, vec![a.id.clone(), b.id.clone()]);
        assert_eq!(query::head_count(&g), 1);
        assert_eq!(query::head(&g).map(|n| n.id.clone()), Some(a.id));
        // The edge into the dropped third node goes with it.
        assert_eq!(g.edges.len(), 1);
        assert_eq!(g.edges[0].target, b.id);
    }

    #[test]
    fn test_edge_reset_replaces_list() {
        let g = chain(3);
        let (a, c) = (id_of(&g, 0), id_of(&g, 2));
        let g = apply_edge_changes(
            g,
            &[
                EdgeChange::Reset {
                    item: Edge::new("skip", &a, &c),
                },
                EdgeChange::Reset {
                    item: Edge::new("dangling", &a, "ghost"),
                },
            ],
        );
        assert_eq!(g.edges.len(), 1);
        assert_eq!(g.edges[0].id, "skip");
    }

    #[test]
    fn test_edge_changes() {
        let g = chain(2);
        let (a, b) = (id_of(&g, 0), id_of(&g, 1));
        let pushed_edge = g.edges[0].id.clone();

        let g = apply_edge_changes(
            g,
            &[
                EdgeChange::Add {
                    item: Edge::new("dangling", &a, "ghost"),
                },
                EdgeChange::Add {
                    item: Edge::new("back", &b, &a).with_anchors(Anchor::Left, Anchor::Left),
                },
                EdgeChange::Select {
                    id: "back".into(),
                    selected: true,
                },
                EdgeChange::Remove { id: pushed_edge },
            ],
        );
        assert_eq!(g.edges.len(), 1);
        assert_eq!(g.edges[0].id, "back");
        assert_eq!(g.edges[0].extra["selected"], Value::Bool(true));
    }

    #[test]
    fn test_connect_ignores_duplicates_and_missing() {
        let g = chain(2);
        let (a, b) = (id_of(&g, 0), id_of(&g, 1));
        let duplicate = Connection {
            source: a.clone(),
            source_handle: None,
            target: b.clone(),
            target_handle: None,
        };
        let g = connect(g, &duplicate);
        assert_eq!(g.edges.len(), 1);

        let missing = Connection {
            source: a.clone(),
            source_handle: None,
            target: "ghost".into(),
            target_handle: None,
        };
        let g = connect(g, &missing);
        assert_eq!(g.edges.len(), 1);

        let side = Connection {
            source: b,
            source_handle: Some(Anchor::Right),
            target: a,
            target_handle: Some(Anchor::Left),
        };
        let g = connect(g, &side);
        assert_eq!(g.edges.len(), 2);
        assert_eq!(g.edges[1].source_handle, Anchor::Right);
        assert_eq!(g.edges[1].target_handle, Anchor::Left);
    }

    #[test]
    fn test_change_wire_format() {
        let change: NodeChange = serde_json::from_str(
            r#"{"type":"position","id":"n1","position":{"x":1,"y":2},"dragging":true}"#,
        )
        .unwrap();
        assert_eq!(
            change,
            NodeChange::Position {
                id: "n1".into(),
                position: Some(Position { x: 1.0, y: 2.0 }),
                dragging: Some(true),
            }
        );
        let connection: Connection = serde_json::from_str(
            r#"{"source":"a","sourceHandle":"right","target":"b","targetHandle":null}"#,
        )
        .unwrap();
        assert_eq!(connection.source_handle, Some(Anchor::Right));
        assert_eq!(connection.target_handle, None);
    }
}
