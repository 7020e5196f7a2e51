use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::GraphError;

/// A jump graph: the persisted navigation trail of one session.
///
/// `nodes` are kept in insertion order, which doubles as default z-order on
/// the canvas. `edges` order carries no meaning except for tie-breaking
/// [`query::last_incomer`](crate::query::last_incomer).
///
/// # JSON shape
///
/// ```json
/// {
///   "nodes": [
///     {
///       "id": "8d4c…",
///       "data": {
///         "isHead": true,
///         "sourceLocation": { "uri": "workspace:///src/main.rs", "line": 4, "character": 0 },
///         "note": "fn main() {"
///       },
///       "position": { "x": 40.0, "y": 40.0 }
///     }
///   ],
///   "edges": [
///     { "id": "f1e2…", "source": "8d4c…", "sourceHandle": "bottom", "target": "77aa…", "targetHandle": "top" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// One visited location on the canvas.
///
/// Properties the canvas widget attaches to a node (`selected`, `width`,
/// `height`, `type`, …) are kept verbatim in `extra` so that a document
/// edited by the widget round-trips without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub data: NodeData,
    #[serde(default)]
    pub position: Position,
    /// Widget-owned properties, kept in sorted key order.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The navigation payload of a node.
///
/// Keys this crate does not know (older documents carry `preview`) are kept
/// in `extra`, the same way [`Node`] keeps widget properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub is_head: bool,
    pub source_location: SourceLocation,
    #[serde(default)]
    pub note: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A position in a text document: zero-based line and character offsets.
///
/// `uri` is either a plain document URI or one rewritten relative to the
/// workspace root by [`UriNormalizer`](crate::uri::UriNormalizer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub uri: String,
    pub line: u32,
    pub character: u32,
}

/// Canvas coordinates of a node's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    #[serde(default = "Anchor::source_default", deserialize_with = "source_anchor")]
    pub source_handle: Anchor,
    pub target: String,
    #[serde(default = "Anchor::target_default", deserialize_with = "target_anchor")]
    pub target_handle: Anchor,
    /// Widget-owned properties, kept in sorted key order.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One of the four fixed connection points on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Right,
    Bottom,
    Left,
}

impl Anchor {
    fn source_default() -> Self {
        Anchor::Bottom
    }

    fn target_default() -> Self {
        Anchor::Top
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::Top => "top",
            Anchor::Right => "right",
            Anchor::Bottom => "bottom",
            Anchor::Left => "left",
        }
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Widgets write `null` for handles of edges drawn without an explicit anchor.
fn source_anchor<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Anchor, D::Error> {
    Ok(Option::<Anchor>::deserialize(deserializer)?.unwrap_or(Anchor::Bottom))
}

fn target_anchor<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Anchor, D::Error> {
    Ok(Option::<Anchor>::deserialize(deserializer)?.unwrap_or(Anchor::Top))
}

/// Generate a fresh, globally unique node or edge id.
pub fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================================================
// Convenience methods
// ============================================================================

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a graph document.
    ///
    /// Blank text reads as the empty graph. Edges whose `source` or `target`
    /// names a node that does not exist are dropped.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut graph: Graph = serde_json::from_str(json)?;
        graph.retain_resolved_edges();
        Ok(graph)
    }

    /// Serialize to minified JSON. This is the canonical form used to decide
    /// whether two graphs carry the same content.
    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to JSON pretty-printed with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Clear `isHead` on every head after the first, so at most one remains.
    pub fn retain_single_head(&mut self) {
        let mut seen = false;
        for node in &mut self.nodes {
            if node.data.is_head {
                node.data.is_head = !seen;
                seen = true;
            }
        }
    }

    /// Drop every edge that references a missing node.
    pub fn retain_resolved_edges(&mut self) {
        let nodes = &self.nodes;
        self.edges.retain(|edge| {
            nodes.iter().any(|n| n.id == edge.source) && nodes.iter().any(|n| n.id == edge.target)
        });
    }
}

impl Node {
    /// Create a node that is not the head, at the canvas origin.
    pub fn new(
        id: impl Into<String>,
        source_location: SourceLocation,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            data: NodeData {
                is_head: false,
                source_location,
                note: note.into(),
                extra: Map::new(),
            },
            position: Position::default(),
            extra: Map::new(),
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    pub fn with_head(mut self, is_head: bool) -> Self {
        self.data.is_head = is_head;
        self
    }

    pub fn is_head(&self) -> bool {
        self.data.is_head
    }

    pub fn source_location(&self) -> &SourceLocation {
        &self.data.source_location
    }
}

impl Edge {
    /// Create an edge anchored bottom → top, the shape push produces.
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            source_handle: Anchor::Bottom,
            target: target.into(),
            target_handle: Anchor::Top,
            extra: Map::new(),
        }
    }

    pub fn with_anchors(mut self, source_handle: Anchor, target_handle: Anchor) -> Self {
        self.source_handle = source_handle;
        self.target_handle = target_handle;
        self
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

impl SourceLocation {
    pub fn new(uri: impl Into<String>, line: u32, character: u32) -> Self {
        Self {
            uri: uri.into(),
            line,
            character,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.uri, self.line + 1, self.character + 1)
    }
}
