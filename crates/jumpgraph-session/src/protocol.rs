//! Messages exchanged with the presentation layer (the graph canvas).
//!
//! Both directions are small JSON objects tagged by `type`:
//!
//! ```json
//! { "type": "PUSH", "sourceLocation": { "uri": "…", "line": 4, "character": 0 }, "note": "foo()" }
//! { "type": "JUMP", "sourceLocation": { "uri": "…", "line": 4, "character": 0 } }
//! { "type": "SYNC", "data": { "nodes": [], "edges": [] } }
//! ```

use jumpgraph::v1::ops::{Connection, EdgeChange, NodeChange};
use jumpgraph::v1::{Graph, SourceLocation};
use serde::{Deserialize, Serialize};

/// Core → presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToPresentation {
    /// A location was pushed; the following `SYNC` contains the new node.
    #[serde(rename_all = "camelCase")]
    Push {
        source_location: SourceLocation,
        note: String,
    },
    /// The head was popped; the following `SYNC` reflects it.
    Pop,
    /// The full graph to render.
    Sync { data: Graph },
}

/// Presentation → core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FromPresentation {
    /// The canvas is ready and needs the current graph.
    Init,
    /// The user asked to open a node's location (double-click).
    #[serde(rename_all = "camelCase")]
    Jump { source_location: SourceLocation },
    /// The canvas' whole graph after local edits.
    Sync { data: Graph },
    NodesChange { changes: Vec<NodeChange> },
    EdgesChange { changes: Vec<EdgeChange> },
    Connect { connection: Connection },
    /// The user clicked a node.
    #[serde(rename_all = "camelCase")]
    SetHead { node_id: String },
    /// The user edited a node's note.
    #[serde(rename_all = "camelCase")]
    Note { node_id: String, note: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_presentation_wire_format() {
        let push = ToPresentation::Push {
            source_location: SourceLocation::new("a.txt", 4, 0),
            note: "foo()".into(),
        };
        let json = serde_json::to_value(&push).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "PUSH",
                "sourceLocation": {"uri": "a.txt", "line": 4, "character": 0},
                "note": "foo()"
            })
        );
        assert_eq!(
            serde_json::to_string(&ToPresentation::Pop).unwrap(),
            r#"{"type":"POP"}"#
        );
        let sync = serde_json::to_value(ToPresentation::Sync { data: Graph::new() }).unwrap();
        assert_eq!(
            sync,
            serde_json::json!({"type": "SYNC", "data": {"nodes": [], "edges": []}})
        );
    }

    #[test]
    fn test_from_presentation_parses_canvas_messages() {
        let init: FromPresentation = serde_json::from_str(r#"{"type":"INIT"}"#).unwrap();
        assert_eq!(init, FromPresentation::Init);

        let jump: FromPresentation = serde_json::from_str(
            r#"{"type":"JUMP","sourceLocation":{"uri":"workspace:///a.rs","line":1,"character":2}}"#,
        )
        .unwrap();
        assert_eq!(
            jump,
            FromPresentation::Jump {
                source_location: SourceLocation::new("workspace:///a.rs", 1, 2)
            }
        );

        let head: FromPresentation =
            serde_json::from_str(r#"{"type":"SET_HEAD","nodeId":"n1"}"#).unwrap();
        assert_eq!(
            head,
            FromPresentation::SetHead {
                node_id: "n1".into()
            }
        );

        let nodes: FromPresentation = serde_json::from_str(
            r#"{"type":"NODES_CHANGE","changes":[{"type":"remove","id":"n1"}]}"#,
        )
        .unwrap();
        assert_eq!(
            nodes,
            FromPresentation::NodesChange {
                changes: vec![NodeChange::Remove { id: "n1".into() }]
            }
        );
    }

    #[test]
    fn test_unknown_message_rejected() {
        assert!(serde_json::from_str::<FromPresentation>(r#"{"type":"EXPLODE"}"#).is_err());
    }
}
