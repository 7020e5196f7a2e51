#![doc = include_str!("../README.md")]

mod error;
mod ops;
mod query;
mod types;
mod uri;

pub mod v1 {
    //! Versioned public API for jump graph types and operations.
    //!
    //! # Documents
    //!
    //! - [`Graph`]: the persisted document: nodes plus edges
    //! - [`Node`], [`NodeData`]: one visited location, its note, and head flag
    //! - [`Edge`], [`Anchor`]: a directed link between two node anchors
    //! - [`SourceLocation`], [`Position`]: where a node points and where it sits
    //!
    //! # Operations
    //!
    //! [`ops`] holds the mutations: `push_node`, `pop_node`, `set_head`,
    //! `rename_note`, and the canvas edits `apply_node_changes`,
    //! `apply_edge_changes`, `connect`. [`query`] holds the lookups.
    //!
    //! # Example: push two locations, then pop back
    //!
    //! ```
    //! use jumpgraph::v1::*;
    //!
    //! let caller = SourceLocation::new("workspace:///src/main.rs", 4, 0);
    //! let callee = SourceLocation::new("workspace:///src/lib.rs", 9, 2);
    //!
    //! let graph = ops::push_node(Graph::new(), caller.clone(), "run();");
    //! let graph = ops::push_node(graph, callee, "pub fn run() {");
    //! assert_eq!(query::head(&graph).unwrap().data.note, "pub fn run() {");
    //!
    //! let (graph, back) = ops::pop_node(graph);
    //! assert_eq!(back.unwrap().data.source_location, caller);
    //! assert_eq!(graph.nodes.len(), 1);
    //!
    //! let json = graph.to_json_pretty().unwrap();
    //! assert_eq!(Graph::from_json(&json).unwrap(), graph);
    //! ```

    /// Graph mutations. Each takes the graph by value and returns the result.
    pub mod ops {
        pub use crate::ops::{
            Connection, Dimensions, EdgeChange, NodeChange, ORIGIN, PUSH_STEP, apply_edge_changes,
            apply_node_changes, connect, pop_node, push_node, rename_note, set_head,
        };
    }

    /// Lookups over a graph.
    pub mod query {
        pub use crate::query::{head, head_count, incomers, last_incomer, node, previous_head};
    }

    pub use crate::error::{GraphError, Result};
    pub use crate::types::{
        Anchor, Edge, Graph, Node, NodeData, Position, SourceLocation, fresh_id,
    };
    pub use crate::uri::{UriNormalizer, WORKSPACE_MARKER};
}
