//! Generate Graphviz DOT visualizations from jump graphs.
//!
//! Each node becomes a box labelled with its note and a short `file:line`
//! location; the head is drawn bold. Edges leave and enter through the
//! compass port matching their anchor, so the picture keeps the canvas'
//! top-to-bottom flow.
//!
//! # Example
//!
//! ```
//! use jumpgraph::v1::{Graph, SourceLocation, ops};
//! use jumpgraph_dot::{render, RenderOptions};
//!
//! let graph = ops::push_node(Graph::new(), SourceLocation::new("file:///src/main.rs", 4, 0), "run();");
//! let graph = ops::push_node(graph, SourceLocation::new("file:///src/lib.rs", 9, 2), "pub fn run() {");
//!
//! let dot = render(&graph, &RenderOptions::default());
//! assert!(dot.contains("digraph jumpgraph"));
//! assert!(dot.contains("main.rs:5"));
//! ```
//!
//! Pipe the output through Graphviz to produce images:
//!
//! ```bash
//! jg render dot --session trail.jump-graph | dot -Tpng -o trail.png
//! ```
//!
//! With [`RenderOptions::pin_positions`] the canvas layout is kept; render
//! with `neato -n` instead of `dot`.

use jumpgraph::v1::{Anchor, Graph, Node, Position, SourceLocation};

const HEAD_FILL: &str = "#cce5ff";
const NODE_FILL: &str = "#f8f9fa";
const NOTE_MAX_CHARS: usize = 40;

/// Options controlling what information is rendered in the DOT output.
pub struct RenderOptions {
    /// Include each node's `file:line` under its note.
    pub show_locations: bool,
    /// Pin nodes at their canvas coordinates.
    pub pin_positions: bool,
    /// Graph title drawn above the nodes.
    pub title: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_locations: true,
            pin_positions: false,
            title: None,
        }
    }
}

/// Render a [`Graph`] as a DOT digraph.
pub fn render(graph: &Graph, options: &RenderOptions) -> String {
    let mut dot = String::new();
    dot.push_str("digraph jumpgraph {\n");
    dot.push_str("  rankdir=TB;\n");
    dot.push_str("  node [shape=box, style=\"rounded,filled\", fontname=\"Helvetica\"];\n");
    dot.push_str("  edge [color=\"#333333\"];\n\n");

    if let Some(title) = &options.title {
        dot.push_str("  labelloc=\"t\";\n");
        dot.push_str(&format!("  label=\"{}\";\n", escape_dot(title)));
        dot.push_str("  fontsize=16;\n");
        dot.push_str("  fontname=\"Helvetica-Bold\";\n\n");
    }

    for node in &graph.nodes {
        let label = format_node_label_html(node, options);
        let (fillcolor, style, penwidth) = if node.is_head() {
            (HEAD_FILL, "rounded,filled,bold", "3")
        } else {
            (NODE_FILL, "rounded,filled", "1")
        };
        let pos = if options.pin_positions {
            format!(", pos=\"{}!\"", format_pos(&node.position))
        } else {
            String::new()
        };
        dot.push_str(&format!(
            "  \"{}\" [label={}, fillcolor=\"{}\", style=\"{}\", penwidth={}{}];\n",
            escape_dot(&node.id),
            label,
            fillcolor,
            style,
            penwidth,
            pos
        ));
    }

    if !graph.edges.is_empty() {
        dot.push('\n');
    }

    for edge in &graph.edges {
        dot.push_str(&format!(
            "  \"{}\":{} -> \"{}\":{};\n",
            escape_dot(&edge.source),
            anchor_port(edge.source_handle),
            escape_dot(&edge.target),
            anchor_port(edge.target_handle)
        ));
    }

    dot.push_str("}\n");
    dot
}

fn format_node_label_html(node: &Node, options: &RenderOptions) -> String {
    let mut rows = vec![];

    let note = node.data.note.trim();
    if !note.is_empty() {
        rows.push(format!("<b>{}</b>", escape_html(&truncate(note, NOTE_MAX_CHARS))));
    }

    if options.show_locations || rows.is_empty() {
        rows.push(format!(
            "<font point-size=\"9\" color=\"#666666\">{}</font>",
            escape_html(&short_location(&node.data.source_location))
        ));
    }

    format!("<{}>", rows.join("<br/>"))
}

/// Compass port an edge attaches to for a given anchor.
pub fn anchor_port(anchor: Anchor) -> &'static str {
    match anchor {
        Anchor::Top => "n",
        Anchor::Right => "e",
        Anchor::Bottom => "s",
        Anchor::Left => "w",
    }
}

/// File name and 1-based line, e.g. `main.rs:5`.
pub fn short_location(location: &SourceLocation) -> String {
    let uri = location.uri.trim_end_matches('/');
    let file = uri.rsplit('/').next().unwrap_or(uri);
    format!("{}:{}", file, location.line + 1)
}

/// Canvas y grows downward; Graphviz y grows upward.
fn format_pos(position: &Position) -> String {
    format!("{},{}", position.x, 0.0 - position.y)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}\u{2026}", truncated)
    } else {
        s.to_string()
    }
}

/// Escape a string for use in DOT label attributes (double-quoted context).
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Escape a string for use inside HTML-like DOT labels.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
