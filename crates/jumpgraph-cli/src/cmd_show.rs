use anyhow::{Context, Result};
use jumpgraph::v1::Graph;
use jumpgraph_dot::short_location;
use std::fmt::Write;
use std::path::PathBuf;

pub fn run(session: PathBuf, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(&session)
        .with_context(|| format!("Failed to read {}", session.display()))?;
    let graph = Graph::from_json(&text)
        .with_context(|| format!("Failed to parse {}", session.display()))?;
    if json {
        println!("{}", graph.to_json_pretty()?);
    } else {
        print!("{}", format_graph(&graph));
    }
    Ok(())
}

/// One line per node in push order, head marked with `*`, then the edges.
pub fn format_graph(graph: &Graph) -> String {
    let mut out = String::new();
    if graph.nodes.is_empty() {
        out.push_str("(empty)\n");
        return out;
    }
    for node in &graph.nodes {
        let marker = if node.is_head() { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {}  {}  {}",
            node.id,
            short_location(node.source_location()),
            node.data.note
        );
    }
    for edge in &graph.edges {
        let _ = writeln!(
            out,
            "  {}:{} -> {}:{}",
            edge.source, edge.source_handle, edge.target, edge.target_handle
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use jumpgraph::v1::{SourceLocation, ops};

    #[test]
    fn test_format_empty() {
        assert_eq!(format_graph(&Graph::new()), "(empty)\n");
    }

    #[test]
    fn test_format_marks_head() {
        let g = ops::push_node(Graph::new(), SourceLocation::new("file:///a.rs", 0, 0), "one");
        let g = ops::push_node(g, SourceLocation::new("file:///b.rs", 4, 0), "two");
        let out = format_graph(&g);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("  "));
        assert!(lines[0].ends_with("a.rs:1  one"));
        assert!(lines[1].starts_with("* "));
        assert!(lines[1].ends_with("b.rs:5  two"));
        assert!(lines[2].contains(":bottom -> "));
        assert!(lines[2].ends_with(":top"));
    }
}
