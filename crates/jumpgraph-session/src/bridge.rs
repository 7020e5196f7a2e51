//! Keeps an in-memory graph and its document convergent.
//!
//! Both directions compare against one remembered value: the minified
//! serialization last known to be on both sides. A document change that
//! matches it is the echo of our own write; a graph change that matches it
//! has already been written. Neither direction needs to know who caused a
//! change.

use std::time::Duration;

use jumpgraph::v1::{Graph, GraphError};
use tracing::debug;

/// Bridge settings.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Quiet period before local changes are written to the document.
    pub debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
        }
    }
}

/// What a document change did to the in-memory graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    /// Content matched what was already reconciled.
    Unchanged,
    /// The in-memory graph was replaced; the presentation needs a re-render.
    Replaced,
}

/// Owner of a session's graph and of its last reconciled serialization.
#[derive(Debug, Default)]
pub struct SyncBridge {
    graph: Graph,
    last_observed: Option<String>,
}

impl SyncBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn last_observed(&self) -> Option<&str> {
        self.last_observed.as_deref()
    }

    /// Apply a local mutation to the graph. Nothing is written; the caller
    /// schedules a debounced [`on_graph_changed`](Self::on_graph_changed).
    pub fn update(&mut self, f: impl FnOnce(Graph) -> Graph) {
        let graph = std::mem::take(&mut self.graph);
        self.graph = f(graph);
    }

    /// Replace the graph with one reported by the presentation.
    pub fn replace(&mut self, graph: Graph) {
        self.graph = graph;
    }

    /// Reconcile the document's new text into the graph.
    ///
    /// On a parse error the graph and the remembered serialization are left
    /// untouched.
    pub fn on_document_changed(&mut self, raw: &str) -> Result<Reconciled, GraphError> {
        let graph = Graph::from_json(raw)?;
        let minified = graph.to_json()?;
        if self.last_observed.as_deref() == Some(minified.as_str()) {
            debug!("document change already reconciled");
            return Ok(Reconciled::Unchanged);
        }
        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "document changed, replacing graph"
        );
        self.last_observed = Some(minified);
        self.graph = graph;
        Ok(Reconciled::Replaced)
    }

    /// Reconcile `graph` towards the document.
    ///
    /// Returns the pretty-printed text to write, or `None` when the document
    /// already holds this content. The content counts as reconciled from
    /// this point on, even if the caller's write later fails.
    pub fn on_graph_changed(&mut self, graph: &Graph) -> Result<Option<String>, GraphError> {
        let minified = graph.to_json()?;
        if self.last_observed.as_deref() == Some(minified.as_str()) {
            debug!("graph change already reconciled");
            return Ok(None);
        }
        let pretty = graph.to_json_pretty()?;
        self.last_observed = Some(minified);
        Ok(Some(pretty))
    }

    /// Reconcile the bridge's own graph towards the document.
    pub fn flush(&mut self) -> Result<Option<String>, GraphError> {
        let graph = std::mem::take(&mut self.graph);
        let result = self.on_graph_changed(&graph);
        self.graph = graph;
        result
    }
}
