//! Routes host commands and canvas messages to sessions.

use std::collections::HashMap;

use jumpgraph::v1::{Graph, SourceLocation, UriNormalizer, ops, query};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::bridge::{Reconciled, SyncBridge, SyncConfig};
use crate::debounce::Debouncer;
use crate::document::Document;
use crate::error::{Result, SessionError};
use crate::host::{Host, NavigationRequest, ViewColumn};
use crate::protocol::{FromPresentation, ToPresentation};

/// Identifies one open graph document and its canvas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

struct Session {
    document: Box<dyn Document>,
    bridge: SyncBridge,
    /// Set when the last write attempt failed.
    save_failed: bool,
}

/// Owns every open session and decides which one push and pop act on.
///
/// Sessions are ordered by activation; the most recently activated open
/// session is the target of [`push`](Self::push) and [`pop`](Self::pop).
/// Local changes are written back to each session's document after a
/// per-session quiet period (see [`SyncConfig::debounce`]); the owner drives
/// that by calling [`flush_due`](Self::flush_due) at
/// [`next_flush`](Self::next_flush), as [`run`](crate::runtime::run) does.
pub struct CommandRouter<H> {
    host: H,
    normalizer: UriNormalizer,
    sessions: HashMap<SessionId, Session>,
    activation: Vec<SessionId>,
    writes: Debouncer<SessionId>,
    last_view_column: Option<ViewColumn>,
}

impl<H: Host> CommandRouter<H> {
    pub fn new(host: H, normalizer: UriNormalizer, config: SyncConfig) -> Self {
        Self {
            host,
            normalizer,
            sessions: HashMap::new(),
            activation: Vec::new(),
            writes: Debouncer::new(config.debounce),
            last_view_column: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn normalizer(&self) -> &UriNormalizer {
        &self.normalizer
    }

    /// The session push and pop act on.
    pub fn active_session(&self) -> Option<&SessionId> {
        self.activation.last()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn graph(&self, id: &SessionId) -> Option<&Graph> {
        self.sessions.get(id).map(|s| s.bridge.graph())
    }

    pub fn document(&self, id: &SessionId) -> Option<&dyn Document> {
        self.sessions.get(id).map(|s| s.document.as_ref())
    }

    pub fn has_pending_write(&self, id: &SessionId) -> bool {
        self.writes.is_pending(id)
    }

    /// Whether the most recent write of `id` failed. Cleared by the next
    /// successful write; read and parse problems never set it.
    pub fn save_failed(&self, id: &SessionId) -> bool {
        self.sessions.get(id).is_some_and(|s| s.save_failed)
    }

    // ── Session lifecycle ──────────────────────────────────────────────

    /// Open a session over `document` and make it active.
    ///
    /// The graph is loaded from the document's current text. A document that
    /// cannot be read or parsed still opens, with an empty graph, and the
    /// problem is reported to the user.
    pub fn attach(&mut self, id: SessionId, document: Box<dyn Document>) {
        if self.sessions.contains_key(&id) {
            debug!(session = %id, "session already attached");
            self.on_activated(&id);
            return;
        }
        info!(session = %id, document = %document.describe(), "attaching session");

        let mut bridge = SyncBridge::new();
        match document.text() {
            Ok(text) => {
                if let Err(e) = bridge.on_document_changed(&text) {
                    warn!(session = %id, error = %e, "failed to parse graph document");
                    self.host
                        .report_error(&format!("Jump Graph: failed to parse {}: {e}", document.describe()));
                }
            }
            Err(e) => {
                warn!(session = %id, error = %e, "failed to read graph document");
                self.host
                    .report_error(&format!("Jump Graph: failed to read {}: {e}", document.describe()));
            }
        }

        self.sessions.insert(
            id.clone(),
            Session {
                document,
                bridge,
                save_failed: false,
            },
        );
        self.activation.push(id);
    }

    /// The session's canvas gained focus.
    pub fn on_activated(&mut self, id: &SessionId) {
        if !self.sessions.contains_key(id) {
            debug!(session = %id, "ignoring activation of unknown session");
            return;
        }
        self.activation.retain(|s| s != id);
        self.activation.push(id.clone());
    }

    /// The session's canvas was closed. Pending changes are written first.
    pub fn on_closed(&mut self, id: &SessionId) {
        if self.writes.is_pending(id) {
            self.writes.cancel(id);
            self.flush(id);
        }
        if self.sessions.remove(id).is_some() {
            info!(session = %id, "session closed");
        }
        self.activation.retain(|s| s != id);
    }

    /// A text editor gained focus in `column`; jumps open there.
    pub fn on_editor_focused(&mut self, column: ViewColumn) {
        self.last_view_column = Some(column);
    }

    // ── Inbound changes ────────────────────────────────────────────────

    /// The session's document changed, possibly because of our own write.
    pub fn on_document_changed(&mut self, id: &SessionId, text: &str) {
        let Some(session) = self.sessions.get_mut(id) else {
            return;
        };
        match session.bridge.on_document_changed(text) {
            Ok(Reconciled::Unchanged) => {}
            Ok(Reconciled::Replaced) => {
                let data = session.bridge.graph().clone();
                self.host.present(id, ToPresentation::Sync { data });
            }
            Err(e) => {
                warn!(session = %id, error = %e, "ignoring unparsable document change");
                self.host
                    .report_error(&format!("Jump Graph: failed to parse JSON: {e}"));
            }
        }
    }

    /// A message from the session's canvas.
    pub fn on_presentation_message(&mut self, id: &SessionId, message: FromPresentation) {
        let Some(session) = self.sessions.get_mut(id) else {
            debug!(session = %id, "message for unknown session");
            return;
        };
        match message {
            FromPresentation::Init => {
                let data = session.bridge.graph().clone();
                self.host.present(id, ToPresentation::Sync { data });
            }
            FromPresentation::Jump { source_location } => {
                self.navigate(&source_location);
            }
            FromPresentation::Sync { mut data } => {
                data.retain_resolved_edges();
                data.retain_single_head();
                session.bridge.replace(data);
                self.writes.schedule(id.clone(), Instant::now());
            }
            FromPresentation::NodesChange { changes } => {
                session
                    .bridge
                    .update(|g| ops::apply_node_changes(g, &changes));
                self.local_edit(id);
            }
            FromPresentation::EdgesChange { changes } => {
                session
                    .bridge
                    .update(|g| ops::apply_edge_changes(g, &changes));
                self.local_edit(id);
            }
            FromPresentation::Connect { connection } => {
                session.bridge.update(|g| ops::connect(g, &connection));
                self.local_edit(id);
            }
            FromPresentation::SetHead { node_id } => {
                session.bridge.update(|g| ops::set_head(g, &node_id));
                self.local_edit(id);
            }
            FromPresentation::Note { node_id, note } => {
                session.bridge.update(|g| ops::rename_note(g, &node_id, note));
                self.local_edit(id);
            }
        }
    }

    // ── Commands ───────────────────────────────────────────────────────

    /// Record the focused location in the active session.
    ///
    /// Does nothing when no session is open or nothing is focused.
    pub fn push(&mut self) {
        let Some(id) = self.active_session().cloned() else {
            debug!("push with no open session");
            return;
        };
        let Some(focus) = self.host.focused_location() else {
            debug!("push with nothing focused");
            return;
        };
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };

        let source_location = self.normalizer.normalize_location(&focus.location);
        let note = focus.line_text.trim().to_string();
        session.bridge.update(|g| ops::push_node(g, source_location.clone(), note.clone()));
        debug!(session = %id, location = %source_location, "pushed");

        let data = session.bridge.graph().clone();
        self.host.present(
            &id,
            ToPresentation::Push {
                source_location,
                note,
            },
        );
        self.host.present(&id, ToPresentation::Sync { data });
        self.writes.schedule(id, Instant::now());
    }

    /// Pop the active session's head and navigate to the node it returns to.
    ///
    /// Does nothing when no session is open or the graph has no head.
    pub fn pop(&mut self) {
        let Some(id) = self.active_session().cloned() else {
            debug!("pop with no open session");
            return;
        };
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        if query::head(session.bridge.graph()).is_none() {
            debug!(session = %id, "pop with no head");
            return;
        }

        let mut target = None;
        session.bridge.update(|g| {
            let (g, returned_to) = ops::pop_node(g);
            target = returned_to;
            g
        });

        let data = session.bridge.graph().clone();
        self.host.present(&id, ToPresentation::Pop);
        self.host.present(&id, ToPresentation::Sync { data });
        self.writes.schedule(id, Instant::now());

        if let Some(node) = target {
            self.navigate(node.source_location());
        }
    }

    /// Ask the host for a new, empty session.
    pub fn open_new_session(&mut self) {
        self.host.create_session();
    }

    /// Navigate the host to a stored location.
    pub fn navigate(&mut self, location: &SourceLocation) {
        let location = self.normalizer.denormalize_location(location);
        let column = self.last_view_column.unwrap_or(ViewColumn::Primary);
        debug!(location = %location, ?column, "navigating");
        self.host
            .navigate(NavigationRequest::preview(location, column));
    }

    // ── Writes ─────────────────────────────────────────────────────────

    /// When the earliest pending write is due.
    pub fn next_flush(&self) -> Option<Instant> {
        self.writes.next_deadline()
    }

    /// Write every session whose quiet period has elapsed.
    pub fn flush_due(&mut self) {
        for id in self.writes.due(Instant::now()) {
            self.flush(&id);
        }
    }

    /// Write every session with pending changes now.
    pub fn flush_all(&mut self) {
        for id in self.writes.drain() {
            self.flush(&id);
        }
    }

    /// Write one session immediately, bypassing the debounce.
    pub fn flush_session(&mut self, id: &SessionId) -> Result<()> {
        if !self.sessions.contains_key(id) {
            return Err(SessionError::UnknownSession(id.clone()));
        }
        self.writes.cancel(id);
        self.flush(id);
        Ok(())
    }

    fn local_edit(&mut self, id: &SessionId) {
        if let Some(session) = self.sessions.get(id) {
            let data = session.bridge.graph().clone();
            self.host.present(id, ToPresentation::Sync { data });
        }
        self.writes.schedule(id.clone(), Instant::now());
    }

    fn flush(&mut self, id: &SessionId) {
        let Some(session) = self.sessions.get_mut(id) else {
            return;
        };
        let text = match session.bridge.flush() {
            Ok(Some(text)) => text,
            Ok(None) => return,
            Err(e) => {
                session.save_failed = true;
                warn!(session = %id, error = %e, "failed to serialize graph");
                self.host
                    .report_error(&format!("Jump Graph: failed to serialize graph: {e}"));
                return;
            }
        };
        debug!(session = %id, bytes = text.len(), "writing document");
        let result = session.document.replace(&text);
        session.save_failed = result.is_err();
        if let Err(e) = result {
            warn!(session = %id, error = %e, "document write failed");
            self.host.report_error(&format!(
                "Jump Graph: failed to save {}: {e}",
                session.document.describe()
            ));
        }
    }
}
