//! Single-task event loop around a [`CommandRouter`].
//!
//! Everything the router reacts to arrives as an [`Event`] on one channel, so
//! all state changes happen on one task and no locking is needed. Debounced
//! writes fire from the same loop.

use std::ops::ControlFlow;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use crate::document::Document;
use crate::host::{Host, ViewColumn};
use crate::protocol::FromPresentation;
use crate::router::{CommandRouter, SessionId};

/// User-invoked commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Open a new, empty session.
    New,
    /// Record the focused location in the active session.
    Push,
    /// Return to the previous location in the active session.
    Pop,
}

/// Something the router should react to.
pub enum Event {
    Command(Command),
    /// A session was opened over `document`.
    Attach {
        session: SessionId,
        document: Box<dyn Document>,
    },
    /// A session's canvas gained focus.
    Activated(SessionId),
    /// A session's canvas was closed.
    Closed(SessionId),
    /// A text editor gained focus.
    EditorFocused(ViewColumn),
    /// A session's document text changed.
    DocumentChanged { session: SessionId, text: String },
    /// A session's canvas sent a message.
    Presentation {
        session: SessionId,
        message: FromPresentation,
    },
    /// Write pending changes and stop.
    Shutdown,
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::Command(c) => f.debug_tuple("Command").field(c).finish(),
            Event::Attach { session, document } => f
                .debug_struct("Attach")
                .field("session", session)
                .field("document", &document.describe())
                .finish(),
            Event::Activated(s) => f.debug_tuple("Activated").field(s).finish(),
            Event::Closed(s) => f.debug_tuple("Closed").field(s).finish(),
            Event::EditorFocused(c) => f.debug_tuple("EditorFocused").field(c).finish(),
            Event::DocumentChanged { session, text } => f
                .debug_struct("DocumentChanged")
                .field("session", session)
                .field("bytes", &text.len())
                .finish(),
            Event::Presentation { session, message } => f
                .debug_struct("Presentation")
                .field("session", session)
                .field("message", message)
                .finish(),
            Event::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl<H: Host> CommandRouter<H> {
    /// Apply one event. Breaks on [`Event::Shutdown`].
    pub fn handle(&mut self, event: Event) -> ControlFlow<()> {
        match event {
            Event::Command(Command::New) => self.open_new_session(),
            Event::Command(Command::Push) => self.push(),
            Event::Command(Command::Pop) => self.pop(),
            Event::Attach { session, document } => self.attach(session, document),
            Event::Activated(session) => self.on_activated(&session),
            Event::Closed(session) => self.on_closed(&session),
            Event::EditorFocused(column) => self.on_editor_focused(column),
            Event::DocumentChanged { session, text } => self.on_document_changed(&session, &text),
            Event::Presentation { session, message } => {
                self.on_presentation_message(&session, message)
            }
            Event::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }
}

/// Drive `router` until [`Event::Shutdown`] arrives or every sender is
/// dropped. Pending writes are flushed before returning the router.
pub async fn run<H: Host>(
    mut router: CommandRouter<H>,
    mut events: mpsc::Receiver<Event>,
) -> CommandRouter<H> {
    info!("jump graph runtime started");
    loop {
        let deadline = router.next_flush();
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    debug!("event channel closed");
                    break;
                };
                debug!(?event, "event");
                if router.handle(event).is_break() {
                    break;
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                router.flush_due();
            }
        }
    }
    router.flush_all();
    info!("jump graph runtime stopped");
    router
}
