//! The seam between the core and the editor that embeds it.

use jumpgraph::v1::SourceLocation;
use serde::{Deserialize, Serialize};

use crate::protocol::ToPresentation;
use crate::router::SessionId;

/// What the editor is focused on when the user pushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedLocation {
    /// Location of the cursor, with the document's full URI.
    pub location: SourceLocation,
    /// Text of the line the cursor is on.
    pub line_text: String,
}

/// Editor column (split pane) a document opens in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewColumn {
    /// The first column, used when the last active one is unknown.
    Primary,
    /// A specific column, numbered from 1.
    Column(u32),
}

/// A collapsed selection at one line and character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub line: u32,
    pub character: u32,
}

/// Ask the editor to show a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationRequest {
    /// Target location with the URI restored to its real root.
    pub location: SourceLocation,
    pub view_column: ViewColumn,
    /// Open as a preview rather than a pinned tab.
    pub preview: bool,
    pub selection: Selection,
}

impl NavigationRequest {
    pub fn preview(location: SourceLocation, view_column: ViewColumn) -> Self {
        let selection = Selection {
            line: location.line,
            character: location.character,
        };
        Self {
            location,
            view_column,
            preview: true,
            selection,
        }
    }
}

/// The editor, as seen by the [`CommandRouter`](crate::router::CommandRouter).
///
/// The core never reaches into the editor's UI. It asks for the focused
/// location, asks for new sessions, and hands over messages and navigation
/// requests; everything else is up to the implementation.
pub trait Host {
    /// The cursor location, or `None` when no text editor has focus.
    fn focused_location(&self) -> Option<FocusedLocation>;

    /// Create and show a new, empty graph document. The host later attaches
    /// it with [`CommandRouter::attach`](crate::router::CommandRouter::attach).
    fn create_session(&mut self);

    /// Show a location in an editor column.
    fn navigate(&mut self, request: NavigationRequest);

    /// Deliver a message to a session's canvas.
    fn present(&mut self, session: &SessionId, message: ToPresentation);

    /// Show a non-fatal error to the user.
    fn report_error(&mut self, message: &str);
}
