//! Test doubles shared by the router and runtime tests.

use std::sync::{Arc, Mutex};

use jumpgraph::v1::SourceLocation;

use crate::document::Document;
use crate::error::{Result, SessionError};
use crate::host::{FocusedLocation, Host, NavigationRequest};
use crate::protocol::ToPresentation;
use crate::router::SessionId;

#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    pub focus: Option<FocusedLocation>,
    pub created: usize,
    pub navigations: Vec<NavigationRequest>,
    pub presented: Vec<(SessionId, ToPresentation)>,
    pub errors: Vec<String>,
}

impl RecordingHost {
    pub fn focus(&mut self, uri: &str, line: u32, character: u32, text: &str) {
        self.focus = Some(FocusedLocation {
            location: SourceLocation::new(uri, line, character),
            line_text: text.into(),
        });
    }

    pub fn syncs(&self, id: &SessionId) -> usize {
        self.presented
            .iter()
            .filter(|(s, m)| s == id && matches!(m, ToPresentation::Sync { .. }))
            .count()
    }
}

impl Host for RecordingHost {
    fn focused_location(&self) -> Option<FocusedLocation> {
        self.focus.clone()
    }

    fn create_session(&mut self) {
        self.created += 1;
    }

    fn navigate(&mut self, request: NavigationRequest) {
        self.navigations.push(request);
    }

    fn present(&mut self, session: &SessionId, message: ToPresentation) {
        self.presented.push((session.clone(), message));
    }

    fn report_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

/// Records every write so tests can inspect them after handing the document
/// over to a router. Writes are refused while `failing` is set.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedDocument {
    pub writes: Arc<Mutex<Vec<String>>>,
    pub failing: Arc<Mutex<bool>>,
    pub initial: String,
}

impl SharedDocument {
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl Document for SharedDocument {
    fn text(&self) -> Result<String> {
        Ok(self
            .writes
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_else(|| self.initial.clone()))
    }

    fn replace(&mut self, text: &str) -> Result<()> {
        if *self.failing.lock().unwrap() {
            return Err(SessionError::ReadOnly(self.describe()));
        }
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "shared".into()
    }
}
