use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jumpgraph::v1::Graph;
use jumpgraph_session::{FocusedLocation, Host, NavigationRequest, SessionId, ToPresentation};

/// State the host shares with whoever plays the editor and the canvas.
#[derive(Debug, Default)]
pub struct Mirror {
    /// Cursor positions waiting for a push, oldest first. Each push
    /// consumes one.
    pub focus: VecDeque<FocusedLocation>,
    /// The graph as last presented.
    pub graph: Graph,
}

pub type SharedMirror = Arc<Mutex<Mirror>>;

pub fn lock(mirror: &SharedMirror) -> MutexGuard<'_, Mirror> {
    mirror.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Host for the command line. One-shot commands inspect what it collected
/// afterwards; `watch` runs it with `echo` on so requests print as they
/// happen.
#[derive(Debug, Default)]
pub struct CliHost {
    mirror: SharedMirror,
    echo: bool,
    pub navigations: Vec<NavigationRequest>,
    pub errors: Vec<String>,
}

impl CliHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echoing(mirror: SharedMirror) -> Self {
        Self {
            mirror,
            echo: true,
            ..Default::default()
        }
    }

    pub fn mirror(&self) -> &SharedMirror {
        &self.mirror
    }

    pub fn queue_focus(&self, focus: FocusedLocation) {
        lock(&self.mirror).focus.push_back(focus);
    }
}

impl Host for CliHost {
    fn focused_location(&self) -> Option<FocusedLocation> {
        lock(&self.mirror).focus.pop_front()
    }

    fn create_session(&mut self) {
        if self.echo {
            eprintln!("start another session with `jg new <file>` and `jg watch`");
        }
    }

    fn navigate(&mut self, request: NavigationRequest) {
        if self.echo {
            match serde_json::to_string(&request) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("error: {e}"),
            }
        }
        self.navigations.push(request);
    }

    fn present(&mut self, _session: &SessionId, message: ToPresentation) {
        if let ToPresentation::Sync { data } = message {
            lock(&self.mirror).graph = data;
        }
    }

    fn report_error(&mut self, message: &str) {
        if self.echo {
            eprintln!("error: {message}");
        }
        self.errors.push(message.to_string());
    }
}
