//! Text documents that hold a serialized graph.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, SessionError};

/// A text document a session reads its graph from and writes it back to.
///
/// Change notifications are not part of this trait; they arrive as
/// [`Event::DocumentChanged`](crate::runtime::Event::DocumentChanged), for
/// files typically from a [`DocumentWatcher`](crate::watcher::DocumentWatcher).
pub trait Document: Send {
    /// Current full text. A document that does not exist yet reads as empty.
    fn text(&self) -> Result<String>;

    /// Replace the full text in one edit.
    fn replace(&mut self, text: &str) -> Result<()>;

    /// Human-readable name for logs and error messages.
    fn describe(&self) -> String;
}

/// An untitled document that lives only in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    name: String,
    text: String,
    read_only: bool,
    writes: usize,
}

impl MemoryDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Reject every write, as storage that refuses edits would.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Document for MemoryDocument {
    fn text(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn replace(&mut self, text: &str) -> Result<()> {
        if self.read_only {
            return Err(SessionError::ReadOnly(self.name.clone()));
        }
        self.text = text.to_string();
        self.writes += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// A graph document stored as a JSON file.
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
}

impl FileDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Document for FileDocument {
    fn text(&self) -> Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes go to a temp file in the same directory which then replaces
    /// the target, so readers never see a half-written graph.
    fn replace(&mut self, text: &str) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .map_err(|e| SessionError::Persist {
                path: self.path.clone(),
                source: e.error,
            })?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
