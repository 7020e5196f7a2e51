//! Opening a graph file as a session, shared by every subcommand.

use anyhow::{Context, Result, bail};
use jumpgraph::v1::{SourceLocation, UriNormalizer};
use jumpgraph_session::{
    CommandRouter, FileDocument, FocusedLocation, SessionId, SyncConfig,
};
use std::path::{Path, PathBuf};

use crate::host::CliHost;

/// A router with exactly one session: the graph file.
pub struct Opened {
    pub router: CommandRouter<CliHost>,
    pub id: SessionId,
}

impl Opened {
    /// Write pending changes and fail if anything went wrong on the way.
    pub fn finish(mut self) -> Result<CommandRouter<CliHost>> {
        self.router.flush_all();
        if let Some(error) = self.router.host().errors.first() {
            bail!("{error}");
        }
        Ok(self.router)
    }
}

/// Open `path` in a fresh router.
///
/// Refuses documents that do not parse, so a later write can't replace a
/// graph the user still has to fix by hand.
pub fn open(
    path: &Path,
    root: Option<&Path>,
    config: SyncConfig,
    host: CliHost,
) -> Result<Opened> {
    let normalizer = normalizer(root)?;
    let mut router = CommandRouter::new(host, normalizer, config);
    let id = session_id(path);
    router.attach(id.clone(), Box::new(FileDocument::new(path)));
    if let Some(error) = router.host().errors.first() {
        bail!("{error}");
    }
    Ok(Opened { router, id })
}

pub fn session_id(path: &Path) -> SessionId {
    SessionId::new(path.display().to_string())
}

/// Normalizer for `root`, or for the current directory.
pub fn normalizer(root: Option<&Path>) -> Result<UriNormalizer> {
    let dir = match root {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let dir = dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve workspace root {}", dir.display()))?;
    Ok(UriNormalizer::new(path_to_uri(&dir)))
}

pub fn path_to_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Accept either a URI or a filesystem path, returning a URI.
pub fn to_uri(arg: &str) -> Result<String> {
    if arg.contains("://") {
        return Ok(arg.to_string());
    }
    let path = PathBuf::from(arg)
        .canonicalize()
        .with_context(|| format!("Failed to resolve {arg}"))?;
    Ok(path_to_uri(&path))
}

/// Text of `line` (0-based) in a local file, if the URI names one.
pub fn line_text(uri: &str, line: u32) -> Option<String> {
    let path = uri.strip_prefix("file://")?;
    let text = std::fs::read_to_string(path).ok()?;
    text.lines().nth(line as usize).map(str::to_string)
}

/// Where the "cursor" is for a push from the command line.
pub fn focus_at(uri: &str, line: u32, character: u32, note: Option<String>) -> Result<FocusedLocation> {
    let uri = to_uri(uri)?;
    let line_text = match note {
        Some(note) => note,
        None => line_text(&uri, line).unwrap_or_default(),
    };
    Ok(FocusedLocation {
        location: SourceLocation::new(uri, line, character),
        line_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_line_text_reads_local_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.rs");
        fs::write(&file, "fn main() {\n    run();\n}\n").unwrap();
        let uri = path_to_uri(&file);
        assert_eq!(line_text(&uri, 1).as_deref(), Some("    run();"));
        assert_eq!(line_text(&uri, 9), None);
        assert_eq!(line_text("untitled:Untitled-1", 0), None);
    }

    #[test]
    fn test_to_uri_passes_uris_through() {
        assert_eq!(to_uri("file:///x/y.rs").unwrap(), "file:///x/y.rs");
        assert!(to_uri("/definitely/not/here.rs").is_err());
    }

    #[test]
    fn test_focus_at_prefers_explicit_note() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.rs");
        fs::write(&file, "line zero\n").unwrap();
        let uri = path_to_uri(&file);

        let focus = focus_at(&uri, 0, 3, None).unwrap();
        assert_eq!(focus.line_text, "line zero");
        assert_eq!(focus.location.character, 3);

        let focus = focus_at(&uri, 0, 0, Some("custom".into())).unwrap();
        assert_eq!(focus.line_text, "custom");
    }

    #[test]
    fn test_open_rejects_unparsable_document() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("bad.jump-graph");
        fs::write(&file, "{ nope").unwrap();
        let result = open(&file, Some(dir.path()), SyncConfig::default(), CliHost::new());
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&file).unwrap(), "{ nope");
    }
}
