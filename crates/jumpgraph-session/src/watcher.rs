//! Async Document Watcher
//!
//! Turns changes to a graph file on disk into
//! [`Event::DocumentChanged`](crate::runtime::Event::DocumentChanged). Uses
//! the `notify` crate for filesystem events with a periodic fallback poll.

use crate::error::Result;
use crate::router::SessionId;
use crate::runtime::Event;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Configuration for the document watcher
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Fallback poll interval (safety net for missed events)
    pub poll_interval: Duration,
    /// Minimum spacing between reads triggered by filesystem events
    pub debounce: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            debounce: Duration::from_millis(50),
        }
    }
}

/// Watches one session's graph file and reports its text whenever it
/// differs from the last text reported.
///
/// Our own writes are reported too; the session recognizes them as
/// already reconciled.
pub struct DocumentWatcher {
    session: SessionId,
    file_path: PathBuf,
    last_text: Arc<Mutex<Option<String>>>,
    config: WatcherConfig,
}

impl DocumentWatcher {
    pub fn new(session: SessionId, file_path: PathBuf, config: Option<WatcherConfig>) -> Self {
        Self {
            session,
            file_path,
            last_text: Arc::new(Mutex::new(None)),
            config: config.unwrap_or_default(),
        }
    }

    /// Read the file now. Returns its text if it changed since the last
    /// read; a missing file is not a change.
    pub async fn poll(&self) -> Result<Option<String>> {
        read_if_changed(&self.file_path, &self.last_text).await
    }

    /// Start watching and send changes to `tx` as
    /// [`Event::DocumentChanged`].
    ///
    /// The current text is sent once at startup. Falls back to polling only
    /// when a filesystem watcher cannot be created; fails if the file's
    /// directory cannot be watched.
    pub async fn start(self, tx: mpsc::Sender<Event>) -> Result<WatcherHandle> {
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        let session = self.session.clone();
        let file_path = self.file_path.clone();
        let last_text = self.last_text.clone();
        let poll_interval = self.config.poll_interval;
        let debounce = self.config.debounce;

        let (event_tx, mut event_rx) = mpsc::channel::<()>(16);

        // Atomic saves replace the file, so creates and renames count too.
        let file_name = file_path.file_name().map(|n| n.to_os_string());
        let watcher_result = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| {
                if let Ok(event) = res
                    && !event.kind.is_access()
                    && event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name)
                {
                    let _ = event_tx.try_send(());
                }
            },
        );

        let mut watcher: Option<RecommendedWatcher> = match watcher_result {
            Ok(mut w) => {
                w.watch(watch_dir(&file_path), RecursiveMode::NonRecursive)?;
                Some(w)
            }
            Err(e) => {
                warn!(error = %e, "failed to create file watcher, polling only");
                None
            }
        };

        let handle = tokio::spawn(async move {
            let mut poll_timer = tokio::time::interval(poll_interval);
            let mut last_event: Option<tokio::time::Instant> = None;

            loop {
                tokio::select! {
                    _ = stop_rx.recv() => {
                        break;
                    }

                    Some(()) = event_rx.recv() => {
                        let now = tokio::time::Instant::now();
                        if let Some(prev) = last_event
                            && now.duration_since(prev) < debounce
                        {
                            // The tail of the burst is caught by the next event or poll.
                            continue;
                        }
                        last_event = Some(now);
                        if !forward(&session, &file_path, &last_text, &tx).await {
                            break;
                        }
                    }

                    _ = poll_timer.tick() => {
                        if !forward(&session, &file_path, &last_text, &tx).await {
                            break;
                        }
                    }
                }
            }

            drop(watcher.take());
            debug!(path = %file_path.display(), "watcher stopped");
        });

        Ok(WatcherHandle {
            stop_tx,
            _task: handle,
        })
    }
}

fn watch_dir(file_path: &Path) -> &Path {
    match file_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

async fn read_if_changed(
    file_path: &Path,
    last_text: &Arc<Mutex<Option<String>>>,
) -> Result<Option<String>> {
    let text = match tokio::fs::read_to_string(file_path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut last = last_text.lock().await;
    if last.as_deref() == Some(text.as_str()) {
        return Ok(None);
    }
    *last = Some(text.clone());
    Ok(Some(text))
}

/// Returns false once the receiver is gone.
async fn forward(
    session: &SessionId,
    file_path: &Path,
    last_text: &Arc<Mutex<Option<String>>>,
    tx: &mpsc::Sender<Event>,
) -> bool {
    match read_if_changed(file_path, last_text).await {
        Ok(Some(text)) => {
            debug!(session = %session, bytes = text.len(), "document changed on disk");
            tx.send(Event::DocumentChanged {
                session: session.clone(),
                text,
            })
            .await
            .is_ok()
        }
        Ok(None) => true,
        Err(e) => {
            warn!(path = %file_path.display(), error = %e, "failed to read document");
            true
        }
    }
}

/// Handle to control a running watcher
pub struct WatcherHandle {
    stop_tx: mpsc::Sender<()>,
    _task: tokio::task::JoinHandle<()>,
}

impl WatcherHandle {
    /// Stop the watcher
    pub async fn stop(self) {
        let _ = self.stop_tx.send(()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::time::timeout;

    fn fast() -> Option<WatcherConfig> {
        Some(WatcherConfig {
            poll_interval: Duration::from_millis(50),
            debounce: Duration::from_millis(10),
        })
    }

    async fn next_text(rx: &mut mpsc::Receiver<Event>) -> String {
        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for watcher")
            .expect("channel closed");
        match event {
            Event::DocumentChanged { session, text } => {
                assert_eq!(session, SessionId::new("s1"));
                text
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_poll_reports_only_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trail.jump-graph");
        let watcher = DocumentWatcher::new(SessionId::new("s1"), path.clone(), None);

        assert_eq!(watcher.poll().await.unwrap(), None);

        std::fs::write(&path, "one").unwrap();
        assert_eq!(watcher.poll().await.unwrap().as_deref(), Some("one"));
        assert_eq!(watcher.poll().await.unwrap(), None);

        std::fs::write(&path, "two").unwrap();
        assert_eq!(watcher.poll().await.unwrap().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_watcher_start_and_stop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trail.jump-graph");
        std::fs::write(&path, "first").unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let handle = DocumentWatcher::new(SessionId::new("s1"), path.clone(), fast())
            .start(tx)
            .await
            .unwrap();

        assert_eq!(next_text(&mut rx).await, "first");

        std::fs::write(&path, "second").unwrap();
        assert_eq!(next_text(&mut rx).await, "second");

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_start_fails_for_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone/trail.jump-graph");
        let (tx, _rx) = mpsc::channel(1);
        let result = DocumentWatcher::new(SessionId::new("s1"), path, None)
            .start(tx)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_watcher_sees_atomic_replace() {
        use crate::document::{Document, FileDocument};

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trail.jump-graph");
        let mut doc = FileDocument::new(&path);
        doc.replace("v1").unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let handle = DocumentWatcher::new(SessionId::new("s1"), path.clone(), fast())
            .start(tx)
            .await
            .unwrap();
        assert_eq!(next_text(&mut rx).await, "v1");

        doc.replace("v2").unwrap();
        assert_eq!(next_text(&mut rx).await, "v2");

        handle.stop().await;
    }
}
