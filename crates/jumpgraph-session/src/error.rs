use std::path::PathBuf;
use thiserror::Error;

use crate::router::SessionId;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Graph(#[from] jumpgraph::v1::GraphError),

    #[cfg(feature = "watcher")]
    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("failed to persist document {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unknown session: {0}")]
    UnknownSession(SessionId),

    #[error("document is read-only: {0}")]
    ReadOnly(String),
}
