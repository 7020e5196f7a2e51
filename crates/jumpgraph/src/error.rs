use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors from parsing or serializing a graph document.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The text is not JSON, or is JSON that does not have the graph shape.
    #[error("malformed graph document: {0}")]
    Malformed(#[from] serde_json::Error),
}
