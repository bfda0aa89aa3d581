//! Model loading errors.

/// Error while loading a documentation model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// The node list is empty.
    #[error("model contains no nodes")]
    Empty,
    /// A node refers to something that does not exist.
    #[error("invalid node {index}: {message}")]
    InvalidNode {
        /// Position of the node in the node list.
        index: usize,
        /// What is wrong with it.
        message: String,
    },
}
