//! Errors raised while writing generated documents.

use std::path::PathBuf;

/// Error returned when a rendered document cannot be written out.
///
/// Rendering itself never fails; problems in the model become
/// [`Diagnostic`](crate::Diagnostic)s attached to the document.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file} is not well-formed XML: {source}")]
    Xml {
        file: String,
        #[source]
        source: quick_xml::Error,
    },
}
