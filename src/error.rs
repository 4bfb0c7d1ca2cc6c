//! Error types for examdocx library.

use std::io;
use thiserror::Error;

/// Result type alias for examdocx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while editing, validating, or exporting papers.
#[derive(Error, Debug)]
pub enum Error {
    /// A field value or model invariant is invalid.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A content tree contains a node, mark, or nesting outside the grammar.
    #[error("Unsupported node '{node}' inside '{parent}' at {location}")]
    UnsupportedNode {
        /// Kind of the offending node (or mark)
        node: String,
        /// Kind of the enclosing node
        parent: String,
        /// Where in the paper the node was found
        location: String,
    },

    /// An image or logo reference could not be resolved by the asset store.
    #[error("Missing asset: {0}")]
    MissingAsset(String),

    /// An asset resolved, but its bytes are not a supported image.
    #[error("Invalid asset '{name}': {reason}")]
    InvalidAsset {
        /// Asset filename
        name: String,
        /// Why the asset was rejected
        reason: String,
    },

    /// An operation referenced an identifier that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The paper/template store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The asset store refused an upload.
    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    /// Writing the document package failed.
    #[error("Package error: {0}")]
    Package(String),

    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Whether this error aborts a render call (as opposed to store/upload failures).
    pub fn is_render_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::UnsupportedNode { .. }
                | Error::MissingAsset(_)
                | Error::InvalidAsset { .. }
                | Error::Package(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingAsset("diagram.png".into());
        assert_eq!(err.to_string(), "Missing asset: diagram.png");

        let err = Error::UnsupportedNode {
            node: "text".into(),
            parent: "table".into(),
            location: "question 2 content".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported node 'text' inside 'table' at question 2 content"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_render_error());
    }

    #[test]
    fn test_render_error_classification() {
        assert!(Error::validation("bad").is_render_error());
        assert!(Error::MissingAsset("x".into()).is_render_error());
        assert!(!Error::NotFound("q1".into()).is_render_error());
        assert!(!Error::UploadRejected("too big".into()).is_render_error());
    }
}
