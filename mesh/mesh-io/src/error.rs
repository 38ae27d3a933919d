//! Error types for mesh I/O operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur during mesh I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Unknown file format (unrecognized extension).
    #[error("unknown file format: .{extension}")]
    UnknownFormat {
        /// The unrecognized extension.
        extension: String,
    },

    /// Invalid file content (parse error).
    #[error("invalid file content at line {line}: {message}")]
    InvalidContent {
        /// 1-based line number, or 0 for binary content.
        line: usize,
        /// Description of what was invalid.
        message: String,
    },

    /// A face refers to a vertex that does not exist.
    #[error("face index {index} out of range (vertex count {vertex_count})")]
    IndexOutOfRange {
        /// The offending (resolved, 0-based) index.
        index: i64,
        /// Number of vertices defined so far.
        vertex_count: usize,
    },

    /// Binary STL ended before the declared triangle count.
    #[error("truncated STL: expected {expected} triangles, got {got}")]
    Truncated {
        /// Declared number of triangles.
        expected: u32,
        /// Number of triangles actually read.
        got: u32,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// Create an `InvalidContent` error for a text line.
    #[must_use]
    pub fn invalid_line(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidContent {
            line,
            message: message.into(),
        }
    }

    /// Create an `InvalidContent` error for binary content.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::invalid_line(0, message)
    }

    /// Map an `open` failure, turning `NotFound` into [`IoError::FileNotFound`].
    pub(crate) fn from_open(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(err)
        }
    }
}
