// Error types for the aggregation pipeline

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for aggregation operations
pub type Result<T> = std::result::Result<T, AggregateError>;

/// Errors that can occur while collecting, normalizing or exporting run data
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Filesystem error on a specific path
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structured artifact could not be parsed
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A required bundle artifact is missing
    #[error("Missing required artifact: {0}")]
    MissingArtifact(PathBuf),

    /// Row-oriented export/import error
    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Structured data had an unexpected shape
    #[error("Invalid data in {path}: {message}")]
    InvalidData { path: PathBuf, message: String },

    /// Resource store could not be queried
    #[error("Resource store error: {0}")]
    ResourceStore(String),
}

impl AggregateError {
    /// Create an I/O error bound to a path
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        AggregateError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a parse error bound to a path
    pub fn parse(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        AggregateError::Parse {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a CSV error bound to a path
    pub fn csv(path: impl AsRef<Path>, source: csv::Error) -> Self {
        AggregateError::Csv {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an invalid data error
    pub fn invalid(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        AggregateError::InvalidData {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a resource store error
    pub fn store(msg: impl Into<String>) -> Self {
        AggregateError::ResourceStore(msg.into())
    }
}
