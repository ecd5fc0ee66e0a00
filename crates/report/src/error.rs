// Error types for report generation

use runstats_core::AggregateError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Input path is not a file: {0}")]
    NotAFile(PathBuf),

    #[error("No records in {0}")]
    EmptyData(PathBuf),

    /// The row reader rejected the input
    #[error(transparent)]
    Load(#[from] AggregateError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize chart data: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ReportError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
