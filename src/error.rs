//! Error handling for IDIS extraction operations.
//!
//! Provides error types with context for layout parsing, archive
//! expansion, output writing and configuration failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Input path not found: {path}")]
    PathNotFound { path: PathBuf },

    #[error("Malformed layout in file: {path} (line {line}) - {reason}")]
    MalformedLayout {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("No data rows after layout block in file: {path}")]
    TruncatedFile { path: PathBuf },

    #[error("Unsupported output format: '{format}' (expected csv or parquet)")]
    UnsupportedFormat { format: String },

    #[error("Output file already written during this run: {path}")]
    DuplicateOutput { path: PathBuf },

    #[error("Archive error in file: {path} - {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Directory traversal error: {0}")]
    DirectoryTraversal(#[from] walkdir::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl IdisError {
    /// Create a malformed layout error for a specific line of a file
    pub fn malformed(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedLayout {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IdisError>;
