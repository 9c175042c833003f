//! Failure modes of the quote source and the history store

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    /// The remote page could not be retrieved (non-success status or transport failure)
    #[error("Price source unavailable: {0}")]
    SourceUnavailable(String),

    /// The remote page was retrieved but the price table could not be read
    #[error("Failed to parse price table: {0}")]
    ParseFailure(String),

    /// No persisted history exists at the configured path
    #[error("Price history not found at {}", .0.display())]
    HistoryNotFound(PathBuf),

    #[error("Price history at {} is malformed: {reason}", .path.display())]
    HistoryCorrupt { path: PathBuf, reason: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TrackerError {
    /// Whether the update step may degrade to rendering the existing history.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TrackerError::SourceUnavailable(_))
    }
}
