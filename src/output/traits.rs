//! Result sink traits and error types
//!
//! This module defines the trait every output format implements and the
//! errors a sink can raise. Any sink error is fatal to the crawl session.

use crate::output::OutputFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output file {0} is already closed")]
    Closed(PathBuf),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Append-only destination for visited URLs
///
/// A sink is opened once per session, receives one `append` per visited URL,
/// and is closed once when the session ends normally. Every `append` reaches
/// the file before it returns, so a crash after N appends leaves N records on
/// disk.
pub trait ResultSink: Send {
    /// The format this sink writes
    fn format(&self) -> OutputFormat;

    /// Path of the file being written
    fn path(&self) -> &Path;

    /// Writes one URL record
    ///
    /// # Errors
    ///
    /// Returns `OutputError::Closed` after `close`, or the underlying I/O or
    /// encoding error.
    fn append(&mut self, url: &str) -> OutputResult<()>;

    /// Number of records appended so far
    fn records_written(&self) -> u64;

    /// Writes any closing framing and releases the file
    ///
    /// Calling `close` more than once is a no-op.
    fn close(&mut self) -> OutputResult<()>;
}
