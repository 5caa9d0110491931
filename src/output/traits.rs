//! Output writer traits and types
//!
//! This module defines the trait interface for votes writers and the errors
//! they report.

use crate::domain::Votes;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create target file {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write CSV header to {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("failed to flush target file {path}: {source}")]
    Flush {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("write task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("write cancelled")]
    Cancelled,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for votes writers
///
/// Writers serialize a collection of votes into one or more files.
/// Implementations must be thread-safe.
#[async_trait]
pub trait VotesWriter: Send + Sync {
    /// Writes votes to `target`
    ///
    /// # Arguments
    ///
    /// * `votes` - Votes to write, in collection order
    /// * `target` - Target file path
    /// * `chunk_size` - Maximum votes per file; 0 writes a single file
    /// * `cancel` - Cancellation token
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PathBuf>)` - Paths of the written files, in chunk order
    /// * `Err(OutputError)` - Any file failed to be written
    async fn write_to_file(
        &self,
        votes: &Votes,
        target: &Path,
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> OutputResult<Vec<PathBuf>>;
}
