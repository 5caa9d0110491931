//! IMDb lookup cache
//!
//! This module keeps resolved title → IMDb id pairs in memory and persists
//! them as newline-delimited JSON, one `{"title": ..., "id": ...}` object per
//! line, so that later runs skip the search for titles seen before.

use crate::domain::TitleId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that can occur during cache import and export
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to open cache file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read cache file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write cache file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cache operation cancelled")]
    Cancelled,
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// One persisted cache line
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheRow {
    #[serde(default)]
    title: String,
    #[serde(default)]
    id: String,
}

/// Store of resolved title ids
///
/// Implementations must be safe to share between concurrent callers.
pub trait TitleCache: Send + Sync {
    /// Stores the id for the exact title string
    fn store_title_id(&self, title: &str, id: TitleId);

    /// Returns the cached id; a miss or an empty id is `None`
    fn get_title_id(&self, title: &str) -> Option<TitleId>;

    /// Removes the cached id for the title
    fn invalidate_title_id(&self, title: &str);

    /// Writes all entries to `path`, appending or truncating
    ///
    /// Returns the number of rows written.
    fn export_titles_ids(
        &self,
        path: &Path,
        append: bool,
        cancel: &CancellationToken,
    ) -> CacheResult<usize>;

    /// Merges entries from `path` over the current ones
    ///
    /// A missing file imports nothing. Returns the number of rows imported.
    fn import_titles_ids(&self, path: &Path, cancel: &CancellationToken) -> CacheResult<usize>;
}

/// In-memory cache guarded by a reader/writer lock
#[derive(Debug, Default)]
pub struct MemoryCache {
    titles_ids: RwLock<HashMap<String, TitleId>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.titles_ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries sorted by title
    fn snapshot(&self) -> Vec<(String, TitleId)> {
        let items = self.titles_ids.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<(String, TitleId)> = items
            .iter()
            .map(|(title, id)| (title.clone(), id.clone()))
            .collect();
        entries.sort();
        entries
    }
}

impl TitleCache for MemoryCache {
    fn store_title_id(&self, title: &str, id: TitleId) {
        self.titles_ids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(title.to_string(), id);
    }

    fn get_title_id(&self, title: &str) -> Option<TitleId> {
        self.titles_ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(title)
            .filter(|id| !id.is_empty())
            .cloned()
    }

    fn invalidate_title_id(&self, title: &str) {
        self.titles_ids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(title);
    }

    fn export_titles_ids(
        &self,
        path: &Path,
        append: bool,
        cancel: &CancellationToken,
    ) -> CacheResult<usize> {
        if cancel.is_cancelled() {
            return Err(CacheError::Cancelled);
        }

        tracing::debug!(target_path = %path.display(), append, "Exporting cached IMDb IDs");

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .map_err(|source| CacheError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let entries = self.snapshot();
        let mut writer = BufWriter::new(file);
        let mut written = 0;

        for (title, id) in &entries {
            if cancel.is_cancelled() {
                return Err(CacheError::Cancelled);
            }

            if title.is_empty() || id.is_empty() {
                tracing::debug!(%title, %id, "Incomplete cache entry skipped");
                continue;
            }

            let row = CacheRow {
                title: title.clone(),
                id: id.to_string(),
            };

            let line = match serde_json::to_string(&row) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(%title, %id, "Failed to serialize cache row: {}", e);
                    continue;
                }
            };

            if let Err(e) = writeln!(writer, "{}", line) {
                tracing::warn!(%title, %id, "Failed to write cache row: {}", e);
                continue;
            }

            written += 1;
        }

        writer.flush().map_err(|source| CacheError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(target_path = %path.display(), written, "Exported cached IMDb IDs");

        Ok(written)
    }

    fn import_titles_ids(&self, path: &Path, cancel: &CancellationToken) -> CacheResult<usize> {
        if cancel.is_cancelled() {
            return Err(CacheError::Cancelled);
        }

        tracing::debug!(source_path = %path.display(), "Importing cached IMDb IDs");

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(source_path = %path.display(), "No cache file exists");
                return Ok(0);
            }
            Err(source) => {
                return Err(CacheError::Open {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut imported = Vec::new();

        // Raw bytes per line, so a non-UTF-8 line is skipped like any other bad row
        for (n, line) in BufReader::new(file).split(b'\n').enumerate() {
            if cancel.is_cancelled() {
                return Err(CacheError::Cancelled);
            }

            let line = line.map_err(|source| CacheError::Read {
                path: path.to_path_buf(),
                source,
            })?;

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let row: CacheRow = match serde_json::from_slice(&line) {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(line = n + 1, "Failed to parse cache row: {}", e);
                    continue;
                }
            };

            if row.title.is_empty() || row.id.is_empty() {
                tracing::warn!(line = n + 1, title = %row.title, id = %row.id, "Incomplete cache row skipped");
                continue;
            }

            imported.push((row.title, TitleId::new(row.id)));
        }

        let count = imported.len();
        self.titles_ids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(imported);

        tracing::debug!(source_path = %path.display(), imported = count, "Imported cached IMDb IDs");

        Ok(count)
    }
}
