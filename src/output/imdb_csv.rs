//! IMDb ratings CSV writer
//!
//! Produces files in the layout of the IMDb ratings export so that they can
//! be imported back into an IMDb account. Only the first five columns are
//! filled in; the rest are left empty.

use crate::domain::{Vote, Votes};
use crate::output::chunk::{chunk_path, split_into_chunks};
use crate::output::traits::{OutputError, OutputResult, VotesWriter};
use async_trait::async_trait;
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Header row of the IMDb ratings export
pub const IMDB_CSV_HEADER: [&str; 13] = [
    "Const",
    "Your Rating",
    "Date Rated",
    "Title",
    "URL",
    "Title Type",
    "IMDb Rating",
    "Runtime (mins)",
    "Year",
    "Genres",
    "Num Votes",
    "Release Date",
    "Directors",
];

/// Format of the `Date Rated` column
const DATE_RATED_FORMAT: &str = "%Y-%m-%d";

/// Writer of IMDb ratings CSV files
#[derive(Debug, Default, Clone, Copy)]
pub struct ImdbCsvWriter;

impl ImdbCsvWriter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VotesWriter for ImdbCsvWriter {
    async fn write_to_file(
        &self,
        votes: &Votes,
        target: &Path,
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> OutputResult<Vec<PathBuf>> {
        if cancel.is_cancelled() {
            return Err(OutputError::Cancelled);
        }

        if chunk_size == 0 {
            let rows = votes.as_slice().to_vec();
            let path = target.to_path_buf();
            let task_path = path.clone();
            let task_cancel = cancel.clone();

            tokio::task::spawn_blocking(move || write_csv(&task_path, &rows, &task_cancel))
                .await??;

            return Ok(vec![path]);
        }

        let chunks = split_into_chunks(votes.as_slice(), chunk_size);
        tracing::info!(
            target_path = %target.display(),
            chunks = chunks.len(),
            chunk_size,
            "Writing chunked output"
        );

        // Stops the remaining chunks once one fails
        let chunks_cancel = cancel.child_token();
        let mut tasks = JoinSet::new();

        for (index, rows) in chunks.into_iter().enumerate() {
            let path = chunk_path(target, index);
            let task_cancel = chunks_cancel.clone();

            tasks.spawn_blocking(move || {
                let result = write_csv(&path, &rows, &task_cancel);
                (index, path, result)
            });
        }

        let mut written = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let (index, path, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    chunks_cancel.cancel();
                    return Err(e.into());
                }
            };

            if let Err(e) = result {
                chunks_cancel.cancel();
                return Err(e);
            }

            written.push((index, path));
        }

        written.sort_by_key(|(index, _)| *index);

        Ok(written.into_iter().map(|(_, path)| path).collect())
    }
}

/// Writes one CSV file with the header and a row per vote
///
/// Rows that fail to serialize are skipped with a warning.
pub fn write_csv(path: &Path, votes: &[Vote], cancel: &CancellationToken) -> OutputResult<()> {
    if cancel.is_cancelled() {
        return Err(OutputError::Cancelled);
    }

    tracing::info!(target_path = %path.display(), "Creating file");

    let file = File::create(path).map_err(|source| OutputError::Create {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(IMDB_CSV_HEADER)
        .map_err(|source| OutputError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    for (i, vote) in votes.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(OutputError::Cancelled);
        }

        tracing::debug!(target_path = %path.display(), "Writing row #{}", i);

        if let Err(e) = writer.write_record(vote_row(vote)) {
            tracing::warn!(target_path = %path.display(), "Failed to write row #{}: {}", i, e);
        }
    }

    writer.flush().map_err(|source| OutputError::Flush {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(target_path = %path.display(), rows = votes.len(), "File written");

    Ok(())
}

/// Builds the CSV row of a vote
pub fn vote_row(vote: &Vote) -> [String; 13] {
    let mut row: [String; 13] = Default::default();

    row[0] = vote.imdb_id.to_string();
    row[1] = vote.rate.to_string();
    row[2] = vote.timestamp.format(DATE_RATED_FORMAT).to_string();
    row[3] = vote.original_title();
    row[4] = vote.imdb_id.to_url();

    row
}
