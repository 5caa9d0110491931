//! Output module for writing exported votes
//!
//! This module handles:
//! - Serializing votes into the IMDb ratings CSV layout
//! - Splitting large collections into numbered chunk files
//! - Writing chunks concurrently

mod chunk;
mod imdb_csv;
mod traits;

pub use chunk::{chunk_path, split_into_chunks};
pub use imdb_csv::{vote_row, write_csv, ImdbCsvWriter, IMDB_CSV_HEADER};
pub use traits::{OutputError, OutputResult, VotesWriter};
