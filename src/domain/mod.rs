//! Domain types for the votes export
//!
//! # Components
//!
//! - `Vote`: a single movie rating read from a Kinopoisk votes page
//! - `Votes`: the validated, deduplicated collection of votes
//! - `UserId` / `TitleId`: identifiers of the Kinopoisk user and the IMDb title

mod ids;
mod vote;
mod votes;

pub use ids::{InvalidUserId, TitleId, UserId, IMDB_TITLE_URL};
pub use vote::Vote;
pub use votes::{ValidationError, Votes, MAX_RATE};
