//! kpvotes: Kinopoisk votes exporter
//!
//! This crate reads a user's movie votes from Kinopoisk, resolves every title
//! to its IMDb identifier and writes the result as an IMDb ratings CSV file.

pub mod config;
pub mod crawler;
pub mod domain;
pub mod output;
pub mod resolver;
pub mod runner;

use thiserror::Error;

use crate::crawler::PageError;
use crate::domain::UserId;
use crate::output::OutputError;
use crate::resolver::CacheError;

/// Main error type for kpvotes operations
#[derive(Debug, Error)]
pub enum KpError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read votes page #{page} for user {user}: {source}")]
    ReadPage {
        page: u32,
        user: UserId,
        #[source]
        source: PageError,
    },

    #[error("Cache error: {0}")]
    Cache(CacheError),

    #[error("Output error: {0}")]
    Output(OutputError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Operation cancelled")]
    Cancelled,
}

impl KpError {
    /// Returns true if the error was caused by a cancellation request
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<CacheError> for KpError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Cancelled => Self::Cancelled,
            other => Self::Cache(other),
        }
    }
}

impl From<OutputError> for KpError {
    fn from(err: OutputError) -> Self {
        match err {
            OutputError::Cancelled => Self::Cancelled,
            other => Self::Output(other),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for kpvotes operations
pub type Result<T> = std::result::Result<T, KpError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use domain::{TitleId, Vote, Votes};
pub use runner::{run, RunSummary};
