//! Configuration module for kpvotes
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All settings have defaults, so a configuration file is optional; the
//! `KPEXPORT_PROXY_URL` environment variable and the command line can override
//! the loaded values.
//!
//! # Example
//!
//! ```no_run
//! use kpvotes::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("kpvotes.toml")).unwrap();
//! println!("Writing votes to: {}", config.output.target_path.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, HttpConfig, ImdbConfig, KinopoiskConfig, OutputConfig, DEFAULT_ACCEPT_LANGUAGE,
    DEFAULT_IMDB_FIND_URL, DEFAULT_KINOPOISK_HOST, DEFAULT_TIMEOUT_SECS,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, apply_env_overrides_from, load_config, parse_config, ENV_PROXY_URL,
};
pub use validation::validate;
