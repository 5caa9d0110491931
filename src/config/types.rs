use serde::Deserialize;
use std::path::PathBuf;

/// Default Kinopoisk host
pub const DEFAULT_KINOPOISK_HOST: &str = "https://www.kinopoisk.ru";

/// Default IMDb search endpoint
pub const DEFAULT_IMDB_FIND_URL: &str = "https://www.imdb.com/find/";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default `Accept-Language` header sent to both sites
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "ru-RU,ru;q=0.9";

/// Main configuration structure for kpvotes
///
/// Every section is optional in the TOML file; missing values fall back to
/// the defaults of each section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub kinopoisk: KinopoiskConfig,
    pub imdb: ImdbConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Source site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KinopoiskConfig {
    /// Base URL of the votes site, without a trailing slash
    pub host: String,
}

impl Default for KinopoiskConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_KINOPOISK_HOST.to_string(),
        }
    }
}

/// Cross-reference site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImdbConfig {
    /// Search endpoint queried with `?s=all&q=<title>`
    #[serde(rename = "find-url")]
    pub find_url: String,
}

impl Default for ImdbConfig {
    fn default() -> Self {
        Self {
            find_url: DEFAULT_IMDB_FIND_URL.to_string(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Value of the `Accept-Language` header
    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Proxy used for all requests
    #[serde(rename = "proxy-url")]
    pub proxy_url: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("kpvotes/{}", env!("CARGO_PKG_VERSION")),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            proxy_url: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the target CSV file
    #[serde(rename = "target-path")]
    pub target_path: PathBuf,

    /// Maximum votes per CSV file; 0 writes a single file
    #[serde(rename = "chunk-size")]
    pub chunk_size: usize,

    /// Path to the IMDb lookup cache file
    #[serde(rename = "cache-path")]
    pub cache_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            target_path: PathBuf::from("votes.csv"),
            chunk_size: 0,
            cache_path: None,
        }
    }
}
