use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variable overriding the HTTP proxy
pub const ENV_PROXY_URL: &str = "KPEXPORT_PROXY_URL";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use kpvotes::config::load_config;
///
/// let config = load_config(Path::new("kpvotes.toml")).unwrap();
/// println!("Votes host: {}", config.kinopoisk.host);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let config = parse_config(&content)?;

    validate(&config)?;

    Ok(config)
}

/// Parses configuration from a TOML string without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Applies overrides from the process environment
pub fn apply_env_overrides(config: &mut Config) {
    apply_env_overrides_from(config, |key| std::env::var(key).ok());
}

/// Applies overrides using the given variable lookup
///
/// Empty values are ignored.
pub fn apply_env_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(proxy) = lookup(ENV_PROXY_URL).filter(|v| !v.trim().is_empty()) {
        tracing::debug!("Using proxy from {}", ENV_PROXY_URL);
        config.http.proxy_url = Some(proxy.trim().to_string());
    }
}
