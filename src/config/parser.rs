use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Environment overrides (see [`apply_env_overrides`]) are applied after
/// parsing and before validation.
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
/// use reel_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Max retries: {}", config.fetcher.max_retries);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut config: Config = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    validate(&config)?;

    Ok(config)
}

/// Overrides configuration values from environment variables
///
/// | Variable | Field |
/// |----------|-------|
/// | `USER_AGENT` | `fetcher.user-agent` |
/// | `REQUEST_TIMEOUT` | `fetcher.request-timeout` (seconds) |
/// | `MAX_RETRIES` | `fetcher.max-retries` |
/// | `PROXY_FILE` | `proxy.list-path` |
///
/// Empty values are ignored. `lookup` is usually `std::env::var`.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(user_agent) = get("USER_AGENT") {
        config.fetcher.user_agent = user_agent;
    }

    if let Some(timeout) = get("REQUEST_TIMEOUT") {
        config.fetcher.request_timeout = timeout.trim().parse().map_err(|_| {
            ConfigError::Validation(format!("REQUEST_TIMEOUT must be whole seconds, got '{}'", timeout))
        })?;
    }

    if let Some(retries) = get("MAX_RETRIES") {
        config.fetcher.max_retries = retries.trim().parse().map_err(|_| {
            ConfigError::Validation(format!("MAX_RETRIES must be a number, got '{}'", retries))
        })?;
    }

    if let Some(path) = get("PROXY_FILE") {
        config.proxy.list_path = path;
    }

    Ok(())
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs can be matched to the exact config they used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
