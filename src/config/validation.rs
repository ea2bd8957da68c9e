use crate::config::types::{Config, FetcherConfig, ProxyConfig, TargetConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_proxy_config(&config.proxy)?;
    validate_target_config(&config.target)?;
    Ok(())
}

/// Validates fetch behavior configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.accept_language.trim().is_empty() {
        return Err(ConfigError::Validation(
            "accept_language cannot be empty".to_string(),
        ));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be >= 1s, got {}s",
            config.request_timeout
        )));
    }

    if config.max_retries < 1 || config.max_retries > 50 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be between 1 and 50, got {}",
            config.max_retries
        )));
    }

    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    Ok(())
}

/// Validates proxy list and probe configuration
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    if config.list_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "list_path cannot be empty".to_string(),
        ));
    }

    validate_http_url(&config.probe_url, "probe_url")?;

    if config.probe_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "probe_timeout must be >= 1s, got {}s",
            config.probe_timeout
        )));
    }

    if config.validation_concurrency < 1 || config.validation_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "validation_concurrency must be between 1 and 100, got {}",
            config.validation_concurrency
        )));
    }

    Ok(())
}

/// Validates target URLs
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    for url in &config.urls {
        validate_http_url(url, "target url")?;
    }
    Ok(())
}

/// Checks that a string parses as an absolute http(s) URL
fn validate_http_url(raw: &str, field: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, raw
        )));
    }

    Ok(())
}
