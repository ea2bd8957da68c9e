//! Reel-Harvest: media scraping through rotating proxies
//!
//! This crate fetches pages through a validated pool of HTTP proxies, retrying
//! each request on a fresh proxy, and extracts media records from the JSON
//! blob embedded in the fetched HTML.

pub mod config;
pub mod extract;
pub mod fetcher;
pub mod harvest;
pub mod output;
pub mod proxy;

use proxy::ProxyEndpoint;
use thiserror::Error;

/// Main error type for Reel-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Proxy error: {0}")]
    Proxy(#[from] ProxyError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] extract::ExtractError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

/// Proxy pool errors
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("No usable proxies: the list was empty or every proxy failed validation")]
    EmptyPool,

    #[error("Failed to read proxy list {path}: {source}")]
    ListRead {
        path: String,
        source: std::io::Error,
    },
}

/// Failure of a single fetch attempt
///
/// These are absorbed by the retry loop; only the last one reaches the caller,
/// wrapped in [`FetchError::RetriesExhausted`].
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("Failed to build client for proxy {proxy}: {source}")]
    ProxyBuild {
        proxy: ProxyEndpoint,
        source: reqwest::Error,
    },

    #[error("Request through proxy {proxy} failed: {source}")]
    Transport {
        proxy: ProxyEndpoint,
        source: reqwest::Error,
    },

    #[error("bad status {status} through proxy {proxy}")]
    BadStatus {
        proxy: ProxyEndpoint,
        status: reqwest::StatusCode,
    },
}

impl AttemptError {
    /// The proxy the failed attempt went through
    pub fn proxy(&self) -> &ProxyEndpoint {
        match self {
            Self::ProxyBuild { proxy, .. }
            | Self::Transport { proxy, .. }
            | Self::BadStatus { proxy, .. } => proxy,
        }
    }
}

/// Terminal failures of a fetch call
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid target URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead { url: String, source: reqwest::Error },

    #[error("All {attempts} attempts to fetch {url} failed, last error: {last}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        last: AttemptError,
    },

    #[error("Fetch of {url} cancelled after {attempts} attempt(s)")]
    Cancelled { url: String, attempts: u32 },
}

/// Result type alias for Reel-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{Extractor, MediaRecord, SharedDataExtractor};
pub use fetcher::ResilientFetcher;
pub use proxy::{ProxyPool, ProxyValidator, RotationStrategy};
