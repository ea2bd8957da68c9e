use crate::proxy::RotationStrategy;
use serde::Deserialize;
use std::time::Duration;

/// Default user agent, a desktop browser so the target serves the full page
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Main configuration structure for Reel-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub target: TargetConfig,
}

/// Fetch behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request and probe
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Accept-Language header sent with every fetch
    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Per-attempt request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Maximum number of attempts per fetch
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// How a proxy is picked for each attempt
    pub strategy: RotationStrategy,

    /// Maximum number of target URLs fetched at once
    pub concurrency: u32,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            request_timeout: 10,
            max_retries: 5,
            strategy: RotationStrategy::RoundRobin,
            concurrency: 4,
        }
    }
}

impl FetcherConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Proxy list and validation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Path to the newline-delimited proxy list
    #[serde(rename = "list-path")]
    pub list_path: String,

    /// URL every candidate proxy must serve with `200 OK`
    #[serde(rename = "probe-url")]
    pub probe_url: String,

    /// Timeout for a single validation probe (seconds)
    #[serde(rename = "probe-timeout")]
    pub probe_timeout: u64,

    /// Maximum number of probes in flight
    #[serde(rename = "validation-concurrency")]
    pub validation_concurrency: u32,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            list_path: "proxies.txt".to_string(),
            probe_url: "https://www.instagram.com".to_string(),
            probe_timeout: 5,
            validation_concurrency: 16,
        }
    }
}

impl ProxyConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout)
    }
}

/// Pages to harvest when none are given on the command line
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub urls: Vec<String>,
}
