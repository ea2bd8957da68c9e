//! Proxy liveness validation
//!
//! Each candidate proxy gets one GET request to a well-known URL. Only the
//! proxies answering exactly `200 OK` within the probe timeout survive.

use crate::config::{Config, DEFAULT_USER_AGENT};
use crate::fetcher::build_proxied_client;
use crate::proxy::ProxyEndpoint;
use crate::AttemptError;
use futures::StreamExt;
use reqwest::StatusCode;
use std::time::Duration;

/// Default probe target
pub const DEFAULT_PROBE_URL: &str = "https://www.instagram.com";

/// Default timeout for a single probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Filters proxy candidates down to the ones that currently work
#[derive(Debug, Clone)]
pub struct ProxyValidator {
    probe_url: String,
    probe_timeout: Duration,
    user_agent: String,
    concurrency: usize,
}

impl Default for ProxyValidator {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_URL, DEFAULT_PROBE_TIMEOUT)
    }
}

impl ProxyValidator {
    pub fn new(probe_url: impl Into<String>, probe_timeout: Duration) -> Self {
        Self {
            probe_url: probe_url.into(),
            probe_timeout,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 16,
        }
    }

    /// Builds a validator from the `[proxy]` and `[fetcher]` settings
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.proxy.probe_url.clone(), config.proxy.probe_timeout())
            .with_user_agent(config.fetcher.user_agent.clone())
            .with_concurrency(config.proxy.validation_concurrency as usize)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets how many probes may run at once (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Probes every candidate and returns the survivors in input order
    ///
    /// Probes run concurrently, but results are collected in input order, so
    /// the output matches a sequential pass. An empty result is not an error
    /// here.
    pub async fn validate(&self, candidates: Vec<ProxyEndpoint>) -> Vec<ProxyEndpoint> {
        let total = candidates.len();
        tracing::info!(
            "Validating {} proxies against {} ({}s timeout)",
            total,
            self.probe_url,
            self.probe_timeout.as_secs()
        );

        let survivors: Vec<ProxyEndpoint> = futures::stream::iter(candidates)
            .map(|candidate| async move {
                let outcome = self.probe(&candidate).await;
                (candidate, outcome)
            })
            .buffered(self.concurrency)
            .filter_map(|(candidate, outcome)| async move {
                match outcome {
                    Ok(()) => {
                        tracing::debug!("Proxy {} is alive", candidate);
                        Some(candidate)
                    }
                    Err(reason) => {
                        tracing::warn!("Dropping proxy {}: {}", candidate, reason);
                        None
                    }
                }
            })
            .collect()
            .await;

        tracing::info!("{} of {} proxies passed validation", survivors.len(), total);
        survivors
    }

    /// Sends one probe request through a proxy
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The probe URL answered `200 OK` in time
    /// * `Err(AttemptError)` - Why the proxy is considered dead
    pub async fn probe(&self, proxy: &ProxyEndpoint) -> Result<(), AttemptError> {
        let client = build_proxied_client(proxy, &self.user_agent, self.probe_timeout)?;

        let response = client
            .get(self.probe_url.as_str())
            .send()
            .await
            .map_err(|source| AttemptError::Transport {
                proxy: proxy.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AttemptError::BadStatus {
                proxy: proxy.clone(),
                status,
            });
        }

        Ok(())
    }
}
