//! Retrying fetch client on top of the proxy pool

use crate::config::FetcherConfig;
use crate::fetcher::client::build_proxied_client;
use crate::fetcher::state::{AttemptResult, FetchState};
use crate::proxy::{ProxyEndpoint, ProxyPool, RotationStrategy};
use crate::{AttemptError, FetchError};
use bytes::Bytes;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use url::Url;

/// Fetches pages through the proxy pool, one fresh proxy per attempt
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Proxy address unusable | Retry on next proxy |
/// | Connection, DNS, TLS error or timeout | Retry on next proxy |
/// | Status other than 200 | Retry on next proxy |
/// | 200 but body read fails | Fail immediately |
/// | Attempts used up | Fail with the last cause |
///
/// There is no delay between attempts.
#[derive(Debug, Clone)]
pub struct ResilientFetcher {
    pool: Arc<ProxyPool>,
    strategy: RotationStrategy,
    user_agent: String,
    accept_language: String,
    request_timeout: Duration,
    max_retries: u32,
}

impl ResilientFetcher {
    /// Creates a fetcher over a validated pool
    ///
    /// `max_retries` below 1 is treated as 1.
    pub fn new(pool: Arc<ProxyPool>, config: &FetcherConfig) -> Self {
        Self {
            pool,
            strategy: config.strategy,
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
            request_timeout: config.request_timeout(),
            max_retries: config.max_retries.max(1),
        }
    }

    pub fn pool(&self) -> &ProxyPool {
        &self.pool
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Fetches a URL, retrying through other proxies on failure
    ///
    /// # Returns
    ///
    /// * `Ok(Bytes)` - Body of the first `200 OK` response
    /// * `Err(FetchError)` - Invalid URL, body read failure, or all attempts failed
    pub async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        self.fetch_with_shutdown(url, shutdown_rx).await
    }

    /// Like [`fetch`](Self::fetch), but stops when `shutdown` turns true
    ///
    /// An in-flight attempt is dropped on shutdown, which closes its
    /// connection, and no further attempts are made.
    pub async fn fetch_with_shutdown(
        &self,
        url: &str,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<Bytes, FetchError> {
        let target = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let mut state = FetchState::start();

        loop {
            let attempt = match state {
                FetchState::Attempting { attempt, .. } => attempt,
                FetchState::Succeeded { attempts, body } => {
                    tracing::info!(
                        "Fetched {} ({} bytes) after {} attempt(s)",
                        url,
                        body.len(),
                        attempts
                    );
                    return Ok(body);
                }
                FetchState::Exhausted {
                    attempts,
                    last_failure,
                } => {
                    tracing::error!("Giving up on {} after {} attempts", url, attempts);
                    return Err(FetchError::RetriesExhausted {
                        url: url.to_string(),
                        attempts,
                        last: last_failure,
                    });
                }
            };

            if *shutdown.borrow() {
                return Err(cancelled(url, &state));
            }

            let proxy = self.pool.select(self.strategy).clone();
            tracing::debug!(
                "Attempt {}/{} for {} via {}",
                attempt,
                self.max_retries,
                url,
                proxy
            );

            let outcome = tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => {
                    tracing::info!("Fetch of {} cancelled during attempt {}", url, attempt);
                    return Err(FetchError::Cancelled {
                        url: url.to_string(),
                        attempts: attempt,
                    });
                }
                outcome = self.attempt(&target, &proxy) => outcome?,
            };

            if let Err(failure) = &outcome {
                tracing::warn!(
                    "Attempt {}/{} for {} failed: {}",
                    attempt,
                    self.max_retries,
                    url,
                    failure
                );
            }

            state = state.advance(outcome, self.max_retries);
        }
    }

    /// Runs one request through one proxy and classifies the result
    ///
    /// The outer error is reserved for failures that must end the fetch.
    async fn attempt(
        &self,
        target: &Url,
        proxy: &ProxyEndpoint,
    ) -> Result<AttemptResult, FetchError> {
        let client = match build_proxied_client(proxy, &self.user_agent, self.request_timeout) {
            Ok(client) => client,
            Err(failure) => return Ok(Err(failure)),
        };

        let response = match client
            .get(target.as_str())
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .send()
            .await
        {
            Ok(response) => response,
            Err(source) => {
                return Ok(Err(AttemptError::Transport {
                    proxy: proxy.clone(),
                    source,
                }))
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            return Ok(Err(AttemptError::BadStatus {
                proxy: proxy.clone(),
                status,
            }));
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::BodyRead {
                url: target.to_string(),
                source,
            })?;

        Ok(Ok(body))
    }
}

fn cancelled(url: &str, state: &FetchState) -> FetchError {
    tracing::info!("Fetch of {} cancelled", url);
    FetchError::Cancelled {
        url: url.to_string(),
        attempts: state.attempts_made(),
    }
}

/// Resolves once `shutdown` holds true; never resolves if the sender is gone
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
