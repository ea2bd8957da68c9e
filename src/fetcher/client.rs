//! Per-proxy HTTP client construction

use crate::proxy::ProxyEndpoint;
use crate::AttemptError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client that routes every request through one proxy
///
/// A fresh client is built for each fetch attempt and each validation probe,
/// so no connection state is shared between proxies or between concurrent
/// fetches.
///
/// # Arguments
///
/// * `proxy` - The proxy all traffic goes through
/// * `user_agent` - Value of the `User-Agent` header
/// * `timeout` - Total timeout for a request, body included
///
/// # Returns
///
/// * `Ok(Client)` - Client bound to the proxy
/// * `Err(AttemptError::ProxyBuild)` - The proxy address is unusable
///
/// # Example
///
/// ```no_run
/// use reel_harvest::fetcher::build_proxied_client;
/// use reel_harvest::proxy::ProxyEndpoint;
/// use std::time::Duration;
///
/// let proxy = ProxyEndpoint::normalize("1.2.3.4:8080").unwrap();
/// let client = build_proxied_client(&proxy, "Mozilla/5.0", Duration::from_secs(10)).unwrap();
/// ```
pub fn build_proxied_client(
    proxy: &ProxyEndpoint,
    user_agent: &str,
    timeout: Duration,
) -> Result<Client, AttemptError> {
    let build_error = |source: reqwest::Error| AttemptError::ProxyBuild {
        proxy: proxy.clone(),
        source,
    };

    let reqwest_proxy = proxy.to_reqwest_proxy().map_err(build_error)?;

    Client::builder()
        .proxy(reqwest_proxy)
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(build_error)
}
