//! Proxy handling module
//!
//! This module provides:
//! - Normalized proxy addresses (`ProxyEndpoint`)
//! - Loading the newline-delimited proxy list
//! - Liveness validation of candidate proxies
//! - The shared, validated pool with round-robin and random selection

mod endpoint;
mod list;
mod pool;
mod validator;

pub use endpoint::{ProxyEndpoint, DEFAULT_SCHEME};
pub use list::{load_proxy_list, parse_proxy_list};
pub use pool::{ProxyPool, RotationStrategy};
pub use validator::{ProxyValidator, DEFAULT_PROBE_TIMEOUT, DEFAULT_PROBE_URL};

use crate::config::Config;
use crate::ProxyError;
use std::path::Path;

/// Loads the configured proxy list, validates it, and builds the pool
///
/// # Returns
///
/// * `Ok(ProxyPool)` - Pool of the proxies that passed validation
/// * `Err(ProxyError::ListRead)` - The list file could not be read
/// * `Err(ProxyError::EmptyPool)` - No proxy survived (or the list was empty)
pub async fn load_validated_pool(config: &Config) -> Result<ProxyPool, ProxyError> {
    let candidates = load_proxy_list(Path::new(&config.proxy.list_path))?;

    let validated = ProxyValidator::from_config(config)
        .validate(candidates)
        .await;

    let pool = ProxyPool::from_validated(validated)?;
    tracing::info!("{} proxies loaded and validated", pool.len());

    Ok(pool)
}
