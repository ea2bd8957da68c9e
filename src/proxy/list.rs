//! Proxy list loading
//!
//! The list is plain text, one proxy address per line. Blank lines and lines
//! starting with `#` are skipped.

use crate::proxy::ProxyEndpoint;
use crate::ProxyError;
use std::path::Path;

/// Parses proxy list content into normalized endpoints, preserving order
pub fn parse_proxy_list(content: &str) -> Vec<ProxyEndpoint> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(ProxyEndpoint::normalize)
        .collect()
}

/// Reads and parses a proxy list file
pub fn load_proxy_list(path: &Path) -> Result<Vec<ProxyEndpoint>, ProxyError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProxyError::ListRead {
        path: path.display().to_string(),
        source,
    })?;

    let endpoints = parse_proxy_list(&content);
    tracing::debug!(
        "Read {} proxy candidates from {}",
        endpoints.len(),
        path.display()
    );

    Ok(endpoints)
}
