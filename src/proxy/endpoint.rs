//! Normalized proxy addresses

use std::fmt;

/// Scheme given to proxy addresses that do not carry one
pub const DEFAULT_SCHEME: &str = "http";

/// A proxy address that always carries an explicit scheme
///
/// Bare `host:port` input is normalized to `http://host:port`. The address is
/// not otherwise checked here; a malformed one surfaces when a client is built
/// for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyEndpoint(String);

impl ProxyEndpoint {
    /// Normalizes a raw proxy address
    ///
    /// Returns `None` for blank input.
    ///
    /// # Example
    ///
    /// ```
    /// use reel_harvest::proxy::ProxyEndpoint;
    ///
    /// let endpoint = ProxyEndpoint::normalize("1.2.3.4:8080").unwrap();
    /// assert_eq!(endpoint.as_str(), "http://1.2.3.4:8080");
    /// ```
    pub fn normalize(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if raw.contains("://") {
            Some(Self(raw.to_string()))
        } else {
            Some(Self(format!("{}://{}", DEFAULT_SCHEME, raw)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The scheme part of the address (`http`, `https`, ...)
    pub fn scheme(&self) -> &str {
        self.0.split("://").next().unwrap_or(DEFAULT_SCHEME)
    }

    /// Builds a reqwest proxy routing all traffic through this endpoint
    pub fn to_reqwest_proxy(&self) -> Result<reqwest::Proxy, reqwest::Error> {
        reqwest::Proxy::all(self.as_str())
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
