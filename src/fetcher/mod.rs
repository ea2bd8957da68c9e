//! Fetcher module for retrying page downloads through rotating proxies
//!
//! This module contains:
//! - Per-proxy HTTP client construction
//! - The retry state machine for a single fetch
//! - The resilient fetcher that ties them to the proxy pool

mod client;
mod resilient;
mod state;

pub use client::build_proxied_client;
pub use resilient::ResilientFetcher;
pub use state::{AttemptResult, FetchState};
