//! Configuration module for Reel-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! with a handful of environment variable overrides.
//!
//! # Example
//!
//! ```no_run
//! use reel_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Proxies are read from: {}", config.proxy.list_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetcherConfig, ProxyConfig, TargetConfig, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{apply_env_overrides, compute_config_hash, load_config, load_config_with_hash};
