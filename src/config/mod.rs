//! Configuration module for Price-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Secrets never live in the file: it only names the environment
//! variables they are read from.
//!
//! # Example
//!
//! ```no_run
//! use price_ripple::config::{load_config, Secrets};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("price-ripple.toml")).unwrap();
//! let secrets = Secrets::from_env(&config);
//! println!("Proxy configured: {}", secrets.proxy_api_key.is_some());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ActorConfig, Config, HttpConfig, ProxyConfig, SearchConfig, Secrets, ServerConfig,
    SiteConfig, DEFAULT_USER_AGENT, KNOWN_PLATFORMS,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_or_default, parse_config,
};
