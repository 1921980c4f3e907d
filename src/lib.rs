//! Price-Ripple: a marketplace price comparison aggregator
//!
//! This crate searches several online marketplaces concurrently for the same
//! query, normalizes their listings into one record shape, and reports price
//! statistics across the merged results.

pub mod aggregate;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod listing;
pub mod output;
pub mod price;
pub mod server;
pub mod url;

use thiserror::Error;

/// Main error type for Price-Ripple operations
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Actor job error: {0}")]
    Actor(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl CompareError {
    /// Returns true if the error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidQuery(_) | Self::UnknownPlatform(_))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Environment variable {0} is not set")]
    MissingSecret(String),
}

/// Result type alias for Price-Ripple operations
pub type Result<T> = std::result::Result<T, CompareError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use aggregate::Aggregator;
pub use config::Config;
pub use listing::{Extraction, ExtractionStatus, ListingRecord, PlatformResultSet, SearchQuery};
pub use output::{summarize, ComparisonSummary};
pub use price::normalize_price;
