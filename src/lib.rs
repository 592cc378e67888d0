//! Geo-Atlas: geographic reference data crawler and lookup library
//!
//! This crate crawls the GeoNames gazetteer three levels deep (countries,
//! states, cities), rotating API identities across rate-limited batches, and
//! persists the results as static JSON. The [`atlas`] module reads that
//! layout back for runtime lookups.

pub mod atlas;
pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Geo-Atlas operations
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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
}

/// Errors surfaced by the gazetteer fetch client
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {path} failed: {source}")]
    Transport {
        path: String,
        source: reqwest::Error,
    },

    #[error("Invalid request to {path}: {message}")]
    InvalidRequest { path: String, message: String },

    #[error("Request to {path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("Malformed response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Gazetteer rejected {path} (code {code}): {message}")]
    Api {
        path: String,
        code: i64,
        message: String,
    },

    #[error("Request to {path} failed after {attempts} attempts: {source}")]
    Exhausted {
        path: String,
        attempts: u32,
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Whether a retry at the fetch layer may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { source, .. } => crawler::is_transient_error(source),
            _ => false,
        }
    }
}

/// Result type alias for Geo-Atlas operations
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use atlas::Atlas;
pub use config::Config;
pub use crawler::{BatchScheduler, GeonamesClient, IdentityPool, Pipeline, Stage};
pub use model::{City, Country, CountryState, Currency, Language, PhoneCode, State, StateCity};
