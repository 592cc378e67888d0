//! Configuration module for Geo-Atlas
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! including the `USER_NAME` and `API_BASE_URL` environment overrides.
//!
//! # Example
//!
//! ```no_run
//! use geo_atlas::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("geo-atlas.toml")).unwrap();
//! println!("Identity pool size: {}", config.api.usernames.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ApiConfig, Config, CrawlerConfig, OutputConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash,
    parse_identity_list,
};
pub use validation::validate;
