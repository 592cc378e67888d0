use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable holding a comma-separated identity pool
pub const USERNAMES_ENV: &str = "USER_NAME";

/// Environment variable overriding the API base URL
pub const BASE_URL_ENV: &str = "API_BASE_URL";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied after parsing and before validation,
/// so an identity pool supplied only through `USER_NAME` is accepted.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let mut config: Config = toml::from_str(&content)?;

    // Environment wins over the file
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    // Validate configuration
    validate(&config)?;

    Ok(config)
}

/// Applies environment overrides using the given variable lookup
///
/// # Arguments
///
/// * `config` - Parsed configuration to update in place
/// * `lookup` - Returns the value of an environment variable, if set
///
/// # Overrides
///
/// * `USER_NAME` replaces the identity pool (comma-separated)
/// * `API_BASE_URL` replaces the base URL
///
/// Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(USERNAMES_ENV) {
        let identities = parse_identity_list(&raw);
        if !identities.is_empty() {
            tracing::debug!(
                "Identity pool overridden from {} ({} identities)",
                USERNAMES_ENV,
                identities.len()
            );
            config.api.usernames = identities;
        }
    }

    if let Some(base_url) = lookup(BASE_URL_ENV) {
        let base_url = base_url.trim();
        if !base_url.is_empty() {
            tracing::debug!("Base URL overridden from {}: {}", BASE_URL_ENV, base_url);
            config.api.base_url = base_url.to_string();
        }
    }
}

/// Splits a comma-separated identity list, trimming and dropping blanks
pub fn parse_identity_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two crawl runs can be tied to the same configuration.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
