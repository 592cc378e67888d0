use crate::config::types::{ApiConfig, Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates gazetteer API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    // The pool size is the batch size; an empty pool can never make progress
    if config.usernames.iter().all(|u| u.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "at least one API username is required (usernames or USER_NAME)".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.max_idle_connections < 1 {
        return Err(ConfigError::Validation(
            "max-idle-connections must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl pacing configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.batch_cooldown_ms > 600_000 {
        return Err(ConfigError::Validation(format!(
            "batch-cooldown-ms must be <= 600000ms, got {}ms",
            config.batch_cooldown_ms
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.metadata_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "metadata-dir cannot be empty".to_string(),
        ));
    }

    if config.additional_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "additional-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn create_test_config() -> Config {
        Config {
            api: ApiConfig {
                usernames: vec!["alpha".to_string()],
                ..ApiConfig::default()
            },
            crawler: CrawlerConfig::default(),
            output: OutputConfig {
                metadata_dir: PathBuf::from("metadata"),
                additional_path: PathBuf::from("metadata/countries.additional.json"),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&create_test_config()).is_ok());
    }

    #[test]
    fn test_empty_identity_pool_rejected() {
        let mut config = create_test_config();
        config.api.usernames.clear();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        config.api.usernames = vec!["  ".to_string()];
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_base_url_validation() {
        let mut config = create_test_config();

        config.api.base_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.api.base_url = "ftp://api.geonames.org".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.api.base_url = "https://secure.geonames.org".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = create_test_config();

        config.api.timeout_secs = 0;
        assert!(validate(&config).is_err());

        config.api.timeout_secs = 301;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_retry_bound() {
        let mut config = create_test_config();
        config.api.max_retries = 11;
        assert!(validate(&config).is_err());

        config.api.max_retries = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_output_paths_rejected() {
        let mut config = create_test_config();
        config.output.metadata_dir = PathBuf::new();
        assert!(validate(&config).is_err());
    }
}
