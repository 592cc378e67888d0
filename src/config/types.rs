use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Geo-Atlas
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Gazetteer API access configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the GeoNames web service
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Pool of API usernames; its size is the batch size
    #[serde(default)]
    pub usernames: Vec<String>,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum retries for transient network failures
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base retry delay (milliseconds); retry `n` waits `n` times this
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Maximum idle keep-alive connections kept in the pool
    #[serde(rename = "max-idle-connections", default = "default_max_idle")]
    pub max_idle_connections: usize,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            usernames: Vec::new(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            max_idle_connections: default_max_idle(),
        }
    }
}

/// Crawl pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Delay between consecutive batches (milliseconds)
    #[serde(rename = "batch-cooldown-ms", default = "default_cooldown_ms")]
    pub batch_cooldown_ms: u64,
}

impl CrawlerConfig {
    pub fn batch_cooldown(&self) -> Duration {
        Duration::from_millis(self.batch_cooldown_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            batch_cooldown_ms: default_cooldown_ms(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory of the persisted metadata tree
    #[serde(rename = "metadata-dir")]
    pub metadata_dir: PathBuf,

    /// Path to the static `countries.additional.json` enrichment dataset
    #[serde(rename = "additional-path")]
    pub additional_path: PathBuf,
}

fn default_base_url() -> String {
    "http://api.geonames.org".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_max_idle() -> usize {
    10
}

fn default_cooldown_ms() -> u64 {
    2000
}
