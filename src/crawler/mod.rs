//! Crawler module for the GeoNames hierarchy
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - API identity rotation
//! - Batch scheduling with cooldowns and partial failure
//! - Record mapping and composite code derivation
//! - Overall three-stage coordination

mod coordinator;
mod credentials;
mod fetcher;
pub mod mapping;
mod scheduler;

pub use coordinator::{Pipeline, Stage};
pub use credentials::IdentityPool;
pub use fetcher::{
    build_http_client, decode_body, is_transient_error, GeoSource, GeonamesClient, RetryPolicy,
    CHILDREN_PATH, COUNTRY_INFO_PATH,
};
pub use mapping::CountryCatalog;
pub use scheduler::{BatchOutcome, BatchScheduler};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::AtlasError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the identity pool and load the enrichment dataset
/// 2. Build the HTTP client
/// 3. Crawl and persist countries, phone codes and currencies
/// 4. Crawl and persist states per country
/// 5. Crawl and persist cities per state
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `from` - First stage to crawl; earlier stages are read from disk
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished; check the report for gaps
/// * `Err(AtlasError)` - Setup or the countries stage failed
///
/// # Example
///
/// ```no_run
/// use geo_atlas::config::load_config;
/// use geo_atlas::crawler::{crawl, Stage};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("geo-atlas.toml"))?;
/// let report = crawl(&config, Stage::Countries).await?;
/// println!("{} countries", report.countries);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config, from: Stage) -> Result<CrawlReport, AtlasError> {
    let pipeline = Pipeline::from_config(config)?;
    pipeline.run_from(from).await
}
