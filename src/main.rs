//! Geo-Atlas main entry point
//!
//! This is the command-line interface for the Geo-Atlas crawler.

use clap::Parser;
use geo_atlas::atlas::Atlas;
use geo_atlas::config::{load_config_with_hash, Config};
use geo_atlas::crawler::{crawl, IdentityPool, Stage};
use geo_atlas::output::{load_statistics, print_report, print_statistics};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Geo-Atlas: geographic reference data crawler
///
/// Crawls countries, states and cities from the GeoNames web service,
/// rotating API usernames across rate-limited batches, and writes the
/// results as static JSON files.
#[derive(Parser, Debug)]
#[command(name = "geo-atlas")]
#[command(version)]
#[command(about = "Geographic reference data crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Stage to start from; earlier stages are read from the metadata directory
    #[arg(long, value_name = "STAGE", default_value = "countries")]
    from: Stage,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the persisted metadata and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, cli.from)?;
    } else if cli.stats {
        handle_stats(&config);
    } else {
        handle_crawl(&config, cli.from).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("geo_atlas=info,warn"),
            1 => EnvFilter::new("geo_atlas=debug,info"),
            2 => EnvFilter::new("geo_atlas=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &Config, from: Stage) -> Result<(), Box<dyn std::error::Error>> {
    let pool = IdentityPool::new(config.api.usernames.iter().cloned())?;

    println!("=== Geo-Atlas Dry Run ===\n");

    println!("API:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  Identities: {}", pool.len());
    println!("  Timeout: {}s", config.api.timeout_secs);
    println!(
        "  Retries: {} (base delay {}ms)",
        config.api.max_retries, config.api.retry_delay_ms
    );

    println!("\nScheduling:");
    println!("  Batch size: {}", pool.len());
    println!("  Cooldown between batches: {}ms", config.crawler.batch_cooldown_ms);

    println!("\nOutput:");
    println!("  Metadata directory: {}", config.output.metadata_dir.display());
    println!(
        "  Enrichment dataset: {}",
        config.output.additional_path.display()
    );

    if from > Stage::Countries {
        let atlas = Atlas::load(&config.output.metadata_dir);
        let work = if from == Stage::States {
            atlas.countries().len()
        } else {
            atlas.country_states().iter().map(|g| g.states.len()).sum()
        };
        let batches = work.div_ceil(pool.len());
        println!("\nResume:");
        println!("  Starting at stage: {}", from);
        println!("  Work items: {} in {} batches", work, batches);
        println!(
            "  Minimum cooldown time: {}ms",
            batches.saturating_sub(1) as u64 * config.crawler.batch_cooldown_ms
        );
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics of the persisted tree
fn handle_stats(config: &Config) {
    println!("Metadata: {}\n", config.output.metadata_dir.display());

    let atlas = Atlas::load(&config.output.metadata_dir);
    let stats = load_statistics(&atlas);

    print_statistics(&stats);
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, from: Stage) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Starting crawl at stage {} with {} identities",
        from,
        config.api.usernames.len()
    );

    match crawl(config, from).await {
        Ok(report) => {
            print_report(&report);
            if report.is_complete() {
                tracing::info!("Crawl completed successfully");
            } else {
                tracing::warn!("Crawl completed with gaps");
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
