//! Crawl pipeline - three-stage orchestration
//!
//! Stages run strictly in order and each persists its output before the next
//! one starts:
//!
//! 1. Countries: one unbatched request, enrichment, three list files
//! 2. States: one request per country, one file per country
//! 3. Cities: one request per state across all countries, one file per state
//!
//! A failure in the countries stage aborts the run. Per-item failures in the
//! later stages only reduce completeness, which the [`CrawlReport`] exposes.

use crate::config::Config;
use crate::crawler::fetcher::{GeoSource, GeonamesClient};
use crate::crawler::mapping::{self, CountryCatalog};
use crate::crawler::scheduler::{BatchOutcome, BatchScheduler};
use crate::crawler::IdentityPool;
use crate::model::{AdditionalIndex, Country, CountryState, State, StateCity};
use crate::output::{CrawlReport, StageReport};
use crate::storage::{self, JsonFileStore, Storage, StorageResult};
use crate::AtlasError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Pipeline stage; also the entry point when resuming a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Countries,
    States,
    Cities,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Countries => "countries",
            Self::States => "states",
            Self::Cities => "cities",
        };
        f.write_str(name)
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "countries" => Ok(Self::Countries),
            "states" => Ok(Self::States),
            "cities" => Ok(Self::Cities),
            other => Err(format!(
                "unknown stage '{}', expected countries, states or cities",
                other
            )),
        }
    }
}

/// The hierarchical crawl pipeline
pub struct Pipeline<G, S> {
    source: G,
    store: S,
    scheduler: BatchScheduler,
    additional: AdditionalIndex,
}

impl Pipeline<GeonamesClient, JsonFileStore> {
    /// Wires the production pipeline from configuration
    ///
    /// This is the initialization point: the identity pool is validated and
    /// the auxiliary dataset is read here, before any request is made.
    pub fn from_config(config: &Config) -> Result<Self, AtlasError> {
        // Validate the identity pool; its size is the batch size
        let pool = IdentityPool::new(config.api.usernames.iter().cloned())?;
        let scheduler = BatchScheduler::new(pool, config.crawler.batch_cooldown());

        // Load the enrichment dataset
        let additional = AdditionalIndex::load(&config.output.additional_path)?;
        tracing::info!(
            "Loaded {} enrichment entries from {}",
            additional.len(),
            config.output.additional_path.display()
        );

        // Initialize HTTP client and storage
        let source = GeonamesClient::new(&config.api)?;
        let store = JsonFileStore::new(&config.output.metadata_dir);

        Ok(Self::new(source, store, scheduler, additional))
    }
}

impl<G, S> Pipeline<G, S>
where
    G: GeoSource,
    S: Storage,
{
    pub fn new(source: G, store: S, scheduler: BatchScheduler, additional: AdditionalIndex) -> Self {
        Self {
            source,
            store,
            scheduler,
            additional,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs all three stages
    pub async fn run(&self) -> Result<CrawlReport, AtlasError> {
        self.run_from(Stage::Countries).await
    }

    /// Runs the pipeline starting at `stage`
    ///
    /// Earlier stages are not re-crawled; their output is read back from the
    /// store. Missing or unreadable files there count as empty.
    ///
    /// # Arguments
    ///
    /// * `stage` - First stage to crawl
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - All stages ran; the report shows any gaps
    /// * `Err(AtlasError)` - The countries stage failed
    pub async fn run_from(&self, stage: Stage) -> Result<CrawlReport, AtlasError> {
        let mut report = CrawlReport::new(stage, self.scheduler.batch_size());

        // Stage 1: countries, crawled or read back
        let countries = if stage == Stage::Countries {
            let catalog = self.crawl_countries().await?;
            report.countries = catalog.countries.len();
            report.phone_codes = catalog.phone_codes.len();
            report.currencies = catalog.currencies.len();
            report.persist_failures += self.persist_catalog(&catalog);
            catalog.countries
        } else {
            let countries = self.load_countries();
            tracing::info!("Resuming with {} persisted countries", countries.len());
            report.countries = countries.len();
            countries
        };

        // Stage 2: states, persisted before any city request
        let country_states = if stage <= Stage::States {
            let outcome = self.crawl_states(&countries).await;
            report.persist_failures += self.persist_states(&outcome.results);
            report.states = Some(StageReport::from_outcome(&outcome, |g| g.states.len()));
            outcome.results
        } else {
            let groups = self.load_country_states(&countries);
            tracing::info!("Resuming with {} persisted state groups", groups.len());
            groups
        };

        // Stage 3: cities
        let outcome = self.crawl_cities(&country_states).await;
        report.persist_failures += self.persist_cities(&outcome.results);
        report.cities = Some(StageReport::from_outcome(&outcome, |g| g.cities.len()));

        report.finish();
        Ok(report)
    }

    /// Countries stage: fetch, enrich, and derive phone codes and currencies
    ///
    /// Any fetch failure is returned as-is; nothing is persisted for it.
    pub async fn crawl_countries(&self) -> Result<CountryCatalog, AtlasError> {
        tracing::info!("Crawling countries...");
        // Single unbatched request with the first identity
        let identity = self.scheduler.pool().primary();

        let response = self.source.country_info(identity).await?;
        tracing::info!("Countries crawled: {}", response.geonames.len());

        // Enrich and derive phone codes and currencies
        Ok(mapping::build_catalog(&response.geonames, &self.additional))
    }

    /// States stage: one children request per country
    pub async fn crawl_states(&self, countries: &[Country]) -> BatchOutcome<CountryState> {
        tracing::info!("Crawling states for {} countries...", countries.len());

        let outcome = self
            .scheduler
            .run("states", countries, |country, identity| async move {
                let response = self.source.children(country.id, identity).await?;
                Ok::<_, AtlasError>(mapping::country_states(country, &response.geonames))
            })
            .await;

        tracing::info!(
            "States crawled for {} / {} countries",
            outcome.results.len(),
            outcome.requested
        );
        outcome
    }

    /// Cities stage: one children request per state
    ///
    /// States of all countries form a single work list so batching and
    /// cooldowns apply across country boundaries.
    pub async fn crawl_cities(&self, country_states: &[CountryState]) -> BatchOutcome<StateCity> {
        // Flatten states of every country into one work list
        let states: Vec<&State> = country_states
            .iter()
            .flat_map(|group| group.states.iter())
            .collect();
        tracing::info!("Crawling cities for {} states...", states.len());

        let outcome = self
            .scheduler
            .run("cities", &states, |state, identity| async move {
                let response = self.source.children(state.id, identity).await?;
                Ok::<_, AtlasError>(mapping::state_cities(state, &response.geonames))
            })
            .await;

        tracing::info!(
            "Cities crawled for {} / {} states",
            outcome.results.len(),
            outcome.requested
        );
        outcome
    }

    /// Writes the three countries-stage files; returns the failure count
    pub fn persist_catalog(&self, catalog: &CountryCatalog) -> usize {
        let results = [
            self.persist(storage::COUNTRIES_FILE, &catalog.countries),
            self.persist(storage::PHONE_CODES_FILE, &catalog.phone_codes),
            self.persist(storage::CURRENCIES_FILE, &catalog.currencies),
        ];
        let failures = results.iter().filter(|ok| !**ok).count();
        tracing::info!("Countries, phone codes and currencies saved");
        failures
    }

    /// Writes one states file per country; returns the failure count
    pub fn persist_states(&self, groups: &[CountryState]) -> usize {
        let failures = groups
            .iter()
            .filter(|group| !self.persist(&storage::states_path(&group.country_code), *group))
            .count();
        tracing::info!("States saved for {} countries", groups.len() - failures);
        failures
    }

    /// Writes one cities file per state; returns the failure count
    pub fn persist_cities(&self, groups: &[StateCity]) -> usize {
        let failures = groups
            .iter()
            .filter(|group| {
                let path = storage::cities_path(&group.country_code, &group.state_code);
                !self.persist(&path, *group)
            })
            .count();
        tracing::info!("Cities saved for {} states", groups.len() - failures);
        failures
    }

    /// Reads `countries.json` back (resume)
    pub fn load_countries(&self) -> Vec<Country> {
        storage::or_empty(
            storage::COUNTRIES_FILE,
            storage::load_list(&self.store, storage::COUNTRIES_FILE),
        )
    }

    /// Reads every country's states file back (resume)
    pub fn load_country_states(&self, countries: &[Country]) -> Vec<CountryState> {
        countries
            .iter()
            .filter_map(|country| {
                let path = storage::states_path(&country.code);
                let result: StorageResult<CountryState> = storage::load_document(&self.store, &path);
                storage::or_empty(&path, result.map(Some))
            })
            .collect()
    }

    /// Persistence failures are logged and never abort the pipeline
    fn persist<T>(&self, path: &str, value: &T) -> bool
    where
        T: Serialize + ?Sized,
    {
        match storage::save(&self.store, path, value) {
            Ok(()) => {
                tracing::debug!("Saved {}", path);
                true
            }
            Err(e) => {
                tracing::error!("Failed to save data to {}: {}", path, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_parsing() {
        assert_eq!("countries".parse::<Stage>().unwrap(), Stage::Countries);
        assert_eq!("States".parse::<Stage>().unwrap(), Stage::States);
        assert_eq!("CITIES".parse::<Stage>().unwrap(), Stage::Cities);
        assert!("towns".parse::<Stage>().is_err());
    }

    #[test]
    fn test_stage_order() {
        assert!(Stage::Countries < Stage::States);
        assert!(Stage::States < Stage::Cities);
        assert_eq!(Stage::States.to_string(), "states");
    }
}
