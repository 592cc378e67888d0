//! Crawl run report
//!
//! A run never fails because some states or cities could not be fetched.
//! Completeness is judged by comparing requested and fetched counts here.

use crate::crawler::{BatchOutcome, Stage};
use chrono::{DateTime, Utc};

/// Counts for one batched stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    /// Work items scheduled (countries for states, states for cities)
    pub requested: usize,
    /// Work items that produced a result
    pub succeeded: usize,
    pub failed: usize,
    /// Records across all results (states or cities)
    pub records: usize,
    pub batches: usize,
    pub cooldowns: usize,
}

impl StageReport {
    pub fn from_outcome<R, F>(outcome: &BatchOutcome<R>, records: F) -> Self
    where
        F: Fn(&R) -> usize,
    {
        Self {
            requested: outcome.requested,
            succeeded: outcome.results.len(),
            failed: outcome.failed,
            records: outcome.results.iter().map(records).sum(),
            batches: outcome.batches,
            cooldowns: outcome.cooldowns,
        }
    }

    pub fn missing(&self) -> usize {
        self.requested.saturating_sub(self.succeeded)
    }

    pub fn is_complete(&self) -> bool {
        self.missing() == 0
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub start_stage: Stage,
    pub batch_size: usize,
    pub countries: usize,
    pub phone_codes: usize,
    pub currencies: usize,
    /// `None` when the states stage was not crawled in this run
    pub states: Option<StageReport>,
    pub cities: Option<StageReport>,
    pub persist_failures: usize,
}

impl CrawlReport {
    pub fn new(start_stage: Stage, batch_size: usize) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            start_stage,
            batch_size,
            countries: 0,
            phone_codes: 0,
            currencies: 0,
            states: None,
            cities: None,
            persist_failures: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Every scheduled item fetched and every file written
    pub fn is_complete(&self) -> bool {
        self.persist_failures == 0
            && self.states.as_ref().map_or(true, StageReport::is_complete)
            && self.cities.as_ref().map_or(true, StageReport::is_complete)
    }
}

fn format_stage(out: &mut String, name: &str, unit: &str, stage: &Option<StageReport>) {
    match stage {
        Some(stage) => {
            out.push_str(&format!(
                "  {}: {} {} from {} / {} requests ({} failed, {} batches)\n",
                name,
                stage.records,
                unit,
                stage.succeeded,
                stage.requested,
                stage.failed,
                stage.batches
            ));
        }
        None => out.push_str(&format!("  {}: not crawled in this run\n", name)),
    }
}

/// Formats a report for the terminal
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Report ===\n\n");
    out.push_str(&format!("Started: {}\n", report.started_at.to_rfc3339()));
    if let Some(seconds) = report.duration_seconds() {
        out.push_str(&format!(
            "Duration: {} seconds ({:.2} minutes)\n",
            seconds,
            seconds as f64 / 60.0
        ));
    }
    out.push_str(&format!("Started at stage: {}\n", report.start_stage));
    out.push_str(&format!("Batch size: {}\n\n", report.batch_size));

    out.push_str("Stages:\n");
    out.push_str(&format!(
        "  countries: {} ({} phone codes, {} currencies)\n",
        report.countries, report.phone_codes, report.currencies
    ));
    format_stage(&mut out, "states", "states", &report.states);
    format_stage(&mut out, "cities", "cities", &report.cities);
    out.push('\n');

    if report.persist_failures > 0 {
        out.push_str(&format!(
            "Persistence failures: {} (see error log)\n",
            report.persist_failures
        ));
    }

    if report.is_complete() {
        out.push_str("✓ Crawl complete\n");
    } else {
        out.push_str("✗ Crawl incomplete, re-run to fill the gaps\n");
    }

    out
}

/// Prints a report to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", format_report(report));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(requested: usize, succeeded: usize) -> StageReport {
        StageReport {
            requested,
            succeeded,
            failed: requested - succeeded,
            records: succeeded * 10,
            batches: 1,
            cooldowns: 0,
        }
    }

    #[test]
    fn test_from_outcome_counts_records() {
        let outcome = BatchOutcome {
            results: vec![vec![1, 2], vec![3]],
            requested: 3,
            failed: 1,
            batches: 2,
            cooldowns: 1,
        };

        let report = StageReport::from_outcome(&outcome, |r| r.len());
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.records, 3);
        assert_eq!(report.missing(), 1);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_complete_report() {
        let mut report = CrawlReport::new(Stage::Countries, 3);
        report.states = Some(stage(5, 5));
        report.cities = Some(stage(40, 40));
        report.finish();

        assert!(report.is_complete());
        assert!(report.duration_seconds().is_some());
        assert!(format_report(&report).contains("✓ Crawl complete"));
    }

    #[test]
    fn test_gaps_make_report_incomplete() {
        let mut report = CrawlReport::new(Stage::States, 2);
        report.states = Some(stage(5, 4));

        assert!(!report.is_complete());
        let text = format_report(&report);
        assert!(text.contains("4 / 5 requests"));
        assert!(text.contains("cities: not crawled in this run"));
    }

    #[test]
    fn test_persist_failures_make_report_incomplete() {
        let mut report = CrawlReport::new(Stage::Countries, 1);
        report.persist_failures = 1;
        assert!(!report.is_complete());
    }
}
