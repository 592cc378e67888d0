//! Batch scheduler for rate-limited fan-out
//!
//! This module handles:
//! - Partitioning work items into contiguous batches sized to the identity pool
//! - Running every request of a batch concurrently, one identity per position
//! - Waiting for the whole batch to settle before moving on
//! - Inserting a cooldown between batches
//! - Collecting successes while logging and dropping per-item failures

use crate::crawler::credentials::IdentityPool;
use futures::future::join_all;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Result of running a work list through the scheduler
///
/// `results` holds only successful items; compare `results.len()` with
/// `requested` to detect gaps.
#[derive(Debug)]
pub struct BatchOutcome<R> {
    pub results: Vec<R>,
    pub requested: usize,
    pub failed: usize,
    pub batches: usize,
    pub cooldowns: usize,
}

impl<R> BatchOutcome<R> {
    fn new(requested: usize) -> Self {
        Self {
            results: Vec::new(),
            requested,
            failed: 0,
            batches: 0,
            cooldowns: 0,
        }
    }

    /// Whether every requested item produced a result
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.results.len() == self.requested
    }
}

/// Runs work lists in identity-pool sized batches
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    pool: IdentityPool,
    cooldown: Duration,
}

impl BatchScheduler {
    /// Creates a scheduler; the batch size is the pool size
    pub fn new(pool: IdentityPool, cooldown: Duration) -> Self {
        Self { pool, cooldown }
    }

    pub fn batch_size(&self) -> usize {
        self.pool.len()
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn pool(&self) -> &IdentityPool {
        &self.pool
    }

    /// Number of batches needed for `items` work items
    pub fn batch_count(&self, items: usize) -> usize {
        items.div_ceil(self.batch_size())
    }

    /// Runs `worker` over every item
    ///
    /// Batch `k + 1` starts only after every worker of batch `k` has settled,
    /// followed by the cooldown. A failing worker never affects its siblings;
    /// its error is logged with the item and the item is left out of the
    /// results. No retry happens here: the fetch layer already retried.
    ///
    /// Results follow input order within a batch; failed items leave gaps.
    ///
    /// # Arguments
    ///
    /// * `label` - What is being crawled, for log lines ("states", "cities")
    /// * `items` - The work list
    /// * `worker` - Called with each item and its assigned identity
    pub async fn run<'a, T, R, E, W, Fut>(
        &'a self,
        label: &str,
        items: &'a [T],
        worker: W,
    ) -> BatchOutcome<R>
    where
        T: Display,
        E: Display,
        W: Fn(&'a T, &'a str) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let mut outcome = BatchOutcome::new(items.len());
        if items.is_empty() {
            tracing::info!("No {} to crawl", label);
            return outcome;
        }

        let total = self.batch_count(items.len());

        for (index, batch) in items.chunks(self.batch_size()).enumerate() {
            let requests = batch.iter().enumerate().map(|(position, item)| {
                let identity = self.pool.assign(position);
                tracing::debug!(
                    "Crawling {} for {} with identity index {}",
                    label,
                    item,
                    position % self.pool.len()
                );
                worker(item, identity)
            });

            let settled = join_all(requests).await;

            for (position, (item, result)) in batch.iter().zip(settled).enumerate() {
                match result {
                    Ok(value) => outcome.results.push(value),
                    Err(e) => {
                        outcome.failed += 1;
                        tracing::warn!(
                            "Error crawling {} for {} (batch {}, position {}): {}",
                            label,
                            item,
                            index + 1,
                            position,
                            e
                        );
                    }
                }
            }
            outcome.batches += 1;

            if index + 1 < total {
                tracing::info!(
                    "Batch {} / {} completed, waiting {:?}...",
                    index + 1,
                    total,
                    self.cooldown
                );
                tokio::time::sleep(self.cooldown).await;
                outcome.cooldowns += 1;
            } else {
                tracing::info!("Batch {} / {} completed", index + 1, total);
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tokio::time::Instant;

    fn create_scheduler(identities: &[&str], cooldown_ms: u64) -> BatchScheduler {
        BatchScheduler::new(
            IdentityPool::new(identities.iter().copied()).unwrap(),
            Duration::from_millis(cooldown_ms),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_runs_no_batches() {
        let scheduler = create_scheduler(&["a", "b"], 1000);
        let start = Instant::now();

        let outcome = scheduler
            .run("states", &Vec::<u32>::new(), |item, _| async move {
                Ok::<_, String>(*item)
            })
            .await;

        assert!(outcome.results.is_empty());
        assert_eq!(outcome.batches, 0);
        assert_eq!(outcome.cooldowns, 0);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_and_cooldowns() {
        let scheduler = create_scheduler(&["a", "b", "c"], 2000);
        let items: Vec<u32> = (1..=7).collect();
        let start = Instant::now();

        let outcome = scheduler
            .run("states", &items, |item, _| async move { Ok::<_, String>(*item) })
            .await;

        assert_eq!(scheduler.batch_count(items.len()), 3);
        assert_eq!(outcome.batches, 3);
        assert_eq!(outcome.cooldowns, 2);
        assert_eq!(outcome.results.len(), 7);
        assert!(outcome.is_complete());
        assert_eq!(start.elapsed(), Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exact_multiple_has_no_trailing_cooldown() {
        let scheduler = create_scheduler(&["a", "b"], 500);
        let items: Vec<u32> = (0..4).collect();

        let outcome = scheduler
            .run("cities", &items, |item, _| async move { Ok::<_, String>(*item) })
            .await;

        assert_eq!(outcome.batches, 2);
        assert_eq!(outcome.cooldowns, 1);
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_siblings() {
        let scheduler = create_scheduler(&["a", "b", "c", "d", "e"], 0);
        let items: Vec<u32> = (1..=5).collect();

        let outcome = scheduler
            .run("states", &items, |item, _| async move {
                if *item == 3 {
                    Err(format!("forced failure for {}", item))
                } else {
                    Ok(*item)
                }
            })
            .await;

        assert_eq!(outcome.results.len(), 4);
        assert_eq!(outcome.failed, 1);
        assert!(!outcome.is_complete());
        let got: HashSet<u32> = outcome.results.into_iter().collect();
        assert_eq!(got, HashSet::from([1, 2, 4, 5]));
    }

    #[tokio::test]
    async fn test_identities_follow_batch_position() {
        let scheduler = create_scheduler(&["a", "b", "c"], 0);
        let items: Vec<u32> = (0..5).collect();
        let seen = Mutex::new(Vec::new());

        scheduler
            .run("states", &items, |item, identity| {
                seen.lock().unwrap().push((*item, identity.to_string()));
                async move { Ok::<_, String>(()) }
            })
            .await;

        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        let expected: Vec<(u32, String)> = vec![
            (0, "a".to_string()),
            (1, "b".to_string()),
            (2, "c".to_string()),
            (3, "a".to_string()),
            (4, "b".to_string()),
        ];
        assert_eq!(seen, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_batch_waits_for_slowest_worker() {
        let scheduler = create_scheduler(&["a", "b"], 100);
        let items: Vec<u64> = vec![300, 10, 10, 10];
        let events = Mutex::new(Vec::new());

        scheduler
            .run("states", &items, |delay, _| {
                let events = &events;
                async move {
                    events.lock().unwrap().push(format!("start {}", delay));
                    tokio::time::sleep(Duration::from_millis(*delay)).await;
                    events.lock().unwrap().push(format!("end {}", delay));
                    Ok::<_, String>(())
                }
            })
            .await;

        let events = events.into_inner().unwrap();
        let slow_end = events.iter().position(|e| e == "end 300").unwrap();
        let starts: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.starts_with("start"))
            .map(|(i, _)| i)
            .collect();

        // Items 3 and 4 belong to the second batch
        assert!(starts[2] > slow_end);
        assert!(starts[3] > slow_end);
    }
}
