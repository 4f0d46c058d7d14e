//! Timed insert/search workloads.
//!
//! Keys are always the integers `1..=total_keys`. The concurrent run splits
//! them into one contiguous block per worker:
//!
//! ```text
//! total = 10, workers = 3
//!
//!   worker 0   1 ..= 3
//!   worker 1   4 ..= 6
//!   worker 2   7 ..= 10   (last block absorbs the remainder)
//! ```
//!
//! Every worker times each insert and search on its own and the totals are
//! summed only after all workers have joined.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use ordex_core::{ConcurrentIndex, OrderedIndex};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};

pub const DEFAULT_TOTAL_KEYS: usize = 1_000_000;
pub const DEFAULT_WORKERS: usize = 8;
pub const DEFAULT_SEARCHES_PER_INSERT: usize = 10;
pub const DEFAULT_SEARCH_QUERIES: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// Keys `1..=total_keys` are inserted.
    pub total_keys: usize,
    /// Threads in a concurrent run.
    pub workers: usize,
    /// Random searches a concurrent worker runs after each of its inserts.
    pub searches_per_insert: usize,
    /// Random searches a sequential run makes once the index is built.
    pub search_queries: usize,
    /// Seed for the search key streams; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        WorkloadConfig {
            total_keys: DEFAULT_TOTAL_KEYS,
            workers: DEFAULT_WORKERS,
            searches_per_insert: DEFAULT_SEARCHES_PER_INSERT,
            search_queries: DEFAULT_SEARCH_QUERIES,
            seed: None,
        }
    }
}

impl WorkloadConfig {
    /// The same config with a concrete seed, drawn from entropy when unset.
    ///
    /// Runs that share the resolved config draw the same search keys.
    ///
    pub fn with_resolved_seed(&self) -> Self {
        WorkloadConfig {
            seed: Some(self.seed.unwrap_or_else(rand::random)),
            ..*self
        }
    }

    fn search_rng(&self, stream: u64) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(stream)),
            None => SmallRng::from_os_rng(),
        }
    }
}

/// Split `1..=total` into `workers` contiguous, disjoint blocks.
///
/// Every block holds `total / workers` keys except the last, which also takes
/// the remainder. Blocks are empty when there are more workers than keys.
///
pub fn partition(total: usize, workers: usize) -> Vec<RangeInclusive<i64>> {
    if workers == 0 {
        return Vec::new();
    }

    let block = (total / workers) as i64;
    (0..workers as i64)
        .map(|worker| {
            let start = worker * block + 1;
            let end = if worker == workers as i64 - 1 {
                total as i64
            } else {
                (worker + 1) * block
            };
            start..=end
        })
        .collect()
}

/// Insert `keys` in order and return the time it took.
pub fn fill<I: OrderedIndex<i64>>(index: &mut I, keys: RangeInclusive<i64>) -> Duration {
    let start = Instant::now();
    for key in keys {
        index.insert(key);
    }
    start.elapsed()
}

// ============================================================================
// Sequential
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SequentialReport {
    pub keys: usize,
    pub insert_time: Duration,
    pub searches: usize,
    pub hits: usize,
    pub search_time: Duration,
}

impl SequentialReport {
    pub fn mean_search(&self) -> Duration {
        mean(self.search_time, self.searches)
    }
}

impl fmt::Display for SequentialReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "inserted {} keys in {:.4}s",
            self.keys,
            self.insert_time.as_secs_f64()
        )?;
        write!(
            f,
            "{} searches ({} found) in {:.6}s, {:.3}µs per search",
            self.searches,
            self.hits,
            self.search_time.as_secs_f64(),
            micros(self.mean_search())
        )
    }
}

/// Insert `1..=total_keys` in order, then run `search_queries` random searches.
pub fn run_sequential<I>(index: &mut I, config: &WorkloadConfig) -> SequentialReport
where
    I: OrderedIndex<i64>,
{
    info!("sequential workload: {} keys", config.total_keys);

    let insert_time = fill(index, 1..=config.total_keys as i64);
    info!(
        "inserted {} keys in {:.4}s",
        config.total_keys,
        insert_time.as_secs_f64()
    );

    let mut rng = config.search_rng(0);
    let mut hits = 0;
    let mut search_time = Duration::ZERO;
    let searches = if config.total_keys == 0 {
        0
    } else {
        config.search_queries
    };

    for _ in 0..searches {
        let key = rng.random_range(1..=config.total_keys as i64);
        let start = Instant::now();
        let found = index.search(&key);
        search_time += start.elapsed();
        if found {
            hits += 1;
        }
    }

    let report = SequentialReport {
        keys: config.total_keys,
        insert_time,
        searches,
        hits,
        search_time,
    };
    info!("sequential workload complete: {} hits", report.hits);
    report
}

// ============================================================================
// Concurrent
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerReport {
    pub worker: usize,
    pub keys: RangeInclusive<i64>,
    pub inserted: usize,
    pub insert_time: Duration,
    pub searches: usize,
    pub hits: usize,
    pub search_time: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConcurrentReport {
    pub wall_time: Duration,
    pub workers: Vec<WorkerReport>,
}

impl ConcurrentReport {
    pub fn inserted(&self) -> usize {
        self.workers.iter().map(|w| w.inserted).sum()
    }

    pub fn insert_time(&self) -> Duration {
        self.workers.iter().map(|w| w.insert_time).sum()
    }

    pub fn searches(&self) -> usize {
        self.workers.iter().map(|w| w.searches).sum()
    }

    pub fn hits(&self) -> usize {
        self.workers.iter().map(|w| w.hits).sum()
    }

    pub fn search_time(&self) -> Duration {
        self.workers.iter().map(|w| w.search_time).sum()
    }
}

impl fmt::Display for ConcurrentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} workers, wall time {:.4}s",
            self.workers.len(),
            self.wall_time.as_secs_f64()
        )?;
        writeln!(
            f,
            "inserts:  {} in {:.4}s accumulated, {:.3}µs per insert",
            self.inserted(),
            self.insert_time().as_secs_f64(),
            micros(mean(self.insert_time(), self.inserted()))
        )?;
        write!(
            f,
            "searches: {} ({} found) in {:.4}s accumulated, {:.3}µs per search",
            self.searches(),
            self.hits(),
            self.search_time().as_secs_f64(),
            micros(mean(self.search_time(), self.searches()))
        )
    }
}

/// Insert `1..=total_keys` from `workers` threads, one block each, with
/// `searches_per_insert` random searches over the whole key space after
/// every insert.
pub fn run_concurrent<I>(index: Arc<I>, config: &WorkloadConfig) -> Result<ConcurrentReport>
where
    I: ConcurrentIndex<i64> + 'static,
{
    if config.workers == 0 {
        return Err(Error::NoWorkers);
    }

    info!(
        "concurrent workload: {} keys, {} workers, {} searches per insert",
        config.total_keys, config.workers, config.searches_per_insert
    );

    let blocks = partition(config.total_keys, config.workers);
    let barrier = Arc::new(Barrier::new(blocks.len() + 1));
    let max_key = config.total_keys as i64;

    let handles: Vec<_> = blocks
        .into_iter()
        .enumerate()
        .map(|(worker, keys)| {
            let index = Arc::clone(&index);
            let barrier = Arc::clone(&barrier);
            let mut rng = config.search_rng(worker as u64 + 1);
            let searches_per_insert = if max_key > 0 {
                config.searches_per_insert
            } else {
                0
            };

            thread::spawn(move || {
                let mut report = WorkerReport {
                    worker,
                    keys: keys.clone(),
                    inserted: 0,
                    insert_time: Duration::ZERO,
                    searches: 0,
                    hits: 0,
                    search_time: Duration::ZERO,
                };
                barrier.wait();

                for key in keys {
                    let start = Instant::now();
                    let added = index.insert(key);
                    report.insert_time += start.elapsed();
                    if added {
                        report.inserted += 1;
                    }

                    for _ in 0..searches_per_insert {
                        let target = rng.random_range(1..=max_key);
                        let start = Instant::now();
                        let found = index.search(&target);
                        report.search_time += start.elapsed();
                        report.searches += 1;
                        if found {
                            report.hits += 1;
                        }
                    }
                }
                report
            })
        })
        .collect();

    barrier.wait();
    let start = Instant::now();

    let mut workers = Vec::with_capacity(handles.len());
    for (worker, handle) in handles.into_iter().enumerate() {
        let report = handle.join().map_err(|_| Error::WorkerPanicked(worker))?;
        debug!(
            "worker {} ({:?}): {} inserted, {} searches, {} hits",
            report.worker, report.keys, report.inserted, report.searches, report.hits
        );
        workers.push(report);
    }

    let report = ConcurrentReport {
        wall_time: start.elapsed(),
        workers,
    };
    info!(
        "concurrent workload complete in {:.4}s",
        report.wall_time.as_secs_f64()
    );
    Ok(report)
}

// ============================================================================
// Side-by-side comparison
// ============================================================================

/// Totals shared by the sequential and concurrent reports.
pub trait ReportTotals {
    fn total_insert_time(&self) -> Duration;
    fn total_search_time(&self) -> Duration;
    fn total_searches(&self) -> usize;

    fn mean_search_time(&self) -> Duration {
        mean(self.total_search_time(), self.total_searches())
    }
}

impl ReportTotals for SequentialReport {
    fn total_insert_time(&self) -> Duration {
        self.insert_time
    }

    fn total_search_time(&self) -> Duration {
        self.search_time
    }

    fn total_searches(&self) -> usize {
        self.searches
    }
}

impl ReportTotals for ConcurrentReport {
    fn total_insert_time(&self) -> Duration {
        self.insert_time()
    }

    fn total_search_time(&self) -> Duration {
        self.search_time()
    }

    fn total_searches(&self) -> usize {
        self.searches()
    }
}

/// One workload run against both structures with the same search keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison<R> {
    /// Seed both runs drew their search keys from.
    pub seed: u64,
    pub skip_list: R,
    pub avl_tree: R,
}

impl<R: fmt::Display + ReportTotals> fmt::Display for Comparison<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- skip list ---\n{}\n", self.skip_list)?;
        writeln!(f, "--- avl tree ---\n{}\n", self.avl_tree)?;

        writeln!(f, "=== summary (seed {}) ===", self.seed)?;
        writeln!(
            f,
            "insert        skip list {:>10.4}s   avl tree {:>10.4}s",
            self.skip_list.total_insert_time().as_secs_f64(),
            self.avl_tree.total_insert_time().as_secs_f64()
        )?;
        writeln!(
            f,
            "search total  skip list {:>10.4}s   avl tree {:>10.4}s",
            self.skip_list.total_search_time().as_secs_f64(),
            self.avl_tree.total_search_time().as_secs_f64()
        )?;
        write!(
            f,
            "search mean   skip list {:>10.3}µs  avl tree {:>10.3}µs",
            micros(self.skip_list.mean_search_time()),
            micros(self.avl_tree.mean_search_time())
        )
    }
}

/// Run the sequential workload on a skip list, then on an AVL tree, with one
/// shared search key stream.
pub fn compare_sequential<S, A>(
    skip_list: &mut S,
    avl_tree: &mut A,
    config: &WorkloadConfig,
) -> Comparison<SequentialReport>
where
    S: OrderedIndex<i64>,
    A: OrderedIndex<i64>,
{
    let config = config.with_resolved_seed();
    let seed = config.seed.unwrap_or_default();
    info!("comparing skip list and avl tree, search seed {}", seed);

    Comparison {
        seed,
        skip_list: run_sequential(skip_list, &config),
        avl_tree: run_sequential(avl_tree, &config),
    }
}

/// Run the concurrent workload on a skip list, then on an AVL tree. Every
/// worker draws the same search keys in both runs.
pub fn compare_concurrent<S, A>(
    skip_list: Arc<S>,
    avl_tree: Arc<A>,
    config: &WorkloadConfig,
) -> Result<Comparison<ConcurrentReport>>
where
    S: ConcurrentIndex<i64> + 'static,
    A: ConcurrentIndex<i64> + 'static,
{
    let config = config.with_resolved_seed();
    let seed = config.seed.unwrap_or_default();
    info!("comparing skip list and avl tree, search seed {}", seed);

    Ok(Comparison {
        seed,
        skip_list: run_concurrent(skip_list, &config)?,
        avl_tree: run_concurrent(avl_tree, &config)?,
    })
}

fn mean(total: Duration, count: usize) -> Duration {
    if count == 0 {
        Duration::ZERO
    } else {
        total.div_f64(count as f64)
    }
}

fn micros(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1e6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_covers_every_key_once() {
        let blocks = partition(10, 3);
        assert_eq!(blocks, vec![1..=3, 4..=6, 7..=10]);

        let keys: Vec<i64> = blocks.into_iter().flatten().collect();
        assert_eq!(keys, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_partition_more_workers_than_keys() {
        let blocks = partition(2, 4);
        assert_eq!(blocks.len(), 4);
        assert!(blocks[..3].iter().all(|block| block.is_empty()));
        assert_eq!(blocks[3], 1..=2);
    }

    #[test]
    fn test_partition_no_workers() {
        assert!(partition(100, 0).is_empty());
    }

    #[test]
    fn test_resolved_seed_is_kept() {
        let config = WorkloadConfig {
            seed: Some(9),
            ..WorkloadConfig::default()
        };
        assert_eq!(config.with_resolved_seed(), config);

        let drawn = WorkloadConfig::default().with_resolved_seed();
        assert!(drawn.seed.is_some());
        assert_eq!(drawn.with_resolved_seed(), drawn);
    }

    #[test]
    fn test_mean_of_nothing_is_zero() {
        assert_eq!(mean(Duration::from_secs(3), 0), Duration::ZERO);
        assert_eq!(mean(Duration::from_secs(3), 3), Duration::from_secs(1));
    }
}
