//! Scrape coordinator - main run orchestration logic
//!
//! This module contains the run sequence that ties the pipeline together:
//! - Loading targets and, when resuming, the previous checkpoint
//! - Seeding the work queue with unresolved targets
//! - Running the worker pool alongside the periodic checkpoint task
//! - Saving the final checkpoint and assembling ordered records

use crate::checkpoint::{
    spawn_checkpointer, stop_checkpointer, CheckpointStore, CheckpointWriter, JsonCheckpoint,
    ResultSet,
};
use crate::config::Config;
use crate::extract::CompanyRecord;
use crate::input::{load_targets, Target};
use crate::output::RunStats;
use crate::pipeline::fetcher::{HttpFetcher, PageFetcher};
use crate::pipeline::queue::WorkQueue;
use crate::pipeline::retry::RetryPolicy;
use crate::pipeline::worker::{run_worker, WorkerContext};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex};

/// Where a run reads its targets and keeps its checkpoint
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Input CSV with the link column
    pub input: PathBuf,

    /// Checkpoint file, read when resuming and written during the run
    pub checkpoint: PathBuf,

    /// Skip targets already present in the checkpoint
    pub resume: bool,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    /// One record per input target, in input order
    pub records: Vec<CompanyRecord>,

    pub stats: RunStats,
}

/// Main scrape coordinator structure
pub struct Coordinator<F> {
    config: Arc<Config>,
    fetcher: Arc<F>,
    checkpoint: CheckpointWriter,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP and checkpoints to JSON
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `checkpoint` - Path of the checkpoint file
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ScrapeError)` - The HTTP client could not be built
    pub fn new(config: Config, checkpoint: PathBuf) -> crate::Result<Self> {
        let fetcher = HttpFetcher::from_config(&config)?;
        Ok(Self::with_fetcher(
            config,
            fetcher,
            Arc::new(JsonCheckpoint::new(checkpoint)),
        ))
    }
}

impl<F: PageFetcher + 'static> Coordinator<F> {
    /// Creates a coordinator with an explicit fetcher and checkpoint store
    pub fn with_fetcher(config: Config, fetcher: F, store: Arc<dyn CheckpointStore>) -> Self {
        Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            checkpoint: CheckpointWriter::new(store),
        }
    }

    /// Scrapes every target and returns the records in input order
    ///
    /// Never fails: targets that yield nothing get a placeholder record, and a
    /// failed checkpoint save is logged.
    pub async fn run(&self, targets: &[Target], resume: bool) -> ScrapeOutcome {
        let started_at = chrono::Utc::now();
        let total = targets.len();

        let initial = if resume {
            let previous = self.checkpoint.load().await;
            if !previous.is_empty() {
                tracing::info!("Resuming: {} rows already scraped", previous.len());
            }
            previous
        } else {
            ResultSet::new()
        };

        // Each distinct unresolved link is queued once
        let mut seen = HashSet::new();
        let mut resumed = 0;
        let mut pending = Vec::new();
        for target in targets {
            if !seen.insert(target.link.as_str()) {
                continue;
            }
            if initial.contains_key(&target.link) {
                resumed += 1;
            } else {
                pending.push(target.clone());
            }
        }
        let scraped = pending.len();
        tracing::info!(
            "Loaded {} targets, {} to scrape, {} resumed",
            total,
            scraped,
            resumed
        );

        let results = Arc::new(Mutex::new(initial));
        self.run_pool(pending, total, Arc::clone(&results)).await;

        let final_results = results.lock().unwrap().clone();
        match self.checkpoint.save(final_results.clone()).await {
            Ok(()) => tracing::info!("Final checkpoint saved with {} rows", final_results.len()),
            Err(e) => tracing::error!("Failed to save final checkpoint: {}", e),
        }

        let records = assemble_records(targets, &final_results);
        let stats = RunStats::collect(&records, resumed, scraped, started_at);
        ScrapeOutcome { records, stats }
    }

    /// Runs the worker pool until every pending target has been handled
    async fn run_pool(&self, pending: Vec<Target>, total: usize, results: Arc<Mutex<ResultSet>>) {
        let workers = self.config.scraper.concurrency.max(1);
        let queue = Arc::new(WorkQueue::seeded(pending));
        let active_workers = Arc::new(AtomicUsize::new(workers));

        let ctx = WorkerContext {
            fetcher: Arc::clone(&self.fetcher),
            queue: Arc::clone(&queue),
            results: Arc::clone(&results),
            active_workers: Arc::clone(&active_workers),
            site: Arc::new(self.config.site.clone()),
            policy: RetryPolicy::from_config(&self.config.scraper),
            total,
        };

        tracing::info!(
            "Starting {} workers ({} requests/min, up to {} attempts per target)",
            workers,
            self.config.scraper.requests_per_minute,
            ctx.policy.max_attempts()
        );

        let handles: Vec<_> = (0..workers)
            .map(|id| tokio::spawn(run_worker(id, ctx.clone())))
            .collect();

        let checkpointer = spawn_checkpointer(
            self.checkpoint.clone(),
            results,
            active_workers,
            self.config.scraper.checkpoint_interval(),
        );

        queue.join().await;
        queue.close(workers);

        for (id, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!("Worker {} failed: {}", id, e);
            }
        }

        // A worker that died early leaves its shutdown job behind
        if !queue.is_empty() {
            tracing::debug!("{} unused jobs left in the queue", queue.len());
        }

        stop_checkpointer(checkpointer).await;
    }
}

/// Builds one record per target in input order
///
/// Targets without a result get a placeholder holding only the link.
pub fn assemble_records(targets: &[Target], results: &ResultSet) -> Vec<CompanyRecord> {
    targets
        .iter()
        .map(|target| {
            results
                .get(&target.link)
                .cloned()
                .unwrap_or_else(|| CompanyRecord::placeholder(&target.link))
        })
        .collect()
}

/// Runs a complete scrape: load targets, run the pool, assemble records
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `options` - Input, checkpoint path and resume flag
///
/// # Returns
///
/// * `Ok(ScrapeOutcome)` - Records in input order and run statistics
/// * `Err(ScrapeError)` - The input could not be loaded or the HTTP client built
pub async fn run_scrape(config: Config, options: &RunOptions) -> crate::Result<ScrapeOutcome> {
    let targets = load_targets(&options.input, &config.input.link_column)?;
    tracing::info!(
        "Read {} targets from {}",
        targets.len(),
        options.input.display()
    );

    let coordinator = Coordinator::new(config, options.checkpoint.clone())?;
    Ok(coordinator.run(&targets, options.resume).await)
}
