//! Worker loop for the scraping pool
//!
//! Each worker moves through idle → fetching → pacing → idle until it pops a
//! shutdown job. Pacing is a per-worker pause of one base delay plus jitter,
//! taken after every target in addition to any retry backoff.

use crate::checkpoint::ResultSet;
use crate::config::SiteConfig;
use crate::extract::CompanyRecord;
use crate::pipeline::fetcher::PageFetcher;
use crate::pipeline::queue::{Job, WorkQueue};
use crate::pipeline::retry::{scrape_with_retry, RetryPolicy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Everything a worker shares with the rest of the pool
pub struct WorkerContext<F> {
    pub fetcher: Arc<F>,
    pub queue: Arc<WorkQueue>,
    pub results: Arc<Mutex<ResultSet>>,
    pub active_workers: Arc<AtomicUsize>,
    pub site: Arc<SiteConfig>,
    pub policy: RetryPolicy,
    /// Number of loaded targets, for progress messages
    pub total: usize,
}

impl<F> Clone for WorkerContext<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            queue: Arc::clone(&self.queue),
            results: Arc::clone(&self.results),
            active_workers: Arc::clone(&self.active_workers),
            site: Arc::clone(&self.site),
            policy: self.policy,
            total: self.total,
        }
    }
}

/// Acknowledges the current job when dropped, even if the worker panics
struct JobGuard<'a>(&'a WorkQueue);

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.0.task_done();
    }
}

/// Marks the worker inactive when dropped
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Stores a finished record unless the target already has one
///
/// Returns true if the record was stored.
pub fn store_result(results: &Mutex<ResultSet>, record: CompanyRecord) -> bool {
    let mut results = results.lock().unwrap();
    if results.contains_key(&record.link) {
        return false;
    }
    results.insert(record.link.clone(), record);
    true
}

/// Runs one worker until it receives a shutdown job
///
/// The caller must count this worker in `active_workers` before spawning it.
pub async fn run_worker<F: PageFetcher>(id: usize, ctx: WorkerContext<F>) {
    let _active = ActiveGuard(Arc::clone(&ctx.active_workers));

    loop {
        let job = ctx.queue.pop().await;
        let _ack = JobGuard(&ctx.queue);

        let target = match job {
            Job::Shutdown => {
                tracing::trace!("[worker {}] Shutting down", id);
                return;
            }
            Job::Scrape(target) => target,
        };

        let ordinal = target.index + 1;
        tracing::info!(
            "[worker {}] Starting {}/{}: {}",
            id,
            ordinal,
            ctx.total,
            target.link
        );

        let record = scrape_with_retry(ctx.fetcher.as_ref(), &target.link, &ctx.policy, &ctx.site)
            .await;
        let has_data = record.has_data();

        if !store_result(&ctx.results, record) {
            tracing::warn!(
                "[worker {}] Result for {} already recorded, keeping the first",
                id,
                target.link
            );
        } else if has_data {
            tracing::info!(
                "[worker {}] Success {}/{}: {}",
                id,
                ordinal,
                ctx.total,
                target.link
            );
        } else {
            tracing::info!(
                "[worker {}] No data after retries {}/{}: {}",
                id,
                ordinal,
                ctx.total,
                target.link
            );
        }

        tokio::time::sleep(ctx.policy.pacing_delay()).await;
    }
}
