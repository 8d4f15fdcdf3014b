//! Scraping pipeline
//!
//! This module handles the fetch side of a run:
//! - Fetching pages over HTTP with a shared client
//! - Retrying failed fetches with exponential backoff
//! - Distributing targets to a fixed pool of paced workers
//! - Coordinating the pool with checkpointing and result assembly

pub mod coordinator;
pub mod fetcher;
pub mod queue;
pub mod retry;
pub mod worker;

pub use coordinator::{assemble_records, run_scrape, Coordinator, RunOptions, ScrapeOutcome};
pub use fetcher::{build_http_client, fetch_url, FetchResult, HttpFetcher, PageFetcher};
pub use queue::{Job, WorkQueue};
pub use retry::{scrape_with_retry, RetryPolicy};
pub use worker::{run_worker, store_result, WorkerContext};
