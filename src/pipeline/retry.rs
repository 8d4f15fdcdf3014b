//! Retry policy for fetching and extracting a single target
//!
//! A target is fetched until content arrives or the retry budget is spent.
//! Between attempts the policy sleeps with exponential backoff plus jitter:
//!
//! | Attempt failed | Delay before next attempt |
//! |----------------|---------------------------|
//! | 1 | base + U(0, 0.5s) |
//! | 2 | 2 × base + U(0, 0.5s) |
//! | 3 | 4 × base + U(0, 0.5s) |
//! | n | 2^(n-1) × base + U(0, 0.5s) |
//!
//! where base is 60 / requests-per-minute seconds.

use crate::config::{ScraperConfig, SiteConfig};
use crate::extract::{extract_record, CompanyRecord};
use crate::pipeline::fetcher::PageFetcher;
use std::time::Duration;

/// Upper bound of the random jitter added to each backoff delay
pub const BACKOFF_JITTER: Duration = Duration::from_millis(500);

/// Upper bound of the random jitter added to each politeness pause
pub const PACING_JITTER: Duration = Duration::from_millis(250);

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Base delay derived from the rate limit
    pub base_delay: Duration,

    /// Attempts allowed after the first one
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_retries: u32) -> Self {
        Self {
            base_delay,
            max_retries,
        }
    }

    /// Builds the policy for a requests-per-minute rate limit
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use yc_harvest::pipeline::RetryPolicy;
    ///
    /// let policy = RetryPolicy::from_rpm(60, 4);
    /// assert_eq!(policy.base_delay, Duration::from_secs(1));
    /// ```
    pub fn from_rpm(requests_per_minute: u32, max_retries: u32) -> Self {
        let rpm = f64::from(requests_per_minute.max(1));
        Self::new(Duration::from_secs_f64(60.0 / rpm), max_retries)
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(config.base_delay(), config.max_retries)
    }

    /// Total number of fetches made for a target that never succeeds
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Deterministic part of the delay after failed attempt `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Backoff plus random jitter
    pub fn backoff_with_jitter(&self, attempt: u32) -> Duration {
        self.backoff(attempt) + jitter(BACKOFF_JITTER)
    }

    /// Pause a worker takes between two targets
    pub fn pacing_delay(&self) -> Duration {
        self.base_delay + jitter(PACING_JITTER)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ScraperConfig::default())
    }
}

/// Uniform random duration in `[0, max)`
pub fn jitter(max: Duration) -> Duration {
    max.mul_f64(fastrand::f64())
}

/// Fetches and extracts one target, retrying failed fetches
///
/// Never fails: when every attempt comes back without content, the result is a
/// placeholder holding only the link.
pub async fn scrape_with_retry<F: PageFetcher>(
    fetcher: &F,
    link: &str,
    policy: &RetryPolicy,
    site: &SiteConfig,
) -> CompanyRecord {
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let result = fetcher.fetch(link).await;
        let outcome = result.describe();

        if let Some(body) = result.into_content() {
            return extract_record(link, &body, site);
        }

        if attempt > policy.max_retries {
            tracing::debug!(
                "Giving up on {} after {} attempts (last: {})",
                link,
                attempt,
                outcome
            );
            return CompanyRecord::placeholder(link);
        }

        let delay = policy.backoff_with_jitter(attempt);
        tracing::debug!(
            "Attempt {} for {} failed ({}), retrying in {:?}",
            attempt,
            link,
            outcome,
            delay
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fetcher::FetchResult;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    /// Fails a fixed number of times, then serves `body`
    struct FlakyFetcher {
        failures: u32,
        calls: AtomicU32,
        body: String,
    }

    impl FlakyFetcher {
        fn new(failures: u32, body: &str) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                body: body.to_string(),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PageFetcher for FlakyFetcher {
        async fn fetch(&self, _url: &str) -> FetchResult {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                FetchResult::HttpError { status_code: 503 }
            } else {
                FetchResult::Success {
                    final_url: "https://www.ycombinator.com/companies/acme".to_string(),
                    body: self.body.clone(),
                }
            }
        }
    }

    const PAGE: &str = r#"<html><head><script id="__NEXT_DATA__" type="application/json">
        {"company": {"status": "Active", "batch": "W15"}}</script></head><body></body></html>"#;

    #[test]
    fn test_from_rpm() {
        assert_eq!(RetryPolicy::from_rpm(60, 4).base_delay, Duration::from_secs(1));
        assert_eq!(RetryPolicy::from_rpm(120, 4).base_delay, Duration::from_millis(500));
        // A zero rate is treated as one request per minute
        assert_eq!(RetryPolicy::from_rpm(0, 4).base_delay, Duration::from_secs(60));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::from_rpm(60, 4);
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert_eq!(policy.backoff(4), Duration::from_secs(8));
    }

    #[test]
    fn test_jitter_bounds() {
        let policy = RetryPolicy::from_rpm(60, 4);
        for attempt in 1..=4 {
            let delay = policy.backoff_with_jitter(attempt);
            assert!(delay >= policy.backoff(attempt));
            assert!(delay < policy.backoff(attempt) + BACKOFF_JITTER);
        }
        for _ in 0..20 {
            let pause = policy.pacing_delay();
            assert!(pause >= policy.base_delay);
            assert!(pause < policy.base_delay + PACING_JITTER);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_target_makes_five_attempts() {
        let fetcher = FlakyFetcher::new(u32::MAX, PAGE);
        let policy = RetryPolicy::from_rpm(60, 4);
        let link = "https://www.ycombinator.com/companies/gone";

        let start = Instant::now();
        let record = scrape_with_retry(&fetcher, link, &policy, &SiteConfig::default()).await;

        assert_eq!(fetcher.calls(), 5);
        assert_eq!(record, CompanyRecord::placeholder(link));

        // 1 + 2 + 4 + 8 seconds of backoff plus up to 0.5s jitter per retry
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(15));
        assert!(elapsed < Duration::from_secs(17));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let fetcher = FlakyFetcher::new(2, PAGE);
        let policy = RetryPolicy::from_rpm(60, 4);
        let link = "https://www.ycombinator.com/companies/acme";

        let record = scrape_with_retry(&fetcher, link, &policy, &SiteConfig::default()).await;

        assert_eq!(fetcher.calls(), 3);
        assert_eq!(record.link, link);
        assert_eq!(record.status.as_deref(), Some("Active"));
        assert_eq!(record.batch.as_deref(), Some("W15"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_makes_single_attempt() {
        let fetcher = FlakyFetcher::new(u32::MAX, PAGE);
        let policy = RetryPolicy::from_rpm(60, 0);

        let record =
            scrape_with_retry(&fetcher, "https://example.com/x", &policy, &SiteConfig::default())
                .await;

        assert_eq!(fetcher.calls(), 1);
        assert!(!record.has_data());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_body_counts_as_failure() {
        let fetcher = FlakyFetcher::new(0, "");
        let policy = RetryPolicy::from_rpm(60, 2);

        let record =
            scrape_with_retry(&fetcher, "https://example.com/x", &policy, &SiteConfig::default())
                .await;

        assert_eq!(fetcher.calls(), 3);
        assert!(!record.has_data());
    }
}
