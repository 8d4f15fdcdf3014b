//! Run statistics
//!
//! Counts collected by the coordinator while assembling the final records,
//! plus wall-clock timestamps for the run.

use crate::extract::CompanyRecord;
use chrono::{DateTime, Utc};

/// Summary of one scrape run
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    /// Number of targets loaded from the input
    pub total_targets: usize,

    /// Targets answered from a previous checkpoint
    pub resumed: usize,

    /// Targets processed by the worker pool in this run
    pub scraped: usize,

    /// Output rows with at least one field besides the link
    pub with_data: usize,

    /// Output rows holding only the link
    pub placeholders: usize,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunStats {
    /// Tallies the final records of a run
    pub fn collect(
        records: &[CompanyRecord],
        resumed: usize,
        scraped: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        let with_data = records.iter().filter(|r| r.has_data()).count();
        Self {
            total_targets: records.len(),
            resumed,
            scraped,
            with_data,
            placeholders: records.len() - with_data,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Wall-clock duration of the run in seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Share of output rows that carry data, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_targets > 0 {
            (self.with_data as f64 / self.total_targets as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &RunStats) {
    println!("=== Scrape Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    println!("  Finished: {}", stats.finished_at.to_rfc3339());
    let duration = stats.duration_seconds();
    println!(
        "  Duration: {} seconds ({:.2} minutes)",
        duration,
        duration as f64 / 60.0
    );
    println!();

    println!("Targets:");
    println!("  Total: {}", stats.total_targets);
    println!("  Resumed from checkpoint: {}", stats.resumed);
    println!("  Scraped this run: {}", stats.scraped);
    println!();

    println!("Results:");
    println!("  With data: {}", stats.with_data);
    println!("  Link only: {}", stats.placeholders);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} rows with data)",
        stats.success_rate(),
        stats.with_data,
        stats.total_targets
    );
}
