//! yc-harvest: a resumable, rate-limited company page scraper
//!
//! This crate fetches a list of company profile pages, extracts structured fields
//! from the embedded page-state JSON (falling back to HTML heuristics), and hands
//! the ordered results to a CSV exporter. Fetching runs on a bounded worker pool
//! with per-worker pacing, exponential backoff and periodic checkpoints.

pub mod checkpoint;
pub mod config;
pub mod extract;
pub mod input;
pub mod output;
pub mod pipeline;

use thiserror::Error;

/// Main error type for yc-harvest operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input error: {0}")]
    Input(#[from] input::InputError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] checkpoint::CheckpointError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for yc-harvest operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{CompanyRecord, ExtractedFields};
pub use input::Target;
pub use pipeline::{run_scrape, ScrapeOutcome};
