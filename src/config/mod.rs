//! Configuration module for yc-harvest
//!
//! Settings come from an optional TOML file; every key has a default so the
//! scraper runs without one. Command-line flags are applied on top by the binary
//! and re-checked with [`validate`].
//!
//! # Example
//!
//! ```no_run
//! use yc_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Rate limit: {} rpm", config.scraper.requests_per_minute);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, HttpConfig, InputConfig, ScraperConfig, SiteConfig, DEFAULT_USER_AGENT,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
