use serde::Deserialize;
use std::time::Duration;

/// Browser-like user agent sent with every page request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Main configuration structure for yc-harvest
///
/// Every section is optional in the TOML file; missing values fall back to the
/// defaults documented on each field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Worker pool and pacing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// Number of concurrent workers (default 8)
    pub concurrency: usize,

    /// Requests per minute per worker (default 120)
    pub requests_per_minute: u32,

    /// Retries after the first failed fetch of a target (default 4)
    pub max_retries: u32,

    /// Timeout for a single fetch attempt, in seconds (default 30)
    pub request_timeout_secs: u64,

    /// Interval between background checkpoint snapshots, in seconds (default 10)
    pub checkpoint_interval_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            requests_per_minute: 120,
            max_retries: 4,
            request_timeout_secs: 30,
            checkpoint_interval_secs: 10,
        }
    }
}

impl ScraperConfig {
    /// Base delay between requests derived from the rate limit (60 / rpm seconds)
    pub fn base_delay(&self) -> Duration {
        Duration::from_secs_f64(60.0 / f64::from(self.requests_per_minute.max(1)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn checkpoint_interval(&self) -> Duration {
        Duration::from_secs(self.checkpoint_interval_secs)
    }
}

/// Description of the site being scraped
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Host of the scraped pages; website links pointing here are discarded
    pub host: String,

    /// Domain of the professional network whose profile links identify founders
    pub professional_network: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            host: "ycombinator.com".to_string(),
            professional_network: "linkedin.com".to_string(),
        }
    }
}

/// Input file layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InputConfig {
    /// Header of the column holding the page links (default "YC Link")
    pub link_column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            link_column: "YC Link".to_string(),
        }
    }
}

/// HTTP client identification
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
