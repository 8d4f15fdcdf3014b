use crate::config::types::{Config, HttpConfig, InputConfig, ScraperConfig, SiteConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_site_config(&config.site)?;
    validate_input_config(&config.input)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates worker pool and pacing settings
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.requests_per_minute < 1 {
        return Err(ConfigError::Validation(format!(
            "requests_per_minute must be >= 1, got {}",
            config.requests_per_minute
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.checkpoint_interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint_interval_secs must be >= 1, got {}",
            config.checkpoint_interval_secs
        )));
    }

    Ok(())
}

fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_domain_string("host", &config.host)?;
    validate_domain_string("professional_network", &config.professional_network)?;
    Ok(())
}

fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.link_column.trim().is_empty() {
        return Err(ConfigError::Validation(
            "link_column cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates a bare domain such as `example.com`
fn validate_domain_string(field: &str, domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "{} '{}' contains invalid characters",
            field, domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::Validation(format!(
            "{} '{}' cannot start or end with '.' or '-'",
            field, domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::Validation(format!(
            "{} '{}' cannot contain consecutive dots",
            field, domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must contain at least one dot (e.g., 'example.com')",
            field, domain
        )));
    }

    Ok(())
}
