use crate::config::types::{Config, CrawlerConfig};
use crate::crawler::{StrategyFactory, MAX_CONCURRENCY};
use crate::sitemap::validate_uri;
use crate::warmer::ExcludePattern;
use crate::{ConfigError, ValidationError};

/// Validates a complete configuration, including its URL sources
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_sources(config)?;
    validate_settings(config)
}

/// Validates everything except the presence of sitemaps or URLs
///
/// A configuration file may leave the sources to the command line, so this
/// is what loading a file checks.
pub fn validate_settings(config: &Config) -> Result<(), ConfigError> {
    for uri in config.sitemaps.iter().chain(&config.urls) {
        validate_uri(uri)?;
    }

    for pattern in &config.exclude {
        ExcludePattern::new(pattern)?;
    }

    if let Some(strategy) = &config.strategy {
        if !StrategyFactory::has(strategy) {
            return Err(ValidationError::UnknownCrawlingStrategy(strategy.clone()).into());
        }
    }

    validate_crawler_config(&config.crawler)?;

    if let Some(level) = &config.log_level {
        if level.trim().is_empty() {
            return Err(ConfigError::Validation(
                "log_level cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_sources(config: &Config) -> Result<(), ConfigError> {
    if config.sitemaps.is_empty() && config.urls.is_empty() {
        return Err(ConfigError::Validation(
            "at least one sitemap or URL is required".to_string(),
        ));
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.max_redirects > 100 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= 100, got {}",
            config.max_redirects
        )));
    }

    // Surfaces invalid header names or values
    config.request_options()?;

    Ok(())
}
