use crate::crawler::{
    CrawlerOptions, CrawlingStrategy, RequestOptions, StrategyFactory, DEFAULT_CONCURRENCY,
};
use crate::output::OutputFormat;
use crate::sitemap::{Sitemap, Url};
use crate::warmer::ExcludePattern;
use crate::ValidationError;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Cache-Warmer
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Root sitemap URLs to resolve
    pub sitemaps: Vec<String>,

    /// Additional URLs to warm up
    pub urls: Vec<String>,

    /// Exclude patterns (glob or `#regex#`)
    pub exclude: Vec<String>,

    /// Maximum number of URLs to warm up; 0 means unlimited
    pub limit: usize,

    /// Name of the crawling strategy
    pub strategy: Option<String>,

    /// Report format
    pub format: OutputFormat,

    /// Show a progress bar while crawling
    pub progress: bool,

    /// Exit successfully even if URLs failed
    pub allow_failures: bool,

    /// Cancel the crawl after the first failed URL
    pub stop_on_failure: bool,

    /// Abort on the first broken sitemap
    pub strict: bool,

    /// Write logs to this file instead of stderr
    pub log_file: Option<PathBuf>,

    /// Explicit log filter directive, e.g. `debug` or `cache_warmer=trace`
    pub log_level: Option<String>,

    pub crawler: CrawlerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sitemaps: Vec::new(),
            urls: Vec::new(),
            exclude: Vec::new(),
            limit: 0,
            strategy: None,
            format: OutputFormat::default(),
            progress: false,
            allow_failures: false,
            stop_on_failure: false,
            strict: true,
            log_file: None,
            log_level: None,
            crawler: CrawlerConfig::default(),
        }
    }
}

/// Request pool configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Maximum number of concurrent requests
    pub concurrency: usize,

    /// Request timeout in seconds; 0 disables the timeout
    pub timeout: u64,

    /// Connect timeout in seconds; 0 disables the timeout
    pub connect_timeout: u64,

    /// Maximum number of redirects followed per request
    pub max_redirects: usize,

    /// Extra request headers
    pub headers: BTreeMap<String, String>,

    /// User-Agent header; overrides a `User-Agent` entry in `headers`
    pub user_agent: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: 30,
            connect_timeout: 10,
            max_redirects: 10,
            headers: BTreeMap::new(),
            user_agent: None,
        }
    }
}

fn seconds(value: u64) -> Option<Duration> {
    (value > 0).then(|| Duration::from_secs(value))
}

impl CrawlerConfig {
    /// Builds transport options, validating every header
    pub fn request_options(&self) -> Result<RequestOptions, ValidationError> {
        let mut options = RequestOptions {
            timeout: seconds(self.timeout),
            connect_timeout: seconds(self.connect_timeout),
            max_redirects: self.max_redirects,
            ..RequestOptions::default()
        };

        for (name, value) in &self.headers {
            options = options.with_header(name, value)?;
        }

        if let Some(user_agent) = &self.user_agent {
            options = options.with_header(USER_AGENT.as_str(), user_agent)?;
        }

        Ok(options)
    }
}

impl Config {
    /// Builds crawler options from the `[crawler]` table and top-level flags
    pub fn crawler_options(&self) -> Result<CrawlerOptions, ValidationError> {
        let options = CrawlerOptions {
            concurrency: self.crawler.concurrency,
            stop_on_failure: self.stop_on_failure,
            request: self.crawler.request_options()?,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn exclude_patterns(&self) -> Result<Vec<ExcludePattern>, ValidationError> {
        ExcludePattern::compile_all(self.exclude.as_slice())
    }

    /// Resolves the configured strategy, if any
    pub fn crawling_strategy(&self) -> Result<Option<Box<dyn CrawlingStrategy>>, ValidationError> {
        self.strategy.as_deref().map(StrategyFactory::get).transpose()
    }

    pub fn root_sitemaps(&self) -> Result<Vec<Sitemap>, ValidationError> {
        self.sitemaps.iter().map(|s| Sitemap::new(s)).collect()
    }

    pub fn extra_urls(&self) -> Result<Vec<Url>, ValidationError> {
        self.urls.iter().map(|u| Url::new(u)).collect()
    }
}
