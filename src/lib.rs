//! Cache-Warmer: sitemap-driven HTTP cache warming
//!
//! This crate resolves XML sitemaps (including nested sitemap indexes) into a
//! flat, de-duplicated list of URLs and requests them with bounded concurrency,
//! so reverse-proxy and application caches are populated before real traffic
//! arrives.

pub mod config;
pub mod crawler;
pub mod output;
pub mod sitemap;
pub mod warmer;

use thiserror::Error;

/// Main error type for Cache-Warmer operations
#[derive(Debug, Error)]
pub enum WarmupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Sitemap error: {0}")]
    Sitemap(#[from] SitemapError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when user-supplied values are rejected at construction time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("URL must not be empty")]
    EmptyUrl,

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid exclude pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Unknown crawling strategy: {0}")]
    UnknownCrawlingStrategy(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

/// Validation failure of a single `<sitemap>` or `<url>` node
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("node #{index}: missing <loc>")]
    MissingLoc { index: usize },

    #[error("node #{index}: {source}")]
    InvalidLoc {
        index: usize,
        source: ValidationError,
    },

    #[error("node #{index}: unknown change frequency '{value}'")]
    UnknownChangeFrequency { index: usize, value: String },

    #[error("document root <{name}> is neither <urlset> nor <sitemapindex>")]
    UnexpectedRoot { name: String },
}

/// Errors raised while fetching or decoding one sitemap document
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Failed to fetch sitemap {url}: {source}")]
    Fetch {
        url: String,
        source: reqwest::Error,
    },

    #[error("Sitemap {url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to decompress sitemap {url}: {source}")]
    Decompress {
        url: String,
        source: std::io::Error,
    },

    #[error("Malformed XML in sitemap {url}: {message}")]
    MalformedXml { url: String, message: String },

    #[error("Malformed sitemap {url}: {}", format_node_errors(.errors))]
    MalformedSitemap { url: String, errors: Vec<NodeError> },
}

impl SitemapError {
    /// Returns the URL of the sitemap this error belongs to
    pub fn url(&self) -> &str {
        match self {
            Self::Fetch { url, .. }
            | Self::Status { url, .. }
            | Self::Decompress { url, .. }
            | Self::MalformedXml { url, .. }
            | Self::MalformedSitemap { url, .. } => url,
        }
    }
}

fn format_node_errors(errors: &[NodeError]) -> String {
    if errors.is_empty() {
        return "no recognizable entries".to_string();
    }

    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
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

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Result type alias for Cache-Warmer operations
pub type Result<T> = std::result::Result<T, WarmupError>;

/// Result type alias for sitemap operations
pub type SitemapResult<T> = std::result::Result<T, SitemapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CacheWarmupResult, ConcurrentCrawler, CrawlingResult};
pub use sitemap::{Sitemap, SitemapParser, Url};
pub use warmer::{CacheWarmer, ExcludePattern};
