//! Crawl strategies
//!
//! A strategy reorders the resolved URL list before it is handed to the
//! crawler. Strategies are pure: the same input always yields the same output.
//! All built-in strategies use stable sorts, so URLs that compare equal keep
//! their document order.

use crate::sitemap::{ChangeFrequency, Url};
use crate::ValidationError;
use std::cmp::Reverse;

/// Reorders URLs before crawling
pub trait CrawlingStrategy: Send + Sync {
    /// Well-known name used to select this strategy
    fn name(&self) -> &'static str;

    /// Returns the URLs in the order they should be crawled
    fn prepare_urls(&self, urls: Vec<Url>) -> Vec<Url>;
}

/// Highest priority first
#[derive(Debug, Clone, Copy, Default)]
pub struct SortByPriority;

impl SortByPriority {
    pub const NAME: &'static str = "sort-by-priority";
}

impl CrawlingStrategy for SortByPriority {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn prepare_urls(&self, mut urls: Vec<Url>) -> Vec<Url> {
        urls.sort_by(|a, b| b.priority().total_cmp(&a.priority()));
        urls
    }
}

/// Most recently modified first; URLs without a date go last
#[derive(Debug, Clone, Copy, Default)]
pub struct SortByLastModificationDate;

impl SortByLastModificationDate {
    pub const NAME: &'static str = "sort-by-lastmod";
}

impl CrawlingStrategy for SortByLastModificationDate {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn prepare_urls(&self, mut urls: Vec<Url>) -> Vec<Url> {
        // None < Some, so reversing puts undated URLs at the end
        urls.sort_by_key(|url| Reverse(url.last_modified()));
        urls
    }
}

/// Most frequently changing pages first
#[derive(Debug, Clone, Copy, Default)]
pub struct SortByChangeFrequency;

impl SortByChangeFrequency {
    pub const NAME: &'static str = "sort-by-changefreq";

    /// Crawl rank for a change frequency; lower ranks are crawled first
    pub fn rank(frequency: Option<ChangeFrequency>) -> u8 {
        match frequency {
            Some(ChangeFrequency::Always) => 0,
            Some(ChangeFrequency::Hourly) => 10,
            Some(ChangeFrequency::Daily) => 20,
            Some(ChangeFrequency::Weekly) => 30,
            Some(ChangeFrequency::Monthly) => 40,
            Some(ChangeFrequency::Yearly) => 50,
            Some(ChangeFrequency::Never) | None => 100,
        }
    }
}

impl CrawlingStrategy for SortByChangeFrequency {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn prepare_urls(&self, mut urls: Vec<Url>) -> Vec<Url> {
        urls.sort_by_key(|url| Self::rank(url.change_frequency()));
        urls
    }
}

/// Resolves strategies by name
pub struct StrategyFactory;

impl StrategyFactory {
    const NAMES: [&'static str; 3] = [
        SortByPriority::NAME,
        SortByLastModificationDate::NAME,
        SortByChangeFrequency::NAME,
    ];

    /// Returns the strategy registered under `name`
    ///
    /// # Example
    ///
    /// ```
    /// use cache_warmer::crawler::StrategyFactory;
    ///
    /// let strategy = StrategyFactory::get("sort-by-priority").unwrap();
    /// assert_eq!(strategy.name(), "sort-by-priority");
    /// assert!(StrategyFactory::get("sort-by-magic").is_err());
    /// ```
    pub fn get(name: &str) -> Result<Box<dyn CrawlingStrategy>, ValidationError> {
        match name.trim() {
            SortByPriority::NAME => Ok(Box::new(SortByPriority)),
            SortByLastModificationDate::NAME => Ok(Box::new(SortByLastModificationDate)),
            SortByChangeFrequency::NAME => Ok(Box::new(SortByChangeFrequency)),
            other => Err(ValidationError::UnknownCrawlingStrategy(other.to_string())),
        }
    }

    /// All known strategy names
    pub fn names() -> &'static [&'static str] {
        &Self::NAMES
    }

    pub fn has(name: &str) -> bool {
        Self::NAMES.contains(&name.trim())
    }
}
