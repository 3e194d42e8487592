//! Warmup event listeners
//!
//! Listeners are invoked synchronously, in registration order, at fixed points
//! of a warmup run. They observe only; nothing in the warmer depends on them.

use crate::crawler::{CacheWarmupResult, ConcurrentCrawler};
use crate::sitemap::{Sitemap, Url};
use crate::warmer::ExcludePattern;
use crate::SitemapError;

/// Observer for warmup events
///
/// Every hook has an empty default implementation.
pub trait WarmupListener: Send {
    /// A sitemap was accepted for fetching
    fn sitemap_added(&mut self, _sitemap: &Sitemap) {}

    /// A sitemap was fetched and parsed
    fn sitemap_parsed(&mut self, _sitemap: &Sitemap, _sitemaps: usize, _urls: usize) {}

    /// A sitemap could not be fetched or parsed
    fn sitemap_parsing_failed(&mut self, _sitemap: &Sitemap, _error: &SitemapError) {}

    /// A sitemap was skipped by an exclude pattern
    fn sitemap_excluded(&mut self, _sitemap: &Sitemap, _pattern: &ExcludePattern) {}

    /// A URL was added to the crawl list
    fn url_added(&mut self, _url: &Url) {}

    /// A URL was skipped by an exclude pattern
    fn url_excluded(&mut self, _url: &Url, _pattern: &ExcludePattern) {}

    /// Crawling is about to start
    fn crawling_started(&mut self, _urls: &[Url], _crawler: &ConcurrentCrawler) {}

    /// The crawler has settled
    fn crawling_finished(&mut self, _result: &CacheWarmupResult, _crawler: &ConcurrentCrawler) {}
}

/// Ordered list of listeners
#[derive(Default)]
pub struct Listeners {
    listeners: Vec<Box<dyn WarmupListener>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, listener: Box<dyn WarmupListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Invokes `event` on every listener in registration order
    pub fn emit(&mut self, mut event: impl FnMut(&mut dyn WarmupListener)) {
        for listener in &mut self.listeners {
            event(listener.as_mut());
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// Writes warmup events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogListener;

impl WarmupListener for LogListener {
    fn sitemap_added(&mut self, sitemap: &Sitemap) {
        tracing::debug!("Sitemap added: {}", sitemap);
    }

    fn sitemap_parsed(&mut self, sitemap: &Sitemap, sitemaps: usize, urls: usize) {
        tracing::info!(
            "Sitemap {} parsed: {} child sitemaps, {} URLs",
            sitemap,
            sitemaps,
            urls
        );
    }

    fn sitemap_parsing_failed(&mut self, sitemap: &Sitemap, error: &SitemapError) {
        tracing::warn!("Sitemap {} could not be parsed: {}", sitemap, error);
    }

    fn sitemap_excluded(&mut self, sitemap: &Sitemap, pattern: &ExcludePattern) {
        tracing::info!("Sitemap {} excluded by pattern {}", sitemap, pattern);
    }

    fn url_added(&mut self, url: &Url) {
        tracing::trace!("URL added: {}", url);
    }

    fn url_excluded(&mut self, url: &Url, pattern: &ExcludePattern) {
        tracing::debug!("URL {} excluded by pattern {}", url, pattern);
    }

    fn crawling_started(&mut self, urls: &[Url], crawler: &ConcurrentCrawler) {
        tracing::info!(
            "Warming up {} URLs (concurrency {})",
            urls.len(),
            crawler.options().concurrency
        );
    }

    fn crawling_finished(&mut self, result: &CacheWarmupResult, _crawler: &ConcurrentCrawler) {
        tracing::info!(
            "Warmup finished: {} successful, {} failed",
            result.successful().len(),
            result.failed().len()
        );
    }
}
