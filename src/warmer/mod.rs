//! Cache warmer orchestration
//!
//! This module ties the pieces of a warmup run together:
//! - Recursive sitemap resolution with URI de-duplication
//! - Exclude pattern filtering for sitemaps and URLs
//! - An optional URL limit
//! - Strict or lenient handling of broken sitemaps
//! - Applying a crawl strategy and running the crawler

mod events;
mod exclude;
mod runner;

pub use events::{Listeners, LogListener, WarmupListener};
pub use exclude::{find_match, ExcludePattern, PatternKind};
pub use runner::{run_warmup, WarmupOutcome};

use crate::crawler::{CacheWarmupResult, ConcurrentCrawler, CrawlingStrategy};
use crate::sitemap::{Sitemap, SitemapId, SitemapParser, SitemapTree, Url};
use crate::{SitemapError, SitemapResult};
use std::collections::HashSet;

/// A sitemap that was skipped in lenient mode
#[derive(Debug)]
pub struct FailedSitemap {
    pub sitemap: Sitemap,
    pub error: SitemapError,
}

/// Collects URLs from sitemaps and warms them up
///
/// # Example
///
/// ```no_run
/// use cache_warmer::crawler::{build_http_client, ConcurrentCrawler, CrawlerOptions};
/// use cache_warmer::{CacheWarmer, Sitemap, SitemapParser};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let options = CrawlerOptions::default();
/// let client = build_http_client(&options.request)?;
///
/// let mut warmer = CacheWarmer::new(SitemapParser::new(client.clone()));
/// warmer.add_sitemap(Sitemap::new("https://example.com/sitemap.xml")?).await?;
///
/// let mut crawler = ConcurrentCrawler::new(client, options);
/// let result = warmer.run(&mut crawler, None).await;
/// println!("{} URLs warmed up", result.successful().len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CacheWarmer {
    parser: SitemapParser,
    tree: SitemapTree,
    urls: Vec<Url>,
    seen_urls: HashSet<String>,
    exclude: Vec<ExcludePattern>,
    limit: usize,
    strict: bool,
    failed_sitemaps: Vec<FailedSitemap>,
    excluded_sitemaps: Vec<Sitemap>,
    excluded_urls: Vec<Url>,
    listeners: Listeners,
}

/// Collection sizes recorded before resolving a root sitemap
struct Checkpoint {
    sitemaps: usize,
    urls: usize,
    failed_sitemaps: usize,
    excluded_sitemaps: usize,
    excluded_urls: usize,
}

impl CacheWarmer {
    /// Creates a strict warmer without limit or exclude patterns
    pub fn new(parser: SitemapParser) -> Self {
        Self {
            parser,
            tree: SitemapTree::new(),
            urls: Vec::new(),
            seen_urls: HashSet::new(),
            exclude: Vec::new(),
            limit: 0,
            strict: true,
            failed_sitemaps: Vec::new(),
            excluded_sitemaps: Vec::new(),
            excluded_urls: Vec::new(),
            listeners: Listeners::new(),
        }
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<ExcludePattern>) -> Self {
        self.exclude = patterns;
        self
    }

    /// Maximum number of URLs to collect; 0 means unlimited
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// In strict mode the first broken sitemap aborts resolution
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_listener(mut self, listener: impl WarmupListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Resolves a sitemap and every sitemap it references
    ///
    /// Resolution is depth-first; URLs keep the order of their documents.
    /// Sitemaps already known by URI are never fetched twice.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Resolution finished (in lenient mode, possibly with
    ///   entries in `failed_sitemaps`)
    /// * `Err(SitemapError)` - Strict mode only: a sitemap failed. Everything
    ///   collected since this call started has been discarded.
    pub async fn add_sitemap(&mut self, sitemap: Sitemap) -> SitemapResult<()> {
        if self.limit_reached() {
            tracing::debug!("URL limit reached, skipping sitemap {}", sitemap);
            return Ok(());
        }

        if !self.accept_sitemap(&sitemap) {
            return Ok(());
        }

        let checkpoint = self.checkpoint();
        let mut stack = vec![self.insert_sitemap(sitemap)];

        while let Some(id) = stack.pop() {
            if self.limit_reached() {
                tracing::debug!("URL limit of {} reached, stopping resolution", self.limit);
                break;
            }

            let Some(sitemap) = self.tree.get(id).cloned() else {
                continue;
            };

            match self.parser.parse(&sitemap, id).await {
                Ok(result) => {
                    let (children, urls, _) = result.into_parts();
                    self.listeners
                        .emit(|l| l.sitemap_parsed(&sitemap, children.len(), urls.len()));

                    let mut child_ids = Vec::with_capacity(children.len());
                    for child in children {
                        if self.accept_sitemap(&child) {
                            child_ids.push(self.insert_sitemap(child));
                        }
                    }

                    for url in urls {
                        self.add_url(url);
                    }

                    // Reverse so the first child is resolved next
                    stack.extend(child_ids.into_iter().rev());
                }
                Err(error) => {
                    self.listeners
                        .emit(|l| l.sitemap_parsing_failed(&sitemap, &error));

                    if self.strict {
                        self.rollback(checkpoint);
                        return Err(error);
                    }

                    tracing::warn!("Skipping sitemap {}: {}", sitemap, error);
                    self.failed_sitemaps.push(FailedSitemap { sitemap, error });
                }
            }
        }

        Ok(())
    }

    /// Resolves several root sitemaps in order
    pub async fn add_sitemaps(
        &mut self,
        sitemaps: impl IntoIterator<Item = Sitemap>,
    ) -> SitemapResult<()> {
        for sitemap in sitemaps {
            self.add_sitemap(sitemap).await?;
        }
        Ok(())
    }

    /// Adds a single URL to the crawl list
    ///
    /// # Returns
    ///
    /// `true` if the URL was added; `false` if the limit is reached, the URL
    /// is excluded or it is already known.
    pub fn add_url(&mut self, url: Url) -> bool {
        if self.limit_reached() {
            return false;
        }

        if let Some(pattern) = find_match(&self.exclude, url.as_str()).cloned() {
            self.listeners.emit(|l| l.url_excluded(&url, &pattern));
            self.excluded_urls.push(url);
            return false;
        }

        if !self.seen_urls.insert(url.as_str().to_string()) {
            return false;
        }

        self.listeners.emit(|l| l.url_added(&url));
        self.urls.push(url);
        true
    }

    /// Orders the collected URLs and crawls them
    ///
    /// Without a strategy URLs are crawled in collection order.
    pub async fn run(
        &mut self,
        crawler: &mut ConcurrentCrawler,
        strategy: Option<&dyn CrawlingStrategy>,
    ) -> CacheWarmupResult {
        let urls = match strategy {
            Some(strategy) => {
                tracing::debug!("Applying crawling strategy {}", strategy.name());
                strategy.prepare_urls(self.urls.clone())
            }
            None => self.urls.clone(),
        };

        {
            let crawler: &ConcurrentCrawler = crawler;
            self.listeners.emit(|l| l.crawling_started(&urls, crawler));
        }

        let result = crawler.crawl(&urls).await;

        let crawler: &ConcurrentCrawler = crawler;
        self.listeners.emit(|l| l.crawling_finished(&result, crawler));

        result
    }

    /// Collected URLs in insertion order
    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    /// Every sitemap accepted for fetching, including failed ones
    pub fn sitemaps(&self) -> &SitemapTree {
        &self.tree
    }

    pub fn failed_sitemaps(&self) -> &[FailedSitemap] {
        &self.failed_sitemaps
    }

    pub fn excluded_sitemaps(&self) -> &[Sitemap] {
        &self.excluded_sitemaps
    }

    pub fn excluded_urls(&self) -> &[Url] {
        &self.excluded_urls
    }

    pub fn exclude_patterns(&self) -> &[ExcludePattern] {
        &self.exclude
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    fn limit_reached(&self) -> bool {
        self.limit > 0 && self.urls.len() >= self.limit
    }

    /// Checks exclusion and de-duplication for a sitemap about to be queued
    fn accept_sitemap(&mut self, sitemap: &Sitemap) -> bool {
        if let Some(pattern) = find_match(&self.exclude, sitemap.as_str()).cloned() {
            self.listeners.emit(|l| l.sitemap_excluded(sitemap, &pattern));
            self.excluded_sitemaps.push(sitemap.clone());
            return false;
        }

        if self.tree.contains(sitemap.as_str()) {
            tracing::debug!("Sitemap {} already known, skipping", sitemap);
            return false;
        }

        true
    }

    fn insert_sitemap(&mut self, sitemap: Sitemap) -> SitemapId {
        self.listeners.emit(|l| l.sitemap_added(&sitemap));
        self.tree.insert(sitemap)
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            sitemaps: self.tree.len(),
            urls: self.urls.len(),
            failed_sitemaps: self.failed_sitemaps.len(),
            excluded_sitemaps: self.excluded_sitemaps.len(),
            excluded_urls: self.excluded_urls.len(),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        tracing::debug!(
            "Discarding {} sitemaps and {} URLs collected before the failure",
            self.tree.len().saturating_sub(checkpoint.sitemaps),
            self.urls.len().saturating_sub(checkpoint.urls)
        );

        self.tree.truncate(checkpoint.sitemaps);
        for url in self.urls.drain(checkpoint.urls.min(self.urls.len())..) {
            self.seen_urls.remove(url.as_str());
        }
        self.failed_sitemaps.truncate(checkpoint.failed_sitemaps);
        self.excluded_sitemaps.truncate(checkpoint.excluded_sitemaps);
        self.excluded_urls.truncate(checkpoint.excluded_urls);
    }
}
