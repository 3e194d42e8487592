//! Bounded-concurrency request pool
//!
//! The pool keeps at most `concurrency` requests in flight. Each completed
//! request frees its slot only after every handler has seen the outcome, and
//! the next queued URL is dispatched right away (sliding window, no batches).
//! Handlers run on the task driving `crawl`, one outcome at a time.

use crate::crawler::{
    CacheWarmupResult, CrawlFailure, CrawlResponse, CrawlingData, CrawlingResult, FailureKind,
    RequestOptions, ResponseHandler, ResultCollector,
};
use crate::sitemap::{Uri, Url};
use crate::ValidationError;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::task::{self, JoinSet};

/// Default number of requests in flight
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Upper bound accepted for `concurrency`
pub const MAX_CONCURRENCY: usize = 100;

/// Crawler configuration
#[derive(Debug, Clone)]
pub struct CrawlerOptions {
    /// Maximum number of requests in flight
    pub concurrency: usize,

    /// Cancel pending requests after the first transport failure
    pub stop_on_failure: bool,

    /// Transport options for every request
    pub request: RequestOptions,
}

impl Default for CrawlerOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            stop_on_failure: false,
            request: RequestOptions::default(),
        }
    }
}

impl CrawlerOptions {
    /// Checks that the options describe a usable pool
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(ValidationError::InvalidOption(format!(
                "concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY, self.concurrency
            )));
        }
        Ok(())
    }
}

/// Sends one GET request per URL through a bounded pool
///
/// Transport errors never escape `crawl`; they become failed entries in the
/// returned `CacheWarmupResult`. HTTP status codes are not interpreted.
///
/// # Example
///
/// ```no_run
/// use cache_warmer::crawler::{build_http_client, ConcurrentCrawler, CrawlerOptions, LogHandler};
/// use cache_warmer::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let options = CrawlerOptions::default();
/// let client = build_http_client(&options.request)?;
/// let mut crawler = ConcurrentCrawler::new(client, options).with_handler(LogHandler::new());
///
/// let urls = vec![Url::new("https://example.com/")?];
/// let result = crawler.crawl(&urls).await;
/// assert_eq!(result.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct ConcurrentCrawler {
    client: Client,
    options: CrawlerOptions,
    handlers: Vec<Box<dyn ResponseHandler>>,
}

impl ConcurrentCrawler {
    pub fn new(client: Client, options: CrawlerOptions) -> Self {
        Self {
            client,
            options,
            handlers: Vec::new(),
        }
    }

    /// Registers a handler; handlers are called in registration order
    pub fn with_handler(mut self, handler: impl ResponseHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn add_handler(&mut self, handler: Box<dyn ResponseHandler>) {
        self.handlers.push(handler);
    }

    pub fn options(&self) -> &CrawlerOptions {
        &self.options
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Crawls the URLs in the given order
    ///
    /// # Arguments
    ///
    /// * `urls` - URLs in dispatch order
    ///
    /// # Returns
    ///
    /// The collected outcomes. When stop-on-failure triggers, only outcomes
    /// that completed before the failure (plus the failure itself) are kept
    /// and the result is flagged as cancelled.
    pub async fn crawl(&mut self, urls: &[Url]) -> CacheWarmupResult {
        let concurrency = self.options.concurrency.max(1);
        let headers = self.options.request.request_headers();

        tracing::info!(
            "Crawling {} URLs with concurrency {}",
            urls.len(),
            concurrency
        );

        let mut collector = ResultCollector::new();
        let mut queue = urls.iter().map(|url| url.uri().clone());
        let mut tasks = JoinSet::new();
        let mut in_flight: HashMap<task::Id, Uri> = HashMap::new();
        let mut cancelled = false;

        loop {
            while tasks.len() < concurrency {
                let Some(uri) = queue.next() else {
                    break;
                };

                tracing::debug!("Dispatching {}", uri);
                let handle = tasks.spawn(fetch(self.client.clone(), uri.clone(), headers.clone()));
                in_flight.insert(handle.id(), uri);
            }

            let Some(joined) = tasks.join_next_with_id().await else {
                break;
            };

            let result = match joined {
                Ok((id, result)) => {
                    in_flight.remove(&id);
                    result
                }
                Err(error) => match in_flight.remove(&error.id()) {
                    Some(uri) => CrawlingResult::failed(CrawlFailure {
                        uri,
                        kind: FailureKind::Aborted,
                        message: error.to_string(),
                        elapsed: Duration::ZERO,
                    }),
                    None => continue,
                },
            };

            let failed = result.is_failed();
            self.dispatch(&mut collector, &result);

            if failed && self.options.stop_on_failure {
                tracing::warn!(
                    "Stopping crawl after failure of {}: {} in flight, {} queued requests abandoned",
                    result.uri(),
                    tasks.len(),
                    queue.len()
                );
                cancelled = true;
                tasks.abort_all();
                // Late completions are discarded
                while tasks.join_next().await.is_some() {}
                break;
            }
        }

        let mut result = collector.into_result();
        result.set_cancelled(cancelled);

        for handler in &mut self.handlers {
            handler.on_finished(&result);
        }

        result
    }

    fn dispatch(&mut self, collector: &mut ResultCollector, result: &CrawlingResult) {
        match result.data() {
            CrawlingData::Response(response) => {
                collector.on_success(response);
                for handler in &mut self.handlers {
                    handler.on_success(response);
                }
            }
            CrawlingData::Failure(failure) => {
                collector.on_failure(failure);
                for handler in &mut self.handlers {
                    handler.on_failure(failure);
                }
            }
        }
    }
}

impl std::fmt::Debug for ConcurrentCrawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentCrawler")
            .field("options", &self.options)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Sends one GET request and drains the body
async fn fetch(client: Client, uri: Uri, headers: HeaderMap) -> CrawlingResult {
    let started = Instant::now();

    let mut response = match client.get(uri.clone()).headers(headers).send().await {
        Ok(response) => response,
        Err(error) => {
            return CrawlingResult::failed(CrawlFailure::from_error(uri, &error, started.elapsed()));
        }
    };

    let status = response.status();
    let final_uri = response.url().clone();
    let mut body_size: u64 = 0;

    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => body_size += chunk.len() as u64,
            Ok(None) => break,
            Err(error) => {
                let mut failure = CrawlFailure::from_error(uri, &error, started.elapsed());
                if failure.kind == FailureKind::Other {
                    failure.kind = FailureKind::Body;
                }
                return CrawlingResult::failed(failure);
            }
        }
    }

    CrawlingResult::successful(CrawlResponse {
        uri,
        final_uri,
        status,
        body_size,
        elapsed: started.elapsed(),
    })
}
