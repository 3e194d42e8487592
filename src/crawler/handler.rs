//! Response handlers
//!
//! Handlers are invoked by the crawler once per completed URL, in registration
//! order, on the task driving the pool. They never run concurrently with each
//! other, so they may keep plain mutable state.

use crate::crawler::{CacheWarmupResult, CrawlFailure, CrawlResponse, CrawlingResult};

/// Receives the outcome of every completed request
pub trait ResponseHandler: Send {
    /// Called when a request produced an HTTP response (any status code)
    fn on_success(&mut self, response: &CrawlResponse);

    /// Called when a request failed at the transport level
    fn on_failure(&mut self, failure: &CrawlFailure);

    /// Called once after the pool has settled
    fn on_finished(&mut self, _result: &CacheWarmupResult) {}
}

/// Collects every outcome into a `CacheWarmupResult`
#[derive(Debug, Default)]
pub struct ResultCollector {
    result: CacheWarmupResult,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn result(&self) -> &CacheWarmupResult {
        &self.result
    }

    pub fn into_result(self) -> CacheWarmupResult {
        self.result
    }
}

impl ResponseHandler for ResultCollector {
    fn on_success(&mut self, response: &CrawlResponse) {
        self.result
            .add_result(CrawlingResult::successful(response.clone()));
    }

    fn on_failure(&mut self, failure: &CrawlFailure) {
        self.result.add_result(CrawlingResult::failed(failure.clone()));
    }
}

/// Writes one log line per completed request
#[derive(Debug, Clone, Default)]
pub struct LogHandler {
    log_successful: bool,
}

impl LogHandler {
    /// Creates a handler that only logs failures
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log successful requests
    pub fn with_successful(mut self, log_successful: bool) -> Self {
        self.log_successful = log_successful;
        self
    }
}

impl ResponseHandler for LogHandler {
    fn on_success(&mut self, response: &CrawlResponse) {
        if self.log_successful {
            tracing::info!(
                url = %response.uri,
                status = response.status.as_u16(),
                elapsed_ms = response.elapsed.as_millis() as u64,
                "URL warmed up"
            );
        }
    }

    fn on_failure(&mut self, failure: &CrawlFailure) {
        tracing::error!(
            url = %failure.uri,
            kind = failure.kind.as_str(),
            "Error while warming up URL: {}",
            failure.message
        );
    }

    fn on_finished(&mut self, result: &CacheWarmupResult) {
        tracing::info!(
            "Crawl finished: {} successful, {} failed{}",
            result.successful().len(),
            result.failed().len(),
            if result.was_cancelled() { " (cancelled)" } else { "" }
        );
    }
}
