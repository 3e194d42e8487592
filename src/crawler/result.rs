//! Crawl outcome types
//!
//! `CrawlResponse` and `CrawlFailure` describe one completed request as seen by
//! response handlers. `CrawlingResult` is the recorded outcome for one URL and
//! `CacheWarmupResult` aggregates a whole run.

use crate::sitemap::Uri;
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;

/// A request that produced an HTTP response
///
/// Any status code counts as a response; status codes are not interpreted as
/// failures. The body has been fully read so upstream caches can store it.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlResponse {
    /// The requested URL
    pub uri: Uri,

    /// Final URL after redirects
    pub final_uri: Uri,

    /// HTTP status code of the final response
    pub status: StatusCode,

    /// Number of body bytes downloaded
    pub body_size: u64,

    /// Time from sending the request to reading the last body byte
    pub elapsed: Duration,
}

/// Transport-level failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Request or body read timed out
    Timeout,
    /// Connection refused, DNS failure, TLS error
    Connection,
    /// Redirect limit exceeded or redirect loop
    Redirect,
    /// The response body could not be read completely
    Body,
    /// The request task ended without producing a result
    Aborted,
    /// Any other transport error
    Other,
}

impl FailureKind {
    /// Classifies a reqwest error
    pub fn from_error(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connection
        } else if error.is_redirect() {
            Self::Redirect
        } else if error.is_body() || error.is_decode() {
            Self::Body
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connection => "connection",
            Self::Redirect => "redirect",
            Self::Body => "body",
            Self::Aborted => "aborted",
            Self::Other => "other",
        }
    }
}

/// A request that failed at the transport level
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlFailure {
    /// The requested URL
    pub uri: Uri,

    /// Failure classification
    pub kind: FailureKind,

    /// Error description
    pub message: String,

    /// Time until the failure surfaced
    pub elapsed: Duration,
}

impl CrawlFailure {
    pub fn from_error(uri: Uri, error: &reqwest::Error, elapsed: Duration) -> Self {
        Self {
            uri,
            kind: FailureKind::from_error(error),
            message: error.to_string(),
            elapsed,
        }
    }
}

/// Two-state status of a crawled URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlingState {
    Successful,
    Failed,
}

impl CrawlingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Successful => "successful",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload recorded with a crawling result
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlingData {
    Response(CrawlResponse),
    Failure(CrawlFailure),
}

/// Outcome of crawling exactly one URL
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlingResult {
    uri: Uri,
    data: CrawlingData,
}

impl CrawlingResult {
    pub fn successful(response: CrawlResponse) -> Self {
        Self {
            uri: response.uri.clone(),
            data: CrawlingData::Response(response),
        }
    }

    pub fn failed(failure: CrawlFailure) -> Self {
        Self {
            uri: failure.uri.clone(),
            data: CrawlingData::Failure(failure),
        }
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn state(&self) -> CrawlingState {
        match self.data {
            CrawlingData::Response(_) => CrawlingState::Successful,
            CrawlingData::Failure(_) => CrawlingState::Failed,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.state() == CrawlingState::Successful
    }

    pub fn is_failed(&self) -> bool {
        self.state() == CrawlingState::Failed
    }

    pub fn data(&self) -> &CrawlingData {
        &self.data
    }

    /// Returns the HTTP response if the request succeeded
    pub fn response(&self) -> Option<&CrawlResponse> {
        match &self.data {
            CrawlingData::Response(response) => Some(response),
            CrawlingData::Failure(_) => None,
        }
    }

    /// Returns the transport failure if the request failed
    pub fn failure(&self) -> Option<&CrawlFailure> {
        match &self.data {
            CrawlingData::Failure(failure) => Some(failure),
            CrawlingData::Response(_) => None,
        }
    }
}

/// Aggregated outcome of a crawl run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheWarmupResult {
    successful: Vec<CrawlingResult>,
    failed: Vec<CrawlingResult>,
    cancelled: bool,
}

impl CacheWarmupResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files a result into the successful or failed bucket
    pub fn add_result(&mut self, result: CrawlingResult) {
        match result.state() {
            CrawlingState::Successful => self.successful.push(result),
            CrawlingState::Failed => self.failed.push(result),
        }
    }

    pub fn successful(&self) -> &[CrawlingResult] {
        &self.successful
    }

    pub fn failed(&self) -> &[CrawlingResult] {
        &self.failed
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }

    /// A run is successful when no URL failed
    pub fn is_successful(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total number of recorded results
    pub fn len(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends another result; the merged run counts as cancelled if either was
    pub fn merge(&mut self, other: CacheWarmupResult) {
        self.successful.extend(other.successful);
        self.failed.extend(other.failed);
        self.cancelled |= other.cancelled;
    }
}
