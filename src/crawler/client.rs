//! HTTP client construction
//!
//! This module builds the `reqwest` client shared by the sitemap parser and the
//! crawler:
//! - Redirects are followed up to a configurable limit
//! - gzip and brotli transfer encodings are decoded transparently
//! - A User-Agent identifying this tool is sent unless one is configured

use crate::ValidationError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// User-Agent sent when the caller doesn't supply one
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Transport options applied to every request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Total time allowed for one request, including the body
    pub timeout: Option<Duration>,

    /// Time allowed to establish a connection
    pub connect_timeout: Option<Duration>,

    /// Maximum number of redirects followed per request
    pub max_redirects: usize,

    /// Extra headers sent with every request
    pub headers: HeaderMap,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            max_redirects: 10,
            headers: HeaderMap::new(),
        }
    }
}

impl RequestOptions {
    /// Adds a header, validating its name and value
    ///
    /// # Examples
    ///
    /// ```
    /// use cache_warmer::crawler::RequestOptions;
    ///
    /// let options = RequestOptions::default()
    ///     .with_header("X-Cache-Warmup", "1")
    ///     .unwrap();
    /// assert!(options.headers.contains_key("x-cache-warmup"));
    /// assert!(RequestOptions::default().with_header("bad header", "1").is_err());
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ValidationError> {
        let header_name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| ValidationError::InvalidOption(format!("header name '{}': {}", name, e)))?;
        let header_value = HeaderValue::from_str(value.trim())
            .map_err(|e| ValidationError::InvalidOption(format!("header '{}' value: {}", name, e)))?;

        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Returns the configured User-Agent, or the default one
    pub fn user_agent(&self) -> HeaderValue {
        self.headers
            .get(USER_AGENT)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_USER_AGENT))
    }

    /// Headers for one request, with the User-Agent always present
    pub fn request_headers(&self) -> HeaderMap {
        let mut headers = self.headers.clone();
        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        }
        headers
    }
}

/// Builds an HTTP client with the given transport options
///
/// # Arguments
///
/// * `options` - Timeouts, redirect limit and default headers
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use cache_warmer::crawler::{build_http_client, RequestOptions};
///
/// let client = build_http_client(&RequestOptions::default()).unwrap();
/// ```
pub fn build_http_client(options: &RequestOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(options.user_agent())
        .default_headers(options.headers.clone())
        .redirect(Policy::limited(options.max_redirects))
        .gzip(true)
        .brotli(true);

    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(connect_timeout) = options.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }

    builder.build()
}
