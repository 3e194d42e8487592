//! Crawler module for warming up URLs
//!
//! This module contains the request side of a warmup run, including:
//! - HTTP client construction shared with the sitemap parser
//! - Crawl strategies that order URLs before dispatch
//! - The bounded-concurrency request pool
//! - Response handlers and the collected results

mod client;
mod handler;
mod pool;
mod progress;
mod result;
mod strategy;

pub use client::{build_http_client, RequestOptions, DEFAULT_USER_AGENT};
pub use handler::{LogHandler, ResponseHandler, ResultCollector};
pub use pool::{ConcurrentCrawler, CrawlerOptions, DEFAULT_CONCURRENCY, MAX_CONCURRENCY};
pub use progress::ProgressHandler;
pub use result::{
    CacheWarmupResult, CrawlFailure, CrawlResponse, CrawlingData, CrawlingResult, CrawlingState,
    FailureKind,
};
pub use strategy::{
    CrawlingStrategy, SortByChangeFrequency, SortByLastModificationDate, SortByPriority,
    StrategyFactory,
};
