//! Integration tests for the request pool
//!
//! These tests use wiremock to create mock HTTP servers and check the
//! concurrency and cancellation behavior of the crawler.

use crate::{client, closed_port_url};
use cache_warmer::crawler::{
    build_http_client, ConcurrentCrawler, CrawlFailure, CrawlResponse, CrawlerOptions,
    FailureKind, RequestOptions, ResponseHandler,
};
use cache_warmer::Url;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Records the path of every completed request in completion order
#[derive(Clone, Default)]
struct CompletionOrder(Arc<Mutex<Vec<String>>>);

impl ResponseHandler for CompletionOrder {
    fn on_success(&mut self, response: &CrawlResponse) {
        self.0.lock().unwrap().push(response.uri.path().to_string());
    }

    fn on_failure(&mut self, failure: &CrawlFailure) {
        self.0.lock().unwrap().push(failure.uri.path().to_string());
    }
}

/// Counts requests between their arrival at the server and their handling
///
/// A request counts as in flight from the moment the server sees it until a
/// handler has seen its outcome, which is when the pool frees its slot.
#[derive(Clone, Default)]
struct InFlightCounter {
    arrived: Arc<AtomicUsize>,
    handled: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl InFlightCounter {
    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Respond for InFlightCounter {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let arrived = self.arrived.fetch_add(1, Ordering::SeqCst) + 1;
        let in_flight = arrived.saturating_sub(self.handled.load(Ordering::SeqCst));
        self.peak.fetch_max(in_flight, Ordering::SeqCst);

        ResponseTemplate::new(200).set_delay(Duration::from_millis(150))
    }
}

impl ResponseHandler for InFlightCounter {
    fn on_success(&mut self, _response: &CrawlResponse) {
        self.handled.fetch_add(1, Ordering::SeqCst);
    }

    fn on_failure(&mut self, _failure: &CrawlFailure) {
        self.handled.fetch_add(1, Ordering::SeqCst);
    }
}

fn urls(base_url: &str, paths: &[&str]) -> Vec<Url> {
    paths
        .iter()
        .map(|p| Url::new(&format!("{}{}", base_url, p)).unwrap())
        .collect()
}

#[tokio::test]
async fn test_all_urls_succeed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let options = CrawlerOptions {
        concurrency: 5,
        ..CrawlerOptions::default()
    };
    let mut crawler = ConcurrentCrawler::new(client(), options);
    let result = crawler
        .crawl(&urls(&mock_server.uri(), &["/a", "/b", "/c"]))
        .await;

    assert!(result.is_successful());
    assert!(!result.was_cancelled());
    assert_eq!(result.successful().len(), 3);
    assert_eq!(result.failed().len(), 0);
}

#[tokio::test]
async fn test_connection_failure_is_recorded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let mut targets = urls(&mock_server.uri(), &["/ok"]);
    targets.push(Url::new(&closed_port_url("/down")).unwrap());

    let mut crawler = ConcurrentCrawler::new(client(), CrawlerOptions::default());
    let result = crawler.crawl(&targets).await;

    assert!(!result.is_successful());
    assert!(!result.was_cancelled());
    assert_eq!(result.successful().len(), 1);
    assert_eq!(result.failed().len(), 1);

    let failure = result.failed()[0].failure().unwrap();
    assert_eq!(failure.uri.path(), "/down");
    assert_eq!(failure.kind, FailureKind::Connection);
}

#[tokio::test]
async fn test_stop_on_failure_cancels_pending_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let mut targets = vec![Url::new(&closed_port_url("/down")).unwrap()];
    targets.extend(urls(&mock_server.uri(), &["/slow1", "/slow2", "/slow3", "/slow4"]));

    let options = CrawlerOptions {
        concurrency: 2,
        stop_on_failure: true,
        ..CrawlerOptions::default()
    };
    let mut crawler = ConcurrentCrawler::new(client(), options);

    let started = Instant::now();
    let result = crawler.crawl(&targets).await;

    assert!(result.was_cancelled());
    assert!(!result.is_successful());
    assert!(result.len() < targets.len());
    assert_eq!(result.failed().len(), 1);
    // In-flight requests were abandoned, not awaited
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_failures_without_stop_on_failure_do_not_cancel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let mut targets = vec![Url::new(&closed_port_url("/down")).unwrap()];
    targets.extend(urls(&mock_server.uri(), &["/a", "/b"]));

    let mut crawler = ConcurrentCrawler::new(client(), CrawlerOptions::default());
    let result = crawler.crawl(&targets).await;

    assert!(!result.was_cancelled());
    assert_eq!(result.len(), 3);
    assert_eq!(result.successful().len(), 2);
}

#[tokio::test]
async fn test_free_slot_is_refilled_immediately() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let order = CompletionOrder::default();
    let options = CrawlerOptions {
        concurrency: 2,
        ..CrawlerOptions::default()
    };
    let mut crawler = ConcurrentCrawler::new(client(), options).with_handler(order.clone());

    let result = crawler
        .crawl(&urls(&mock_server.uri(), &["/slow", "/fast1", "/fast2", "/fast3"]))
        .await;

    assert_eq!(result.successful().len(), 4);

    // The fast requests flow through the second slot while /slow is pending
    let order = order.0.lock().unwrap();
    assert_eq!(order.last().map(String::as_str), Some("/slow"));
}

#[tokio::test]
async fn test_concurrency_ceiling() {
    let mock_server = MockServer::start().await;
    let counter = InFlightCounter::default();

    Mock::given(method("GET"))
        .respond_with(counter.clone())
        .mount(&mock_server)
        .await;

    let options = CrawlerOptions {
        concurrency: 3,
        ..CrawlerOptions::default()
    };
    let mut crawler = ConcurrentCrawler::new(client(), options).with_handler(counter.clone());

    let paths: Vec<String> = (1..=10).map(|i| format!("/{}", i)).collect();
    let paths: Vec<&str> = paths.iter().map(String::as_str).collect();

    let started = Instant::now();
    let result = crawler.crawl(&urls(&mock_server.uri(), &paths)).await;

    assert_eq!(result.successful().len(), 10);
    assert!(counter.peak() <= 3, "peak in flight was {}", counter.peak());
    assert!(counter.peak() > 1);
    // Ten requests through three slots need at least four rounds
    assert!(started.elapsed() >= Duration::from_millis(600));
}

#[tokio::test]
async fn test_request_timeout_is_a_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let options = CrawlerOptions {
        request: RequestOptions {
            timeout: Some(Duration::from_millis(200)),
            ..RequestOptions::default()
        },
        ..CrawlerOptions::default()
    };
    let client = build_http_client(&options.request).unwrap();
    let mut crawler = ConcurrentCrawler::new(client, options);

    let result = crawler.crawl(&urls(&mock_server.uri(), &["/slow"])).await;

    assert_eq!(result.failed().len(), 1);
    assert_eq!(
        result.failed()[0].failure().unwrap().kind,
        FailureKind::Timeout
    );
}

#[tokio::test]
async fn test_custom_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(wiremock::matchers::header("x-cache-warmup", "1"))
        .and(wiremock::matchers::header("user-agent", "Warmer/2.0"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = RequestOptions::default()
        .with_header("X-Cache-Warmup", "1")
        .unwrap()
        .with_header("User-Agent", "Warmer/2.0")
        .unwrap();
    let options = CrawlerOptions {
        request,
        ..CrawlerOptions::default()
    };
    let client = build_http_client(&options.request).unwrap();
    let mut crawler = ConcurrentCrawler::new(client, options);

    let result = crawler.crawl(&urls(&mock_server.uri(), &["/"])).await;

    let response = result.successful()[0].response().unwrap();
    assert_eq!(response.status.as_u16(), 204);
}
