//! Integration tests for Cache-Warmer
//!
//! These tests use wiremock to create mock HTTP servers and exercise sitemap
//! resolution and crawling end-to-end.

mod crawl_tests;
mod sitemap_tests;
mod warmer_tests;

use cache_warmer::crawler::{build_http_client, RequestOptions};
use reqwest::Client;

/// Builds a client with default options
pub fn client() -> Client {
    build_http_client(&RequestOptions::default()).expect("Failed to build HTTP client")
}

/// Renders a `<urlset>` document with one `<url>` per location
pub fn urlset(locations: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for loc in locations {
        xml.push_str(&format!("\n  <url><loc>{}</loc></url>", loc));
    }
    xml.push_str("\n</urlset>\n");
    xml
}

/// Renders a `<sitemapindex>` document with one `<sitemap>` per location
pub fn sitemap_index(locations: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for loc in locations {
        xml.push_str(&format!("\n  <sitemap><loc>{}</loc></sitemap>", loc));
    }
    xml.push_str("\n</sitemapindex>\n");
    xml
}

/// Returns a URL on localhost whose port refuses connections
pub fn closed_port_url(path: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    format!("http://127.0.0.1:{}{}", port, path)
}
