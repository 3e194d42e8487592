//! Sitemap parser tests against a mock server

use crate::{client, sitemap_index, urlset};
use cache_warmer::sitemap::SitemapTree;
use cache_warmer::{Sitemap, SitemapParser};
use cache_warmer::SitemapError;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_parse_urlset_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let locations: Vec<String> = ["/", "/about", "/contact"]
        .iter()
        .map(|p| format!("{}{}", base_url, p))
        .collect();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(urlset(&locations))
                .insert_header("content-type", "application/xml"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut tree = SitemapTree::new();
    let sitemap = Sitemap::new(&format!("{}/sitemap.xml", base_url)).unwrap();
    let id = tree.insert(sitemap.clone());

    let result = SitemapParser::new(client())
        .parse(&sitemap, id)
        .await
        .expect("Failed to parse sitemap");

    assert!(result.sitemaps().is_empty());
    let urls: Vec<&str> = result.urls().iter().map(|u| u.as_str()).collect();
    assert_eq!(urls, locations.iter().map(String::as_str).collect::<Vec<_>>());
    assert!(result.urls().iter().all(|u| u.origin() == Some(id)));
}

#[tokio::test]
async fn test_parse_sitemap_index_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let body = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap>
    <loc>{}/sitemap-posts.xml</loc>
    <lastmod>2024-03-01T10:00:00+00:00</lastmod>
  </sitemap>
</sitemapindex>"#,
        base_url
    );

    Mock::given(path("/index.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&mock_server)
        .await;

    let mut tree = SitemapTree::new();
    let sitemap = Sitemap::new(&format!("{}/index.xml", base_url)).unwrap();
    let id = tree.insert(sitemap.clone());

    let result = SitemapParser::new(client()).parse(&sitemap, id).await.unwrap();

    assert_eq!(result.sitemaps().len(), 1);
    assert!(result.urls().is_empty());

    let child = &result.sitemaps()[0];
    assert_eq!(child.origin(), Some(id));
    assert_eq!(
        child.last_modified().unwrap().to_rfc3339(),
        "2024-03-01T10:00:00+00:00"
    );
}

#[tokio::test]
async fn test_parse_gzip_sitemap() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let xml = urlset(&[format!("{}/compressed", base_url)]);
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(xml.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    Mock::given(path("/sitemap.xml.gz"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(compressed)
                .insert_header("content-type", "application/x-gzip"),
        )
        .mount(&mock_server)
        .await;

    let mut tree = SitemapTree::new();
    let sitemap = Sitemap::new(&format!("{}/sitemap.xml.gz", base_url)).unwrap();
    let id = tree.insert(sitemap.clone());

    let result = SitemapParser::new(client()).parse(&sitemap, id).await.unwrap();

    assert_eq!(result.urls().len(), 1);
    assert!(result.urls()[0].as_str().ends_with("/compressed"));
}

#[tokio::test]
async fn test_http_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let mut tree = SitemapTree::new();
    let sitemap = Sitemap::new(&format!("{}/missing.xml", mock_server.uri())).unwrap();
    let id = tree.insert(sitemap.clone());

    let error = SitemapParser::new(client())
        .parse(&sitemap, id)
        .await
        .unwrap_err();

    assert!(matches!(error, SitemapError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_malformed_xml() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/broken.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<urlset><url><loc>"))
        .mount(&mock_server)
        .await;

    let mut tree = SitemapTree::new();
    let sitemap = Sitemap::new(&format!("{}/broken.xml", mock_server.uri())).unwrap();
    let id = tree.insert(sitemap.clone());

    let error = SitemapParser::new(client())
        .parse(&sitemap, id)
        .await
        .unwrap_err();

    assert!(matches!(error, SitemapError::MalformedXml { .. }));
}

#[tokio::test]
async fn test_document_without_valid_entries() {
    let mock_server = MockServer::start().await;

    Mock::given(path("/empty-locs.xml"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(sitemap_index(&["".to_string()])),
        )
        .mount(&mock_server)
        .await;

    let mut tree = SitemapTree::new();
    let sitemap = Sitemap::new(&format!("{}/empty-locs.xml", mock_server.uri())).unwrap();
    let id = tree.insert(sitemap.clone());

    let error = SitemapParser::new(client())
        .parse(&sitemap, id)
        .await
        .unwrap_err();

    match error {
        SitemapError::MalformedSitemap { errors, .. } => assert_eq!(errors.len(), 1),
        other => panic!("expected MalformedSitemap, got {:?}", other),
    }
}
