//! Recursive sitemap resolution and end-to-end warmup tests

use crate::{client, sitemap_index, urlset};
use cache_warmer::config::Config;
use cache_warmer::crawler::{ConcurrentCrawler, CrawlerOptions, SortByPriority};
use cache_warmer::warmer::run_warmup;
use cache_warmer::{CacheWarmer, ExcludePattern, Sitemap, SitemapError, SitemapParser};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_xml(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}

fn locations(base_url: &str, paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| format!("{}{}", base_url, p)).collect()
}

fn warmer() -> CacheWarmer {
    CacheWarmer::new(SitemapParser::new(client()))
}

fn paths_of(warmer: &CacheWarmer) -> Vec<String> {
    warmer
        .urls()
        .iter()
        .map(|u| u.uri().path().to_string())
        .collect()
}

#[tokio::test]
async fn test_recursive_resolution_keeps_document_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_xml(
        &mock_server,
        "/sitemap_index.xml",
        sitemap_index(&locations(&base_url, &["/sitemap-a.xml", "/sitemap-b.xml"])),
    )
    .await;
    mount_xml(
        &mock_server,
        "/sitemap-a.xml",
        urlset(&locations(&base_url, &["/a1", "/a2"])),
    )
    .await;
    mount_xml(
        &mock_server,
        "/sitemap-b.xml",
        urlset(&locations(&base_url, &["/b1", "/a1"])),
    )
    .await;

    let mut warmer = warmer();
    let root = Sitemap::new(&format!("{}/sitemap_index.xml", base_url)).unwrap();
    warmer.add_sitemap(root).await.unwrap();

    // /a1 appears twice but is kept once
    assert_eq!(paths_of(&warmer), vec!["/a1", "/a2", "/b1"]);
    assert_eq!(warmer.sitemaps().len(), 3);

    let tree = warmer.sitemaps();
    let root_id = tree.find(&format!("{}/sitemap_index.xml", base_url)).unwrap();
    for url in warmer.urls() {
        assert_eq!(tree.root_origin_of(url), Some(root_id));
    }
}

#[tokio::test]
async fn test_self_referencing_index_is_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(path("/loop.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_index(&locations(
            &base_url,
            &["/loop.xml", "/pages.xml"],
        ))))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(path("/pages.xml"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(urlset(&locations(&base_url, &["/page"]))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut warmer = warmer();
    warmer
        .add_sitemap(Sitemap::new(&format!("{}/loop.xml", base_url)).unwrap())
        .await
        .unwrap();

    assert_eq!(paths_of(&warmer), vec!["/page"]);
    assert_eq!(warmer.sitemaps().len(), 2);
}

#[tokio::test]
async fn test_exclude_patterns_filter_urls_and_sitemaps() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_xml(
        &mock_server,
        "/index.xml",
        sitemap_index(&locations(&base_url, &["/pages.xml", "/private.xml"])),
    )
    .await;
    mount_xml(
        &mock_server,
        "/pages.xml",
        urlset(&locations(&base_url, &["/public", "/admin/login", "/docs.pdf"])),
    )
    .await;
    Mock::given(path("/private.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let patterns = ExcludePattern::compile_all(&["*private*", "*/admin/*", "#\\.PDF$#i"]).unwrap();
    let mut warmer = warmer().with_exclude_patterns(patterns);
    warmer
        .add_sitemap(Sitemap::new(&format!("{}/index.xml", base_url)).unwrap())
        .await
        .unwrap();

    assert_eq!(paths_of(&warmer), vec!["/public"]);
    assert_eq!(warmer.excluded_urls().len(), 2);
    assert_eq!(warmer.excluded_sitemaps().len(), 1);
}

#[tokio::test]
async fn test_strict_mode_discards_partial_results() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_xml(
        &mock_server,
        "/index.xml",
        sitemap_index(&locations(&base_url, &["/good.xml", "/broken.xml"])),
    )
    .await;
    mount_xml(
        &mock_server,
        "/good.xml",
        urlset(&locations(&base_url, &["/one", "/two"])),
    )
    .await;
    Mock::given(path("/broken.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut warmer = warmer();
    let error = warmer
        .add_sitemap(Sitemap::new(&format!("{}/index.xml", base_url)).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(error, SitemapError::Status { status: 500, .. }));
    assert!(error.url().ends_with("/broken.xml"));
    assert!(warmer.urls().is_empty());
    assert!(warmer.sitemaps().is_empty());
}

#[tokio::test]
async fn test_lenient_mode_skips_broken_sitemaps() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_xml(
        &mock_server,
        "/index.xml",
        sitemap_index(&locations(&base_url, &["/broken.xml", "/good.xml"])),
    )
    .await;
    mount_xml(
        &mock_server,
        "/broken.xml",
        "<html><body>Not a sitemap</body></html>".to_string(),
    )
    .await;
    mount_xml(
        &mock_server,
        "/good.xml",
        urlset(&locations(&base_url, &["/one"])),
    )
    .await;

    let mut warmer = warmer().strict(false);
    warmer
        .add_sitemap(Sitemap::new(&format!("{}/index.xml", base_url)).unwrap())
        .await
        .unwrap();

    assert_eq!(paths_of(&warmer), vec!["/one"]);
    assert_eq!(warmer.failed_sitemaps().len(), 1);
    assert!(matches!(
        warmer.failed_sitemaps()[0].error,
        SitemapError::MalformedSitemap { .. }
    ));
}

#[tokio::test]
async fn test_limit_stops_resolution() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_xml(
        &mock_server,
        "/index.xml",
        sitemap_index(&locations(&base_url, &["/first.xml", "/second.xml"])),
    )
    .await;
    mount_xml(
        &mock_server,
        "/first.xml",
        urlset(&locations(&base_url, &["/1", "/2", "/3"])),
    )
    .await;
    Mock::given(path("/second.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut warmer = warmer().with_limit(2);
    warmer
        .add_sitemap(Sitemap::new(&format!("{}/index.xml", base_url)).unwrap())
        .await
        .unwrap();

    assert_eq!(paths_of(&warmer), vec!["/1", "/2"]);
}

#[tokio::test]
async fn test_run_applies_strategy() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let body = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{0}/low</loc><priority>0.2</priority></url>
  <url><loc>{0}/high</loc><priority>0.9</priority></url>
  <url><loc>{0}/default</loc></url>
</urlset>"#,
        base_url
    );
    mount_xml(&mock_server, "/sitemap.xml", body).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let mut warmer = warmer();
    warmer
        .add_sitemap(Sitemap::new(&format!("{}/sitemap.xml", base_url)).unwrap())
        .await
        .unwrap();

    let options = CrawlerOptions {
        concurrency: 1,
        ..CrawlerOptions::default()
    };
    let mut crawler = ConcurrentCrawler::new(client(), options);
    let result = warmer.run(&mut crawler, Some(&SortByPriority)).await;

    assert!(result.is_successful());
    let crawled: Vec<&str> = result
        .successful()
        .iter()
        .map(|r| r.uri().path())
        .collect();
    assert_eq!(crawled, vec!["/high", "/default", "/low"]);
}

#[tokio::test]
async fn test_run_warmup_from_config() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_xml(
        &mock_server,
        "/sitemap.xml",
        urlset(&locations(&base_url, &["/a", "/b", "/skip-me"])),
    )
    .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = Config {
        sitemaps: vec![format!("{}/sitemap.xml", base_url)],
        urls: vec![format!("{}/extra", base_url)],
        exclude: vec!["*skip*".to_string()],
        ..Config::default()
    };

    let outcome = run_warmup(&config, false).await.unwrap();

    assert!(outcome.result.is_successful());
    assert_eq!(outcome.result.successful().len(), 3);
    assert!(outcome.report.success);
    assert_eq!(outcome.report.excluded.urls.len(), 1);
}
