use crate::config::Config;
use crate::crawler::{build_http_client, CacheWarmupResult, ConcurrentCrawler, LogHandler, ProgressHandler};
use crate::output::WarmupReport;
use crate::sitemap::SitemapParser;
use crate::warmer::{CacheWarmer, LogListener};
use crate::Result;
use chrono::Utc;

/// Outcome of a complete warmup run
#[derive(Debug)]
pub struct WarmupOutcome {
    pub result: CacheWarmupResult,
    pub report: WarmupReport,
}

/// Runs a complete warmup from a validated configuration
///
/// This is the main entry point for a warmup. It will:
/// 1. Build the shared HTTP client
/// 2. Add the configured URLs
/// 3. Resolve the configured sitemaps
/// 4. Order the URLs with the configured strategy
/// 5. Crawl them and build the report
///
/// # Arguments
///
/// * `config` - The warmup configuration
/// * `log_successful` - Log a line for every successful URL, not only failures
///
/// # Returns
///
/// * `Ok(WarmupOutcome)` - The crawl ran; individual URLs may still have failed
/// * `Err(WarmupError)` - Invalid configuration, or a sitemap failed in strict mode
pub async fn run_warmup(config: &Config, log_successful: bool) -> Result<WarmupOutcome> {
    let started_at = Utc::now();
    let options = config.crawler_options()?;
    let client = build_http_client(&options.request)?;

    let mut warmer = CacheWarmer::new(SitemapParser::new(client.clone()))
        .with_exclude_patterns(config.exclude_patterns()?)
        .with_limit(config.limit)
        .strict(config.strict)
        .with_listener(LogListener);

    for url in config.extra_urls()? {
        warmer.add_url(url);
    }

    warmer.add_sitemaps(config.root_sitemaps()?).await?;

    tracing::info!(
        "Collected {} URLs from {} sitemaps ({} excluded, {} sitemaps skipped)",
        warmer.urls().len(),
        warmer.sitemaps().len(),
        warmer.excluded_urls().len(),
        warmer.failed_sitemaps().len()
    );

    let strategy = config.crawling_strategy()?;

    let mut crawler = ConcurrentCrawler::new(client, options)
        .with_handler(LogHandler::new().with_successful(log_successful));
    if config.progress {
        crawler.add_handler(Box::new(ProgressHandler::new(warmer.urls().len() as u64)));
    }

    let result = warmer.run(&mut crawler, strategy.as_deref()).await;
    let report = WarmupReport::from_result(&result)
        .with_warmer(&warmer)
        .with_run_times(started_at, Utc::now());

    Ok(WarmupOutcome { result, report })
}
