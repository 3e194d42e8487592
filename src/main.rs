//! Cache-Warmer main entry point
//!
//! This is the command-line interface for the Cache-Warmer sitemap crawler.

use anyhow::{bail, Context};
use cache_warmer::config::{self, load_config, Config};
use cache_warmer::crawler::StrategyFactory;
use cache_warmer::output::{exit_code, render, OutputFormat};
use cache_warmer::warmer::run_warmup;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Cache-Warmer: warm up caches by crawling the URLs of XML sitemaps
///
/// Sitemaps (including sitemap indexes and gzip-compressed sitemaps) are
/// resolved recursively, the collected URLs are optionally filtered, limited
/// and reordered, and then requested with bounded concurrency.
#[derive(Parser, Debug)]
#[command(name = "cache-warmer")]
#[command(version)]
#[command(about = "Warm up caches of URLs listed in XML sitemaps", long_about = None)]
struct Cli {
    /// Sitemap URLs to resolve
    #[arg(value_name = "SITEMAP")]
    sitemaps: Vec<String>,

    /// Additional URL to warm up (repeatable)
    #[arg(short, long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Exclude URLs matching a glob or #regex# pattern (repeatable)
    #[arg(short, long, value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Maximum number of URLs to warm up (0 = unlimited)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Crawling strategy (sort-by-priority, sort-by-lastmod, sort-by-changefreq)
    #[arg(short, long, value_parser = parse_strategy)]
    strategy: Option<String>,

    /// Maximum number of concurrent requests
    #[arg(short = 'n', long)]
    concurrency: Option<usize>,

    /// Request timeout in seconds (0 = no timeout)
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Extra request header as "Name: value" (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// User-Agent header sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Show a progress bar while crawling
    #[arg(short, long)]
    progress: bool,

    /// Exit with status 0 even if URLs failed
    #[arg(long)]
    allow_failures: bool,

    /// Cancel the crawl after the first failed URL
    #[arg(long)]
    stop_on_failure: bool,

    /// Skip broken sitemaps instead of aborting
    #[arg(long)]
    lenient: bool,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Explicit log filter (overrides -v/-q), e.g. "debug"
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_strategy(value: &str) -> Result<String, String> {
    if StrategyFactory::has(value) {
        Ok(value.to_string())
    } else {
        Err(format!(
            "unknown strategy, expected one of: {}",
            StrategyFactory::names().join(", ")
        ))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    merge_cli(&cli, &mut config)?;

    setup_logging(
        cli.verbose,
        cli.quiet,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    )?;

    if let Some(path) = &cli.config {
        tracing::info!("Configuration loaded from: {}", path.display());
    }

    config::validate(&config).context("Invalid configuration")?;

    run(config, cli.verbose > 0).await
}

/// Applies command line values on top of the configuration file
///
/// Scalars from the command line win; lists are appended.
fn merge_cli(cli: &Cli, config: &mut Config) -> anyhow::Result<()> {
    config.sitemaps.extend(cli.sitemaps.iter().cloned());
    config.urls.extend(cli.urls.iter().cloned());
    config.exclude.extend(cli.exclude.iter().cloned());

    if let Some(limit) = cli.limit {
        config.limit = limit;
    }
    if let Some(strategy) = &cli.strategy {
        config.strategy = Some(strategy.clone());
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.timeout = timeout;
    }
    if let Some(user_agent) = &cli.user_agent {
        config.crawler.user_agent = Some(user_agent.clone());
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(log_file) = &cli.log_file {
        config.log_file = Some(log_file.clone());
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = Some(log_level.clone());
    }

    for header in &cli.headers {
        let Some((name, value)) = header.split_once(':') else {
            bail!("Invalid header '{}', expected \"Name: value\"", header);
        };
        config
            .crawler
            .headers
            .insert(name.trim().to_string(), value.trim().to_string());
    }

    config.progress |= cli.progress;
    config.allow_failures |= cli.allow_failures;
    config.stop_on_failure |= cli.stop_on_failure;
    if cli.lenient {
        config.strict = false;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(
    verbose: u8,
    quiet: bool,
    log_level: Option<&str>,
    log_file: Option<&Path>,
) -> anyhow::Result<()> {
    let filter = match log_level {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("Invalid log level '{}'", directive))?,
        None if quiet => EnvFilter::new("error"),
        None => match verbose {
            0 => EnvFilter::new("cache_warmer=info,warn"),
            1 => EnvFilter::new("cache_warmer=debug,info"),
            2 => EnvFilter::new("cache_warmer=trace,debug"),
            _ => EnvFilter::new("trace"),
        },
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

/// Runs the warmup and prints the report
async fn run(config: Config, log_successful: bool) -> anyhow::Result<ExitCode> {
    let outcome = run_warmup(&config, log_successful)
        .await
        .context("Cache warmup failed")?;

    println!("{}", render(&outcome.report, config.format)?);

    Ok(ExitCode::from(exit_code(&outcome.result, config.allow_failures)))
}
