//! Serializable warmup report
//!
//! The report flattens a `CacheWarmupResult` (and optionally the warmer's
//! exclusion and failure bookkeeping) into plain strings and numbers so it can
//! be rendered as text or JSON.

use crate::crawler::CacheWarmupResult;
use crate::warmer::CacheWarmer;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of a whole warmup run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WarmupReport {
    /// No URL failed
    pub success: bool,

    /// The crawl stopped early after a failure
    pub cancelled: bool,

    pub urls: UrlReport,

    pub excluded: ExcludedReport,

    /// Sitemaps skipped in lenient mode
    pub failed_sitemaps: Vec<FailedSitemapEntry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Crawled URLs split by outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UrlReport {
    pub successful: Vec<SuccessEntry>,
    pub failed: Vec<FailureEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessEntry {
    pub url: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_to: Option<String>,
    pub bytes: u64,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureEntry {
    pub url: String,
    pub kind: String,
    pub message: String,
    pub elapsed_ms: u64,
}

/// Items dropped by exclude patterns
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExcludedReport {
    pub sitemaps: Vec<String>,
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedSitemapEntry {
    pub url: String,
    pub error: String,
}

impl WarmupReport {
    /// Builds a report from a crawl result alone
    pub fn from_result(result: &CacheWarmupResult) -> Self {
        let successful = result
            .successful()
            .iter()
            .filter_map(|entry| entry.response())
            .map(|response| SuccessEntry {
                url: response.uri.to_string(),
                status: response.status.as_u16(),
                redirected_to: (response.final_uri != response.uri)
                    .then(|| response.final_uri.to_string()),
                bytes: response.body_size,
                elapsed_ms: response.elapsed.as_millis() as u64,
            })
            .collect();

        let failed = result
            .failed()
            .iter()
            .filter_map(|entry| entry.failure())
            .map(|failure| FailureEntry {
                url: failure.uri.to_string(),
                kind: failure.kind.as_str().to_string(),
                message: failure.message.clone(),
                elapsed_ms: failure.elapsed.as_millis() as u64,
            })
            .collect();

        Self {
            success: result.is_successful(),
            cancelled: result.was_cancelled(),
            urls: UrlReport { successful, failed },
            excluded: ExcludedReport::default(),
            failed_sitemaps: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Records when the run started and finished
    pub fn with_run_times(mut self, started: DateTime<Utc>, finished: DateTime<Utc>) -> Self {
        self.started_at = Some(started);
        self.finished_at = Some(finished);
        self
    }

    /// Wall-clock duration of the run, if its times were recorded
    pub fn duration_seconds(&self) -> Option<u64> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) => {
                Some((finished - started).num_seconds().max(0) as u64)
            }
            _ => None,
        }
    }

    /// Adds exclusions and failed sitemaps recorded by the warmer
    pub fn with_warmer(mut self, warmer: &CacheWarmer) -> Self {
        self.excluded = ExcludedReport {
            sitemaps: warmer
                .excluded_sitemaps()
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            urls: warmer
                .excluded_urls()
                .iter()
                .map(|u| u.as_str().to_string())
                .collect(),
        };
        self.failed_sitemaps = warmer
            .failed_sitemaps()
            .iter()
            .map(|failed| FailedSitemapEntry {
                url: failed.sitemap.as_str().to_string(),
                error: failed.error.to_string(),
            })
            .collect();
        self
    }

    /// Total number of crawled URLs
    pub fn total(&self) -> usize {
        self.urls.successful.len() + self.urls.failed.len()
    }
}
