//! Output module for reporting warmup results
//!
//! This module handles:
//! - Building a serializable report from a crawl result
//! - Rendering the report as plain text or JSON
//! - Mapping the outcome to a process exit code

mod json;
mod report;
mod text;

pub use json::format_json_report;
pub use report::{ExcludedReport, FailedSitemapEntry, FailureEntry, SuccessEntry, UrlReport, WarmupReport};
pub use text::format_text_report;

use crate::crawler::CacheWarmupResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while rendering output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Report format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(OutputError::UnknownFormat(other.to_string())),
        }
    }
}

/// Renders a report in the requested format
///
/// # Arguments
///
/// * `report` - The report to render
/// * `format` - Text or JSON
///
/// # Returns
///
/// * `Ok(String)` - The rendered report
/// * `Err(OutputError)` - JSON serialization failed
pub fn render(report: &WarmupReport, format: OutputFormat) -> OutputResult<String> {
    match format {
        OutputFormat::Text => Ok(format_text_report(report)),
        OutputFormat::Json => format_json_report(report),
    }
}

/// Process exit code for a crawl result
///
/// Failed URLs (and a cancelled crawl, which implies one) exit with 1 unless
/// failures are allowed.
pub fn exit_code(result: &CacheWarmupResult, allow_failures: bool) -> u8 {
    if allow_failures || (result.is_successful() && !result.was_cancelled()) {
        0
    } else {
        1
    }
}
