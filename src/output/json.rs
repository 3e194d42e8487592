use crate::output::{OutputResult, WarmupReport};

/// Formats a report as pretty-printed JSON
pub fn format_json_report(report: &WarmupReport) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
