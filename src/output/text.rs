use crate::output::WarmupReport;

/// Formats a report as human-readable text
///
/// Successful URLs are summarized by count only; failed URLs, excluded
/// items and failed sitemaps are listed individually.
pub fn format_text_report(report: &WarmupReport) -> String {
    let mut out = String::new();

    out.push_str("Cache warmup summary\n");
    out.push_str("====================\n\n");

    out.push_str(&format!("Total URLs: {}\n", report.total()));
    out.push_str(&format!("Successful: {}\n", report.urls.successful.len()));
    out.push_str(&format!("Failed: {}\n", report.urls.failed.len()));

    if !report.excluded.urls.is_empty() || !report.excluded.sitemaps.is_empty() {
        out.push_str(&format!(
            "Excluded: {} URLs, {} sitemaps\n",
            report.excluded.urls.len(),
            report.excluded.sitemaps.len()
        ));
    }

    if let Some(duration) = report.duration_seconds() {
        out.push_str(&format!("Duration: {} seconds\n", duration));
    }

    if report.cancelled {
        out.push_str("Crawling was cancelled after the first failure\n");
    }

    if !report.urls.failed.is_empty() {
        out.push_str("\nFailed URLs:\n");
        for failure in &report.urls.failed {
            out.push_str(&format!(
                "  - {} ({}): {}\n",
                failure.url, failure.kind, failure.message
            ));
        }
    }

    if !report.failed_sitemaps.is_empty() {
        out.push_str("\nSkipped sitemaps:\n");
        for sitemap in &report.failed_sitemaps {
            out.push_str(&format!("  - {}: {}\n", sitemap.url, sitemap.error));
        }
    }

    out.push('\n');
    out.push_str(if report.success && !report.cancelled {
        "Result: success\n"
    } else {
        "Result: failure\n"
    });

    out
}
