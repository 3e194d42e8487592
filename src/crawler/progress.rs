use crate::crawler::{CacheWarmupResult, CrawlFailure, CrawlResponse, ResponseHandler};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Advances a progress bar once per completed request
#[derive(Debug, Clone)]
pub struct ProgressHandler {
    bar: ProgressBar,
    failures: u64,
}

impl ProgressHandler {
    /// Creates a progress bar drawn to stderr for `total` URLs
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} URLs ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        Self { bar, failures: 0 }
    }

    /// Creates a handler whose bar is never drawn
    pub fn hidden(total: u64) -> Self {
        let handler = Self::new(total);
        handler.bar.set_draw_target(ProgressDrawTarget::hidden());
        handler
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }
}

impl ResponseHandler for ProgressHandler {
    fn on_success(&mut self, _response: &CrawlResponse) {
        self.bar.inc(1);
    }

    fn on_failure(&mut self, _failure: &CrawlFailure) {
        self.failures += 1;
        self.bar.set_message(format!("{} failed", self.failures));
        self.bar.inc(1);
    }

    fn on_finished(&mut self, result: &CacheWarmupResult) {
        if result.was_cancelled() {
            self.bar.abandon_with_message("cancelled");
        } else {
            self.bar.finish();
        }
    }
}
