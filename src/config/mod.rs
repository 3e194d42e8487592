//! Configuration module for Cache-Warmer
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Command line values are merged on top of the file by the binary.
//!
//! # Example
//!
//! ```no_run
//! use cache_warmer::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("cache-warmer.toml")).unwrap();
//! println!("Warming up {} sitemaps", config.sitemaps.len());
//! ```

mod parser;
mod types;
pub mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
