//! Sitemap module for Cache-Warmer
//!
//! This module provides the sitemap value types, the origin arena that links
//! discovered entries back to the sitemap that declared them, and the parser
//! that turns a fetched sitemap document into child sitemaps or page URLs.
//!
//! # Components
//!
//! - `Sitemap` / `Url`: validated value types for `<sitemap>` and `<url>` entries
//! - `SitemapTree`: append-only arena addressed by `SitemapId`
//! - `SitemapParser`: fetches and decodes one sitemap document

mod lastmod;
mod model;
mod parser;
mod tree;
mod validation;
pub mod xml;

/// Absolute URI type used by all sitemap values
pub type Uri = url::Url;

// Re-export main types
pub use lastmod::parse_last_modified;
pub use model::{ChangeFrequency, Sitemap, SitemapId, Url, DEFAULT_PRIORITY};
pub use parser::{parse_document, ParserResult, SitemapParser};
pub use tree::SitemapTree;
pub use validation::validate_uri;
