//! Sitemap document parser
//!
//! This module handles a single sitemap document:
//! - Fetching it with the shared HTTP client (redirects are followed by the client)
//! - Transparently decompressing gzip payloads
//! - Decoding the XML and classifying it as sitemap index or urlset
//! - Converting every node into a `Sitemap` or `Url`, collecting node-level errors

use crate::sitemap::xml::{self, XmlNode};
use crate::sitemap::{
    parse_last_modified, ChangeFrequency, Sitemap, SitemapId, Uri, Url, DEFAULT_PRIORITY,
};
use crate::{NodeError, SitemapError, SitemapResult};
use flate2::read::GzDecoder;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::collections::HashSet;
use std::io::Read;

/// Leading bytes of every gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Entries discovered in one sitemap document
///
/// Both lists keep document order and are de-duplicated by the declared
/// `<loc>` string, compared exactly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserResult {
    sitemaps: Vec<Sitemap>,
    urls: Vec<Url>,
    errors: Vec<NodeError>,
    seen: HashSet<String>,
}

impl ParserResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a child sitemap unless its URI was already added
    pub fn add_sitemap(&mut self, sitemap: Sitemap) -> bool {
        if !self.seen.insert(sitemap.as_str().to_string()) {
            return false;
        }
        self.sitemaps.push(sitemap);
        true
    }

    /// Adds a URL unless its URI was already added
    pub fn add_url(&mut self, url: Url) -> bool {
        if !self.seen.insert(url.as_str().to_string()) {
            return false;
        }
        self.urls.push(url);
        true
    }

    pub fn sitemaps(&self) -> &[Sitemap] {
        &self.sitemaps
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    /// Node-level errors of entries that were skipped
    pub fn errors(&self) -> &[NodeError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.sitemaps.is_empty() && self.urls.is_empty()
    }

    /// Splits the result into child sitemaps, URLs and node errors
    pub fn into_parts(self) -> (Vec<Sitemap>, Vec<Url>, Vec<NodeError>) {
        (self.sitemaps, self.urls, self.errors)
    }
}

/// Fetches and parses sitemap documents
#[derive(Debug, Clone)]
pub struct SitemapParser {
    client: Client,
}

impl SitemapParser {
    /// Creates a parser that fetches documents with the given client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches and parses one sitemap
    ///
    /// Issues exactly one GET request. There is no retry at this layer.
    ///
    /// # Arguments
    ///
    /// * `sitemap` - The sitemap to fetch
    /// * `id` - The arena id of `sitemap`; discovered entries use it as origin
    ///
    /// # Returns
    ///
    /// * `Ok(ParserResult)` - Child sitemaps or page URLs found in the document
    /// * `Err(SitemapError)` - The document could not be fetched, decoded or
    ///   contained no valid entries
    pub async fn parse(&self, sitemap: &Sitemap, id: SitemapId) -> SitemapResult<ParserResult> {
        tracing::debug!("Fetching sitemap {}", sitemap);

        let body = self.fetch(sitemap.uri()).await?;
        let result = parse_document(sitemap, id, &body)?;

        tracing::info!(
            "Parsed sitemap {}: {} sitemaps, {} URLs, {} skipped nodes",
            sitemap,
            result.sitemaps().len(),
            result.urls().len(),
            result.errors().len()
        );

        Ok(result)
    }

    async fn fetch(&self, uri: &Uri) -> SitemapResult<Vec<u8>> {
        let url = uri.to_string();

        let response = self
            .client
            .get(uri.clone())
            .send()
            .await
            .map_err(|source| SitemapError::Fetch {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SitemapError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|source| SitemapError::Fetch {
                url: url.clone(),
                source,
            })?;

        if is_gzip_payload(uri, content_type.as_deref(), &body) {
            tracing::debug!("Decompressing gzip sitemap {}", url);
            return decompress(&body).map_err(|source| SitemapError::Decompress { url, source });
        }

        Ok(body.to_vec())
    }
}

/// Parses an already fetched sitemap document
///
/// Node conversion never stops at the first invalid node: every node is
/// attempted, invalid ones are recorded in `ParserResult::errors`. Parsing
/// fails with `SitemapError::MalformedSitemap` when no node could be
/// converted, including a document without any `<sitemap>` or `<url>` node
/// (the error list is then empty).
pub fn parse_document(sitemap: &Sitemap, id: SitemapId, body: &[u8]) -> SitemapResult<ParserResult> {
    let url = sitemap.as_str().to_string();

    let document = xml::decode(body).map_err(|e| SitemapError::MalformedXml {
        url: url.clone(),
        message: e.to_string(),
    })?;

    let mut result = ParserResult::new();
    let mut node_count = 0;

    match document.name.as_str() {
        "sitemapindex" => {
            for (index, node) in document.children_named("sitemap").enumerate() {
                node_count += 1;
                match build_sitemap(node, index, id) {
                    Ok(child) => {
                        result.add_sitemap(child);
                    }
                    Err(error) => record_node_error(&mut result, &url, error),
                }
            }
        }
        "urlset" => {
            for (index, node) in document.children_named("url").enumerate() {
                node_count += 1;
                match build_url(node, index, id) {
                    Ok(page) => {
                        result.add_url(page);
                    }
                    Err(error) => record_node_error(&mut result, &url, error),
                }
            }
        }
        other => {
            return Err(SitemapError::MalformedSitemap {
                url,
                errors: vec![NodeError::UnexpectedRoot {
                    name: other.to_string(),
                }],
            });
        }
    }

    if result.errors.len() == node_count {
        return Err(SitemapError::MalformedSitemap {
            url,
            errors: result.errors,
        });
    }

    Ok(result)
}

fn record_node_error(result: &mut ParserResult, url: &str, error: NodeError) {
    tracing::warn!("Skipping invalid entry in sitemap {}: {}", url, error);
    result.errors.push(error);
}

/// Converts a `<sitemap>` node into a child sitemap
fn build_sitemap(node: &XmlNode, index: usize, origin: SitemapId) -> Result<Sitemap, NodeError> {
    let loc = node
        .child_text("loc")
        .ok_or(NodeError::MissingLoc { index })?;

    let sitemap = Sitemap::new(loc).map_err(|source| NodeError::InvalidLoc { index, source })?;

    Ok(sitemap
        .with_last_modified(node.child_text("lastmod").and_then(parse_last_modified))
        .with_origin(origin))
}

/// Converts a `<url>` node into a page URL
fn build_url(node: &XmlNode, index: usize, origin: SitemapId) -> Result<Url, NodeError> {
    let loc = node
        .child_text("loc")
        .ok_or(NodeError::MissingLoc { index })?;

    let url = Url::new(loc).map_err(|source| NodeError::InvalidLoc { index, source })?;

    let change_frequency = match node.child_text("changefreq") {
        Some(value) => Some(ChangeFrequency::from_name(value).ok_or_else(|| {
            NodeError::UnknownChangeFrequency {
                index,
                value: value.to_string(),
            }
        })?),
        None => None,
    };

    let priority = node
        .child_text("priority")
        .and_then(|value| value.parse::<f32>().ok())
        .unwrap_or(DEFAULT_PRIORITY);

    Ok(url
        .with_priority(priority)
        .with_last_modified(node.child_text("lastmod").and_then(parse_last_modified))
        .with_change_frequency(change_frequency)
        .with_origin(origin))
}

/// Decides whether a fetched body is a gzip stream
///
/// A `.gz` suffix or a gzip content type hints at compression, but the body is
/// only decompressed if it actually starts with the gzip magic bytes: a body
/// sent with `Content-Encoding: gzip` was already decoded by the client.
fn is_gzip_payload(uri: &Uri, content_type: Option<&str>, body: &[u8]) -> bool {
    let has_magic = body.starts_with(&GZIP_MAGIC);
    let hinted = uri.path().ends_with(".gz") || content_type.is_some_and(is_gzip_content_type);

    if hinted && !has_magic {
        tracing::debug!("Sitemap {} looks gzipped but body is plain, skipping decompression", uri);
    }

    has_magic
}

fn is_gzip_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    matches!(mime.as_str(), "application/gzip" | "application/x-gzip")
}

fn decompress(body: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(body);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded)?;
    Ok(decoded)
}
