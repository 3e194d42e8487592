//! Origin arena for discovered sitemaps
//!
//! Sitemaps are stored in insertion order and addressed by `SitemapId`.
//! Origins are plain ids pointing back into the same arena, so a child never
//! owns its parent and root lookup is an iterative walk.

use crate::sitemap::{Sitemap, SitemapId, Url};
use std::collections::HashMap;

/// Append-only store of every sitemap seen during resolution
#[derive(Debug, Default, Clone)]
pub struct SitemapTree {
    sitemaps: Vec<Sitemap>,
    by_uri: HashMap<String, SitemapId>,
}

impl SitemapTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a sitemap and returns its id
    ///
    /// Sitemaps are de-duplicated by their declared URL string, compared
    /// exactly. When it is already known, the existing id is returned and the
    /// new value is dropped.
    pub fn insert(&mut self, sitemap: Sitemap) -> SitemapId {
        if let Some(id) = self.by_uri.get(sitemap.as_str()) {
            return *id;
        }

        let id = SitemapId(self.sitemaps.len());
        self.by_uri.insert(sitemap.as_str().to_string(), id);
        self.sitemaps.push(sitemap);
        id
    }

    pub fn get(&self, id: SitemapId) -> Option<&Sitemap> {
        self.sitemaps.get(id.0)
    }

    pub fn get_mut(&mut self, id: SitemapId) -> Option<&mut Sitemap> {
        self.sitemaps.get_mut(id.0)
    }

    /// Finds the id of a sitemap by its declared URL
    pub fn find(&self, url: &str) -> Option<SitemapId> {
        self.by_uri.get(url).copied()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.by_uri.contains_key(url)
    }

    /// Walks the origin chain up to the first sitemap without an origin
    ///
    /// The walk is bounded by the number of stored sitemaps, so an origin chain
    /// that was rewired into a loop through `set_origin` still terminates.
    /// Dangling origins stop the walk at the last resolvable sitemap.
    pub fn root_origin(&self, id: SitemapId) -> SitemapId {
        let mut current = id;

        for _ in 0..self.sitemaps.len() {
            match self.get(current).and_then(Sitemap::origin) {
                Some(parent) if self.get(parent).is_some() => current = parent,
                _ => break,
            }
        }

        current
    }

    /// Returns the root sitemap a URL was ultimately discovered through
    pub fn root_origin_of(&self, url: &Url) -> Option<SitemapId> {
        url.origin().map(|origin| self.root_origin(origin))
    }

    /// Returns the ids from `id` up to its root, nearest first
    pub fn origin_chain(&self, id: SitemapId) -> Vec<SitemapId> {
        let mut chain = vec![id];
        let mut current = id;

        while chain.len() <= self.sitemaps.len() {
            match self.get(current).and_then(Sitemap::origin) {
                Some(parent) if self.get(parent).is_some() && !chain.contains(&parent) => {
                    chain.push(parent);
                    current = parent;
                }
                _ => break,
            }
        }

        chain
    }

    /// Drops every sitemap inserted after the first `len` entries
    pub(crate) fn truncate(&mut self, len: usize) {
        for sitemap in self.sitemaps.drain(len.min(self.sitemaps.len())..) {
            self.by_uri.remove(sitemap.as_str());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SitemapId, &Sitemap)> {
        self.sitemaps
            .iter()
            .enumerate()
            .map(|(index, sitemap)| (SitemapId(index), sitemap))
    }

    pub fn len(&self) -> usize {
        self.sitemaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sitemaps.is_empty()
    }
}
