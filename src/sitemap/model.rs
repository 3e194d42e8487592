//! Sitemap and page URL value types
//!
//! Both types validate their URI at construction and carry an optional
//! `origin`, the arena id of the sitemap that declared them. The declared
//! string is kept verbatim (trimmed) next to the parsed `Uri`: it is the
//! identity used for de-duplication, exclusion and reporting, while the
//! parsed form is only used to send requests.

use crate::sitemap::{validate_uri, Uri};
use crate::ValidationError;
use chrono::{DateTime, FixedOffset};
use std::fmt;

/// Priority assigned to URLs without a (numeric) `<priority>` element
pub const DEFAULT_PRIORITY: f32 = 0.5;

/// Index of a sitemap inside a `SitemapTree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SitemapId(pub(crate) usize);

impl SitemapId {
    /// Returns the position of the sitemap in its tree
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SitemapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A discovered sitemap document
#[derive(Debug, Clone, PartialEq)]
pub struct Sitemap {
    raw: String,
    uri: Uri,
    last_modified: Option<DateTime<FixedOffset>>,
    origin: Option<SitemapId>,
}

impl Sitemap {
    /// Creates a root sitemap from a URL string
    ///
    /// Fails fast with a `ValidationError` when the URL is empty or invalid.
    pub fn new(uri: &str) -> Result<Self, ValidationError> {
        let parsed = validate_uri(uri)?;
        Ok(Self {
            raw: uri.trim().to_string(),
            ..Self::from_uri(parsed)
        })
    }

    /// Creates a root sitemap from an already parsed URI
    pub fn from_uri(uri: Uri) -> Self {
        Self {
            raw: uri.as_str().to_string(),
            uri,
            last_modified: None,
            origin: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: Option<DateTime<FixedOffset>>) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub fn with_origin(mut self, origin: SitemapId) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Attaches the declaring sitemap after construction
    pub fn set_origin(&mut self, origin: Option<SitemapId>) {
        self.origin = origin;
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The URL as declared, without normalization
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn last_modified(&self) -> Option<DateTime<FixedOffset>> {
        self.last_modified
    }

    pub fn origin(&self) -> Option<SitemapId> {
        self.origin
    }

    /// Returns true if this sitemap was given directly rather than discovered
    pub fn is_root(&self) -> bool {
        self.origin.is_none()
    }
}

impl fmt::Display for Sitemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Change frequency hint of a `<url>` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    /// All change frequencies, most frequent first
    pub const ALL: [ChangeFrequency; 7] = [
        Self::Always,
        Self::Hourly,
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Yearly,
        Self::Never,
    ];

    /// Parses a `<changefreq>` value, ignoring case and surrounding whitespace
    ///
    /// Returns None if the value doesn't match any known frequency.
    pub fn from_name(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|frequency| frequency.as_str().eq_ignore_ascii_case(value))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A crawlable page entry
///
/// Equality covers the URI and every field, so two entries declared with
/// different metadata are distinct values. De-duplication during resolution
/// uses the URI string alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Url {
    raw: String,
    uri: Uri,
    priority: f32,
    last_modified: Option<DateTime<FixedOffset>>,
    change_frequency: Option<ChangeFrequency>,
    origin: Option<SitemapId>,
}

impl Url {
    /// Creates a URL entry with default metadata
    ///
    /// Fails fast with a `ValidationError` when the URL is empty or invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use cache_warmer::sitemap::{Url, DEFAULT_PRIORITY};
    ///
    /// let url = Url::new("https://example.com/").unwrap();
    /// assert_eq!(url.priority(), DEFAULT_PRIORITY);
    /// assert!(Url::new("").is_err());
    /// ```
    pub fn new(uri: &str) -> Result<Self, ValidationError> {
        let parsed = validate_uri(uri)?;
        Ok(Self {
            raw: uri.trim().to_string(),
            ..Self::from_uri(parsed)
        })
    }

    pub fn from_uri(uri: Uri) -> Self {
        Self {
            raw: uri.as_str().to_string(),
            uri,
            priority: DEFAULT_PRIORITY,
            last_modified: None,
            change_frequency: None,
            origin: None,
        }
    }

    /// Sets the priority; non-finite values fall back to the default
    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = if priority.is_finite() {
            priority
        } else {
            DEFAULT_PRIORITY
        };
        self
    }

    pub fn with_last_modified(mut self, last_modified: Option<DateTime<FixedOffset>>) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub fn with_change_frequency(mut self, change_frequency: Option<ChangeFrequency>) -> Self {
        self.change_frequency = change_frequency;
        self
    }

    pub fn with_origin(mut self, origin: SitemapId) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn set_origin(&mut self, origin: Option<SitemapId>) {
        self.origin = origin;
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The URL as declared, without normalization
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn priority(&self) -> f32 {
        self.priority
    }

    pub fn last_modified(&self) -> Option<DateTime<FixedOffset>> {
        self.last_modified
    }

    pub fn change_frequency(&self) -> Option<ChangeFrequency> {
        self.change_frequency
    }

    pub fn origin(&self) -> Option<SitemapId> {
        self.origin
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
