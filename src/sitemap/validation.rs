use crate::sitemap::Uri;
use crate::ValidationError;

/// Validates a sitemap or page URL and parses it into a `Uri`
///
/// Shared by `Sitemap::new` and `Url::new` so both types reject exactly the
/// same inputs. A URL is accepted when it is non-empty after trimming, parses
/// as an absolute URL and carries a host.
///
/// # Arguments
///
/// * `value` - The raw URL string
///
/// # Returns
///
/// * `Ok(Uri)` - The parsed URL
/// * `Err(ValidationError::EmptyUrl)` - The string is empty or whitespace only
/// * `Err(ValidationError::InvalidUrl)` - The string is not an absolute URL with a host
///
/// # Examples
///
/// ```
/// use cache_warmer::sitemap::validate_uri;
///
/// assert!(validate_uri("https://example.com/sitemap.xml").is_ok());
/// assert!(validate_uri("").is_err());
/// assert!(validate_uri("not a url").is_err());
/// ```
pub fn validate_uri(value: &str) -> Result<Uri, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    let uri = Uri::parse(trimmed).map_err(|e| ValidationError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    if !uri.has_host() {
        return Err(ValidationError::InvalidUrl {
            url: trimmed.to_string(),
            reason: "URL has no host".to_string(),
        });
    }

    Ok(uri)
}
