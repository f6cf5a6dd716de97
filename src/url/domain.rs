use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitewalk::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the origin (scheme + host, plus port when non-default) of a URL
///
/// The origin is the key for robots.txt lookups. Opaque origins (URLs
/// without a host) yield None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitewalk::url::origin_of;
///
/// let url = Url::parse("https://example.com/a/b?c=d").unwrap();
/// assert_eq!(origin_of(&url), Some("https://example.com".to_string()));
/// ```
pub fn origin_of(url: &Url) -> Option<String> {
    let origin = url.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}

/// Location of the robots.txt document for an origin
pub fn robots_url(origin: &str) -> String {
    format!("{}/robots.txt", origin.trim_end_matches('/'))
}
